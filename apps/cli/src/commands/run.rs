//! run 命令
//!
//! 翻译并在仿真端口上执行。翻译线程经有界通道把指令喂给执行
//! 循环，运动逐条按真实节拍完成；Ctrl-C 在指令边界停机，在途
//! 运动总是先把冲刷相位走完。

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::Args;
use crossbeam_channel::Sender;
use kerf_gcode::{CanonicalCommand, CommandSink, TranslationReport, Translator};
use kerf_hal::{Axis, SimPort};
use kerf_motion::{MotionError, MotionGenerator};
use tracing::warn;

use crate::config::MachineConfig;

/// 把规范指令送进执行通道的输出槽
struct ChannelSink {
    tx: Sender<CanonicalCommand>,
}

impl CommandSink for ChannelSink {
    fn emit(&mut self, command: &CanonicalCommand) -> io::Result<()> {
        self.tx
            .send(command.clone())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "executor stopped"))
    }
}

/// 周期性打印运动进度的后台线程
struct ProgressPrinter {
    stop_flag: Arc<AtomicBool>,
    handle: thread::JoinHandle<()>,
}

impl ProgressPrinter {
    fn spawn(generator: &MotionGenerator<SimPort>) -> Self {
        let telemetry = generator.telemetry();
        let stop_flag = Arc::new(AtomicBool::new(false));
        let stop = Arc::clone(&stop_flag);

        let handle = thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                if let Some(snapshot) = telemetry.snapshot() {
                    if !snapshot.complete {
                        println!(
                            "🏃 X {}/{} Y {}/{} ({:.0}%)",
                            snapshot.emitted_x,
                            snapshot.steps_x,
                            snapshot.emitted_y,
                            snapshot.steps_y,
                            snapshot.progress() * 100.0
                        );
                    }
                }
                thread::sleep(Duration::from_millis(100));
            }
        });

        Self { stop_flag, handle }
    }

    fn finish(self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        let _ = self.handle.join();
    }
}

/// 执行命令参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// G 代码文件路径
    pub input: PathBuf,

    /// 遇到致命诊断后继续执行
    #[arg(long)]
    pub keep_going: bool,

    /// 周期性打印运动进度
    #[arg(long)]
    pub progress: bool,

    /// 配置文件路径（覆盖默认查找）
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl RunCommand {
    pub fn execute(&self) -> Result<()> {
        let machine = MachineConfig::load(self.config.as_deref())?;

        let file = File::open(&self.input)
            .with_context(|| format!("打开输入文件失败: {}", self.input.display()))?;
        let reader = BufReader::new(file);

        println!("📜 执行: {}", self.input.display());

        let interrupted = Arc::new(AtomicBool::new(false));
        {
            let interrupted = Arc::clone(&interrupted);
            ctrlc::set_handler(move || {
                interrupted.store(true, Ordering::SeqCst);
            })
            .context("注册 Ctrl-C 处理器失败")?;
        }

        // 翻译线程在通道另一端流式产出指令
        let (tx, rx) = crossbeam_channel::bounded(10);
        let translator_config = machine.translator_config();
        let keep_going = self.keep_going;
        let translator_thread = thread::Builder::new()
            .name("kerf-translate".into())
            .spawn(move || -> io::Result<TranslationReport> {
                let mut translator = Translator::new(translator_config);
                let mut sink = ChannelSink { tx };
                translator.translate_stream(reader, &mut sink, keep_going)
            })
            .context("启动翻译线程失败")?;

        let port = SimPort::with_dwell(machine.pulse_width());
        let log = port.log();
        let mut generator = MotionGenerator::new(port, machine.motion_config());

        let printer = self.progress.then(|| ProgressPrinter::spawn(&generator));

        let start = Instant::now();
        let mut moves = 0usize;
        let mut power = 0.0f64;
        let mut stopped_early = false;
        let mut generator_error: Option<MotionError> = None;

        for command in rx {
            if interrupted.load(Ordering::SeqCst) {
                stopped_early = true;
                break;
            }

            match command {
                CanonicalCommand::Move {
                    step_x,
                    step_y,
                    feedrate,
                } => {
                    moves += 1;
                    if let Err(err) = generator.move_linear(step_x, step_y, feedrate) {
                        if err.is_fatal() {
                            generator_error = Some(err);
                            break;
                        }
                        warn!("Skipping move {}: {}", moves, err);
                    }
                },

                CanonicalCommand::SetPower { level } => {
                    power = level;
                    println!("🔆 功率 {}", level);
                },

                CanonicalCommand::Comment { text } => {
                    println!("💬{}", text);
                },
            }
        }
        // 离开循环即关闭接收端，翻译线程随之收尾

        let aborted = stopped_early || generator_error.is_some();
        let report = match translator_thread.join() {
            Ok(Ok(report)) => Some(report),
            // 接收端提前关闭时翻译线程以管道错误收场，属预期
            Ok(Err(_)) if aborted => None,
            Ok(Err(err)) => return Err(err).context("读取输入失败"),
            Err(_) => bail!("翻译线程异常退出"),
        };

        if let Some(printer) = printer {
            printer.finish();
        }

        let elapsed = start.elapsed();
        println!();
        println!("📊 执行结果:");
        println!("  运动指令: {}", moves);
        println!("  X 轴脉冲: {}", log.pulse_count(Axis::X));
        println!("  Y 轴脉冲: {}", log.pulse_count(Axis::Y));
        println!("  最终功率: {}", power);
        println!("  耗时: {:.2} 秒", elapsed.as_secs_f64());

        if let Some(report) = &report {
            if !report.diagnostics.is_empty() {
                println!();
                println!("⚠️  诊断:");
                for diagnostic in &report.diagnostics {
                    println!("  行 {}: {}", diagnostic.line, diagnostic.error);
                }
            }
            if let Some(line) = report.aborted_at {
                println!("❌ 在第 {} 行中止", line);
            }
        }

        if let Some(err) = generator_error {
            return Err(err).context("脉冲发生器故障");
        }
        if stopped_early {
            bail!("用户中断");
        }
        if let Some(report) = &report {
            if report.fatal_count() > 0 {
                bail!("程序含 {} 个致命诊断", report.fatal_count());
            }
        }

        println!("✅ 完成");
        Ok(())
    }
}
