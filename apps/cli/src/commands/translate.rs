//! translate 命令
//!
//! 把 G 代码文件翻译成规范运动指令文本

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use kerf_gcode::{TextSink, Translator};

use crate::config::MachineConfig;

/// 翻译命令参数
#[derive(Args, Debug)]
pub struct TranslateCommand {
    /// G 代码文件路径
    pub input: PathBuf,

    /// 输出文件；缺省写到标准输出
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 遇到致命诊断后继续翻译
    #[arg(long)]
    pub keep_going: bool,

    /// 配置文件路径（覆盖默认查找）
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl TranslateCommand {
    pub fn execute(&self) -> Result<()> {
        let machine = MachineConfig::load(self.config.as_deref())?;
        let mut translator = Translator::new(machine.translator_config());

        let file = File::open(&self.input)
            .with_context(|| format!("打开输入文件失败: {}", self.input.display()))?;
        let reader = BufReader::new(file);

        let writer: Box<dyn Write> = match &self.output {
            Some(path) => Box::new(
                File::create(path)
                    .with_context(|| format!("创建输出文件失败: {}", path.display()))?,
            ),
            None => Box::new(io::stdout()),
        };
        let mut sink = TextSink::new(writer);

        let report = translator
            .translate_stream(reader, &mut sink, self.keep_going)
            .context("读取输入失败")?;

        // 汇总走标准错误，标准输出只留指令文本
        eprintln!(
            "📄 {}: {} 行, {} 条指令",
            self.input.display(),
            report.lines,
            report.commands
        );
        for diagnostic in &report.diagnostics {
            eprintln!("  行 {}: {}", diagnostic.line, diagnostic.error);
        }
        if let Some(line) = report.aborted_at {
            eprintln!("❌ 在第 {} 行中止", line);
        }

        if report.fatal_count() > 0 {
            bail!("翻译出现 {} 个致命诊断", report.fatal_count());
        }
        Ok(())
    }
}
