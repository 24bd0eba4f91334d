//! check 命令
//!
//! 诊断扫描：整份文件过一遍，报告全部诊断，不输出指令

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use kerf_gcode::{TextSink, Translator};

use crate::config::MachineConfig;

/// 诊断扫描命令参数
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// G 代码文件路径
    pub input: PathBuf,

    /// 配置文件路径（覆盖默认查找）
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl CheckCommand {
    pub fn execute(&self) -> Result<()> {
        let machine = MachineConfig::load(self.config.as_deref())?;
        let mut translator = Translator::new(machine.translator_config());

        let file = File::open(&self.input)
            .with_context(|| format!("打开输入文件失败: {}", self.input.display()))?;
        let reader = BufReader::new(file);

        // 扫描不因致命诊断中止，一次报告全部问题
        let mut sink = TextSink::new(io::sink());
        let report = translator
            .translate_stream(reader, &mut sink, true)
            .context("读取输入失败")?;

        println!(
            "📄 {}: {} 行, {} 条指令",
            self.input.display(),
            report.lines,
            report.commands
        );
        for diagnostic in &report.diagnostics {
            println!("  行 {}: {}", diagnostic.line, diagnostic.error);
        }

        let fatal = report.fatal_count();
        let warnings = report.warning_count();

        if fatal > 0 {
            println!("❌ {} 个致命诊断, {} 个警告", fatal, warnings);
            bail!("检查未通过");
        }
        if warnings > 0 {
            println!("⚠️  {} 个警告", warnings);
        } else {
            println!("✅ 无诊断");
        }
        Ok(())
    }
}
