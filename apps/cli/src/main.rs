//! # Kerf CLI
//!
//! 两轴激光雕刻运动控制的命令行工具。
//!
//! ## 常用操作
//!
//! ```bash
//! # 翻译 G 代码为规范运动指令（写到标准输出）
//! kerf translate job.gcode
//!
//! # 只做诊断扫描，适合 CI
//! kerf check job.gcode
//!
//! # 翻译并在仿真端口上按真实节拍执行
//! kerf run job.gcode --progress
//!
//! # 生成默认配置文件
//! kerf config init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;

use commands::{CheckCommand, ConfigCommand, RunCommand, TranslateCommand};

/// Kerf CLI - 两轴运动控制命令行工具
#[derive(Parser, Debug)]
#[command(name = "kerf")]
#[command(about = "G-code translation and motion control for two-axis stepper rigs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 翻译 G 代码为规范运动指令
    Translate {
        #[command(flatten)]
        args: TranslateCommand,
    },

    /// 扫描 G 代码并报告诊断，不产出指令
    Check {
        #[command(flatten)]
        args: CheckCommand,
    },

    /// 翻译并在仿真端口上执行
    Run {
        #[command(flatten)]
        args: RunCommand,
    },

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),
}

fn main() -> Result<()> {
    // 初始化日志（标准输出只留指令文本，日志走标准错误）
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kerf=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Translate { args } => args.execute(),

        Commands::Check { args } => args.execute(),

        Commands::Run { args } => args.execute(),

        Commands::Config(cmd) => cmd.execute(),
    }
}
