//! 配置管理命令
//!
//! 查看生效配置、在默认位置生成配置文件

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Subcommand;

use crate::config::{MachineConfig, default_config_file};

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 显示生效的配置
    Show {
        /// 配置文件路径（覆盖默认查找）
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// 在默认位置生成配置文件
    Init {
        /// 覆盖已有文件
        #[arg(long)]
        force: bool,
    },

    /// 打印默认配置文件路径
    Path,
}

impl ConfigCommand {
    pub fn execute(self) -> Result<()> {
        match self {
            ConfigCommand::Show { config } => Self::show(config),

            ConfigCommand::Init { force } => Self::init(force),

            ConfigCommand::Path => Self::path(),
        }
    }

    fn show(path: Option<PathBuf>) -> Result<()> {
        let machine = MachineConfig::load(path.as_deref())?;
        print!(
            "{}",
            toml::to_string_pretty(&machine).context("序列化配置失败")?
        );
        Ok(())
    }

    fn init(force: bool) -> Result<()> {
        let path = default_config_file()?;
        if path.exists() && !force {
            bail!("配置文件已存在: {}（用 --force 覆盖）", path.display());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("创建配置目录失败")?;
        }

        let content = format!(
            "# Kerf 机器配置\n\n{}",
            toml::to_string_pretty(&MachineConfig::default()).context("序列化配置失败")?
        );
        fs::write(&path, content).context("写入配置文件失败")?;

        println!("✅ 已生成: {}", path.display());
        Ok(())
    }

    fn path() -> Result<()> {
        println!("{}", default_config_file()?.display());
        Ok(())
    }
}
