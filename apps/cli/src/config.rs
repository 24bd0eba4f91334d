//! 机器配置
//!
//! 翻译与执行共用一个 TOML 配置文件。查找顺序：命令行 `--config`
//! 指定的路径、用户配置目录下的 `kerf/config.toml`、内置默认值。

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use kerf_gcode::TranslatorConfig;
use kerf_motion::MotionConfig;
use serde::{Deserialize, Serialize};

/// 默认配置文件路径（`~/.config/kerf/config.toml` 或平台等价物）
pub fn default_config_file() -> Result<PathBuf> {
    let mut path = dirs::config_dir().context("无法确定配置目录")?;
    path.push("kerf");
    path.push("config.toml");
    Ok(path)
}

/// 翻译层配置段
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorSection {
    /// 一个脉冲对应的物理位移
    pub pulse_length: f64,
    /// G0 快速定位使用的进给速度
    pub max_feedrate: f64,
}

impl Default for TranslatorSection {
    fn default() -> Self {
        Self {
            pulse_length: 0.005,
            max_feedrate: 1000.0,
        }
    }
}

/// 执行层配置段
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionSection {
    /// 一个脉冲对应的物理位移
    pub pulse_length: f64,
    /// 比例相位节拍频率（Hz）
    pub tick_hz: u32,
    /// 仿真端口的脉冲电平保持时间（µs）
    pub pulse_width_us: u64,
    /// 冲刷相位相邻脉冲间距（µs）
    pub flush_gap_us: u64,
    /// 前台完成轮询间隔（µs）
    pub poll_interval_us: u64,
}

impl Default for MotionSection {
    fn default() -> Self {
        Self {
            pulse_length: 0.02,
            tick_hz: 1000,
            pulse_width_us: 100,
            flush_gap_us: 100,
            poll_interval_us: 50,
        }
    }
}

/// 完整机器配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    pub translator: TranslatorSection,
    pub motion: MotionSection,
}

impl MachineConfig {
    /// 加载配置
    ///
    /// 给了路径就必须可读可解析；没给路径时，默认位置缺文件不算
    /// 错误，直接用内置默认值。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let path = default_config_file()?;
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            },
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("解析配置文件失败: {}", path.display()))
    }

    pub fn translator_config(&self) -> TranslatorConfig {
        TranslatorConfig {
            pulse_length: self.translator.pulse_length,
            max_feedrate: self.translator.max_feedrate,
        }
    }

    pub fn motion_config(&self) -> MotionConfig {
        MotionConfig {
            pulse_length: self.motion.pulse_length,
            tick_hz: self.motion.tick_hz,
            flush_gap: Duration::from_micros(self.motion.flush_gap_us),
            poll_interval: Duration::from_micros(self.motion.poll_interval_us),
        }
    }

    /// 仿真端口的脉冲电平保持时间
    pub fn pulse_width(&self) -> Duration {
        Duration::from_micros(self.motion.pulse_width_us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MachineConfig::default();
        assert_eq!(config.translator.pulse_length, 0.005);
        assert_eq!(config.motion.tick_hz, 1000);
        assert_eq!(config.pulse_width(), Duration::from_micros(100));
    }

    /// 部分配置文件：缺的字段取默认值
    #[test]
    fn test_partial_file_fills_defaults() {
        let config: MachineConfig = toml::from_str(
            r#"
            [translator]
            pulse_length = 0.02

            [motion]
            tick_hz = 2000
            "#,
        )
        .unwrap();

        assert_eq!(config.translator.pulse_length, 0.02);
        assert_eq!(config.translator.max_feedrate, 1000.0);
        assert_eq!(config.motion.tick_hz, 2000);
        assert_eq!(config.motion.pulse_length, 0.02);
    }

    #[test]
    fn test_roundtrip() {
        let config = MachineConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: MachineConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.motion.flush_gap_us, config.motion.flush_gap_us);
        assert_eq!(parsed.translator.max_feedrate, config.translator.max_feedrate);
    }
}
