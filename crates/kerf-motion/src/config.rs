//! 发生器配置

use std::time::Duration;

/// 脉冲发生器配置
///
/// 所有时间参数都以真实时钟为准；`pulse_length` 的单位与
/// 翻译层的坐标单位一致。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionConfig {
    /// 一个脉冲对应的物理位移（典型值 0.02）
    pub pulse_length: f64,
    /// 比例相位的节拍频率，单位 Hz（典型值 1000）
    pub tick_hz: u32,
    /// 冲刷相位相邻脉冲之间的固定间距（典型值 100µs）
    pub flush_gap: Duration,
    /// 前台阻塞等待完成标志时的轮询间隔（典型值 50µs）
    pub poll_interval: Duration,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            pulse_length: 0.02,
            tick_hz: 1000,
            flush_gap: Duration::from_micros(100),
            poll_interval: Duration::from_micros(50),
        }
    }
}

impl MotionConfig {
    /// 比例相位一拍的时长
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_hz as f64)
    }
}
