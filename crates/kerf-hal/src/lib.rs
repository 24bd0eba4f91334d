//! # Kerf 硬件抽象层
//!
//! 步进驱动的最小硬件面：方向脚与脉冲脚，以及为脉冲发生器
//! 提供稳定节拍的节拍器。真实端口把这两个操作映射到 GPIO；
//! `sim` 特性提供带事件日志的仿真端口，供测试与无硬件回放使用。

pub mod pace;

#[cfg(feature = "sim")]
pub mod sim;

pub use pace::Metronome;

#[cfg(feature = "sim")]
pub use sim::{PortEvent, SimLog, SimPort};

/// 运动轴
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// 固定的遍历顺序：先 X 后 Y
    pub const ALL: [Axis; 2] = [Axis::X, Axis::Y];

    /// 轴在遥测数组里的下标
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }
}

/// 方向脚电平
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    /// 由位移符号决定方向；零位移按正向处理（该轴不会真正发脉冲）
    #[inline]
    pub fn from_delta(delta: i64) -> Self {
        if delta >= 0 {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }
}

/// 步进端口：一对方向脚 + 一对脉冲脚
///
/// 契约：调用方保证在某轴第一次 `pulse` 之前已经为该轴调过
/// `set_direction`。`pulse` 自带电平保持时间（若实现需要），
/// 返回即表示本次脉冲已完整送出。
pub trait MotionPort: Send {
    fn set_direction(&mut self, axis: Axis, direction: Direction);
    fn pulse(&mut self, axis: Axis);
}
