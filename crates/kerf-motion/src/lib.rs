//! # Kerf 运动脉冲发生器
//!
//! 把一条规范运动指令（两轴步数 + 进给速度）变成实时脉冲串。
//! 比例相位在专设节拍线程上按固定周期推进两轴，使两轴同时到达
//! 终点；随后的冲刷相位补足舍入缺口，保证每轴都精确送满目标
//! 步数。调用方在 [`MotionGenerator::move_linear`] 上阻塞，经由
//! [`MotionTelemetry`] 观察进度。
//!
//! ## 使用场景
//!
//! - 执行 `kerf-gcode` 翻译出的 MOVE 指令（经任何 [`MotionPort`] 实现）
//! - 在仿真端口上干跑程序，校验脉冲数与时序

mod config;
mod error;
mod generator;
mod plan;
mod telemetry;

pub use config::MotionConfig;
pub use error::MotionError;
pub use generator::MotionGenerator;
pub use plan::InterpolationPlan;
pub use telemetry::{MotionSnapshot, MotionTelemetry};

// 重新导出硬件抽象层的核心类型
pub use kerf_hal::{Axis, Direction, MotionPort};
