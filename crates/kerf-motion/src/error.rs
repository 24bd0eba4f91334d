//! 运动层错误类型

use thiserror::Error;

/// 脉冲发生器错误
#[derive(Error, Debug)]
pub enum MotionError {
    /// 进给速度必须为正；NaN 同样被拒绝
    #[error("Invalid feedrate: {0} (must be positive)")]
    InvalidFeedrate(f64),

    /// 节拍线程创建失败
    #[error("Failed to spawn tick thread: {0}")]
    TickThread(#[from] std::io::Error),

    /// 节拍线程异常退出，端口随之丢失
    #[error("Tick thread panicked, motion port lost")]
    TickThreadPanicked,

    /// 端口已被先前的故障耗尽
    #[error("Motion port unavailable")]
    PortUnavailable,
}

impl MotionError {
    /// 是否为发生器级故障（非法参数之外的错误都会使端口不可恢复）
    pub fn is_fatal(&self) -> bool {
        !matches!(self, MotionError::InvalidFeedrate(_))
    }
}
