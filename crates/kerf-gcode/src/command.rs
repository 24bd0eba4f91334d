//! 规范运动指令
//!
//! 翻译器的输出单元。文本线格式（[`Display`] 实现）即对外的规范
//! 指令流格式：整数无损，实数用 f64 的最短往返十进制表示。

use std::fmt;

use smallvec::SmallVec;

/// 单行指令缓冲：一段最多产出 SetPower + Move 两条，多段行也很少超过 4 条
pub type CommandBuffer = SmallVec<[CanonicalCommand; 4]>;

/// 规范指令
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalCommand {
    /// 相对位移运动：每轴脉冲计数（符号即方向）+ 进给速度
    Move {
        step_x: i64,
        step_y: i64,
        feedrate: f64,
    },
    /// 激光/主轴功率设定
    SetPower { level: f64 },
    /// 注释（`;` 之后的原样文本）
    Comment { text: String },
}

impl CanonicalCommand {
    /// 是否为运动指令
    #[inline]
    pub fn is_move(&self) -> bool {
        matches!(self, CanonicalCommand::Move { .. })
    }
}

impl fmt::Display for CanonicalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalCommand::Move {
                step_x,
                step_y,
                feedrate,
            } => write!(f, "MOVE {} {} {}", step_x, step_y, feedrate),
            CanonicalCommand::SetPower { level } => write!(f, "POWER {}", level),
            CanonicalCommand::Comment { text } => write!(f, "# {}", text),
        }
    }
}
