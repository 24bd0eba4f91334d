//! 翻译层错误类型定义

use smallvec::SmallVec;
use thiserror::Error;

/// 单行诊断缓冲：绝大多数行产生 0-1 条诊断，栈上即可容纳
pub type DiagnosticBuffer = SmallVec<[TranslateError; 2]>;

/// 翻译诊断
///
/// 致命诊断（`is_fatal() == true`）意味着继续翻译会产生物理上错误的运动，
/// 调用方应中止当前文件；其余诊断仅供报告，翻译继续处理后续行。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslateError {
    /// 检测到绝对坐标模式（G90）
    ///
    /// 本方言所有位移均为相对坐标，绝对/相对歧义无法安全猜测。
    #[error("Absolute positioning detected (G90 is not supported)")]
    AbsolutePositioning,

    /// 检测到刀具补偿（G41/G42）
    #[error("Tool compensation detected (G{code} is not supported)")]
    ToolCompensation { code: u8 },

    /// 位移超出可折算范围
    ///
    /// 坐标字面量溢出 f64（解析为无穷），或位移折算出的脉冲数超出 i64。
    /// 携带的是累加余量后的两轴位移。
    #[error("Coordinate out of range: X{x} Y{y}")]
    CoordinateOutOfRange { x: f64, y: f64 },

    /// 检测到英制单位（G20）
    #[error("Inch units detected; distances are interpreted in configured units")]
    InchUnits,

    /// 未知 G 代码
    #[error("Unknown G code: {code}")]
    UnknownGCode { code: String },

    /// 未知 M 代码
    #[error("Unknown M code: {code}")]
    UnknownMCode { code: String },

    /// 无法解析的行
    #[error("Unknown line: {line}")]
    UnparseableLine { line: String },
}

impl TranslateError {
    /// 是否应中止整个文件的翻译
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TranslateError::AbsolutePositioning
                | TranslateError::ToolCompensation { .. }
                | TranslateError::CoordinateOutOfRange { .. }
        )
    }
}
