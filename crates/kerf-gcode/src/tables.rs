//! G/M 代码表
//!
//! 把方言识别的数字代码固定为枚举，分类（忽略 / 提示 / 警告 / 错误）由
//! 枚举方法给出，编译期保证穷尽。未收录的数字代码在 `try_from` 处失败，
//! 由翻译器转为"未知代码"诊断。

use num_enum::TryFromPrimitive;

use crate::error::TranslateError;

/// 识别的 G 代码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u8)]
pub enum GCode {
    /// G0：快速定位
    Rapid = 0,
    /// G1：直线插补
    Linear = 1,
    /// G17：XY 平面选择
    PlaneXY = 17,
    /// G18：ZX 平面选择
    PlaneZX = 18,
    /// G19：YZ 平面选择
    PlaneYZ = 19,
    /// G20：英制单位
    InchUnits = 20,
    /// G21：公制单位
    MetricUnits = 21,
    /// G40：取消刀具补偿
    CompensationOff = 40,
    /// G41：左刀具补偿
    CompensationLeft = 41,
    /// G42：右刀具补偿
    CompensationRight = 42,
    /// G54-G59：工件坐标系选择
    WorkOffset1 = 54,
    WorkOffset2 = 55,
    WorkOffset3 = 56,
    WorkOffset4 = 57,
    WorkOffset5 = 58,
    WorkOffset6 = 59,
    /// G90：绝对坐标模式（不支持）
    Absolute = 90,
    /// G91：相对坐标模式（本方言的默认且唯一模式）
    Relative = 91,
}

/// 代码查表结果
#[derive(Debug, Clone, PartialEq)]
pub enum CodeAction {
    /// 运动指令（G0/G1），由翻译器特殊处理
    Motion,
    /// 按设计静默忽略
    Ignore,
    /// 提示信息，记录日志即可
    Info(&'static str),
    /// 作为诊断上报（致命与否由 [`TranslateError::is_fatal`] 决定）
    Report(TranslateError),
}

impl GCode {
    /// 代码的语义分类。纯函数：同一代码永远返回同一分类。
    pub fn action(self) -> CodeAction {
        match self {
            GCode::Rapid | GCode::Linear => CodeAction::Motion,

            GCode::PlaneXY | GCode::PlaneZX | GCode::PlaneYZ => CodeAction::Ignore,
            GCode::MetricUnits => CodeAction::Ignore,
            GCode::CompensationOff => CodeAction::Ignore,
            GCode::WorkOffset1
            | GCode::WorkOffset2
            | GCode::WorkOffset3
            | GCode::WorkOffset4
            | GCode::WorkOffset5
            | GCode::WorkOffset6 => CodeAction::Ignore,

            GCode::Relative => CodeAction::Info("Relative positioning detected"),

            GCode::InchUnits => CodeAction::Report(TranslateError::InchUnits),
            GCode::Absolute => CodeAction::Report(TranslateError::AbsolutePositioning),
            GCode::CompensationLeft | GCode::CompensationRight => {
                CodeAction::Report(TranslateError::ToolCompensation { code: self as u8 })
            },
        }
    }
}

/// 识别的 M 代码（全部仅提示，不产生指令）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u8)]
pub enum MCode {
    /// M2：程序结束
    ProgramEnd = 2,
    /// M3：主轴/激光正转开
    SpindleCw = 3,
    /// M4：主轴/激光反转开
    SpindleCcw = 4,
    /// M5：主轴/激光关
    SpindleStop = 5,
    /// M8：冷却开
    CoolantOn = 8,
    /// M9：冷却关
    CoolantOff = 9,
}

impl MCode {
    /// 提示文本。纯函数。
    pub fn message(self) -> &'static str {
        match self {
            MCode::ProgramEnd => "Ignoring end of gcode",
            MCode::SpindleCw | MCode::SpindleCcw => "Ignoring laser turn-on",
            MCode::SpindleStop => "Ignoring laser turn-off",
            MCode::CoolantOn => "Ignoring cooler turn-on",
            MCode::CoolantOff => "Ignoring cooler turn-off",
        }
    }
}
