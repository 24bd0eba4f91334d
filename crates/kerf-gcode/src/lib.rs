//! G 代码方言翻译层
//!
//! 本 crate 把相对坐标 G 代码方言翻译成规范运动指令，包括：
//! - 行内词法原语（参数字 + 严格的带符号十进制接受规则）
//! - 枚举化 G/M 代码表（编译期穷尽的分类）
//! - 规范指令与文本线格式
//! - 持有延续状态（进给/功率/亚脉冲余量）的翻译器
//! - 指令输出槽抽象
//!
//! # 使用场景
//!
//! 纯解析层，无硬件依赖。运动执行见 `kerf-motion`。

pub mod command;
mod error;
pub mod lexer;
pub mod sink;
pub mod tables;
mod translator;

pub use command::{CanonicalCommand, CommandBuffer};
pub use error::{DiagnosticBuffer, TranslateError};
pub use sink::{CommandSink, TextSink};
pub use tables::{CodeAction, GCode, MCode};
pub use translator::{
    LineDiagnostic, LineOutcome, TranslationReport, Translator, TranslatorConfig,
};
