//! 规范指令输出槽
//!
//! 翻译器不关心指令去向（文件、标准输出、运动执行器的通道），只往
//! [`CommandSink`] 里送。文本槽按 [`CanonicalCommand`] 的 Display
//! 线格式一行一条。

use std::io::{self, Write};

use crate::command::CanonicalCommand;

/// 指令输出槽
pub trait CommandSink {
    /// 输出一条规范指令
    fn emit(&mut self, command: &CanonicalCommand) -> io::Result<()>;

    /// 刷新底层缓冲（默认无操作）
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// 文本输出槽：`MOVE <step_x> <step_y> <feedrate>` / `POWER <level>` / `# <text>`
pub struct TextSink<W: Write> {
    writer: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> CommandSink for TextSink<W> {
    fn emit(&mut self, command: &CanonicalCommand) -> io::Result<()> {
        writeln!(self.writer, "{}", command)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
