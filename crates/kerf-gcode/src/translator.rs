//! 命令翻译器
//!
//! 把一行 G 代码翻译成零到多条规范指令。翻译器持有随行延续的状态
//! （进给速度、功率、两轴的亚脉冲余量），一个实例对应一个翻译任务，
//! 互不干扰；多个任务各建各的实例。
//!
//! 一条物理行可以携带多个命令段（如 `G1X5G1Y5`、`G1X5;done`），按
//! 段首字符依次分派。诊断不会中断本行的后续段，也不会中断后续行；
//! 是否因致命诊断中止整个文件由调用方（或 [`Translator::translate_stream`]
//! 的 `keep_going` 开关）决定。

use std::io::{self, BufRead};

use tracing::{debug, error, info, trace, warn};

use crate::command::{CanonicalCommand, CommandBuffer};
use crate::error::{DiagnosticBuffer, TranslateError};
use crate::lexer;
use crate::sink::CommandSink;
use crate::tables::{CodeAction, GCode, MCode};

/// 翻译器配置
#[derive(Debug, Clone, Copy)]
pub struct TranslatorConfig {
    /// 一个脉冲对应的物理位移（与 G 代码坐标同单位）
    ///
    /// 典型值：0.005 - 0.02
    pub pulse_length: f64,

    /// 快速定位（G0）使用的进给速度；G0 忽略解析到的 F 参数
    pub max_feedrate: f64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            pulse_length: 0.005,
            max_feedrate: 1000.0,
        }
    }
}

/// 一行的翻译结果：指令与诊断各自累积
#[derive(Debug, Default)]
pub struct LineOutcome {
    pub commands: CommandBuffer,
    pub diagnostics: DiagnosticBuffer,
}

impl LineOutcome {
    /// 第一条致命诊断（若有）
    pub fn fatal(&self) -> Option<&TranslateError> {
        self.diagnostics.iter().find(|d| d.is_fatal())
    }

    /// 本行是否毫无诊断
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// 带行号的流式诊断
#[derive(Debug, Clone, PartialEq)]
pub struct LineDiagnostic {
    /// 1 起始的行号
    pub line: usize,
    pub error: TranslateError,
}

/// 一次流式翻译的汇总
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationReport {
    /// 处理过的行数
    pub lines: usize,
    /// 输出的指令条数
    pub commands: usize,
    /// 全部诊断（按行号升序）
    pub diagnostics: Vec<LineDiagnostic>,
    /// 因致命诊断中止时的行号
    pub aborted_at: Option<usize>,
}

impl TranslationReport {
    pub fn fatal_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.error.is_fatal())
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.fatal_count()
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// 命令翻译器
pub struct Translator {
    config: TranslatorConfig,
    last_feedrate: f64,
    last_power: f64,
    remainder_x: f64,
    remainder_y: f64,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(TranslatorConfig::default())
    }
}

impl Translator {
    pub fn new(config: TranslatorConfig) -> Self {
        Self {
            config,
            last_feedrate: 0.0,
            last_power: 0.0,
            remainder_x: 0.0,
            remainder_y: 0.0,
        }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// 当前两轴的亚脉冲余量（x, y）。不变式：恒为有限值，且绝对值恒
    /// 小于一个脉冲长度。
    pub fn remainders(&self) -> (f64, f64) {
        (self.remainder_x, self.remainder_y)
    }

    /// 翻译一行。指令与诊断都在返回值里，翻译器状态随之更新。
    pub fn translate_line(&mut self, line: &str) -> LineOutcome {
        let mut out = LineOutcome::default();
        let mut rest = line.trim();
        while !rest.is_empty() {
            rest = self.segment(rest, &mut out);
        }
        out
    }

    /// 处理一个命令段，返回本行剩余部分。每次调用至少消耗一个字符。
    fn segment<'a>(&mut self, seg: &'a str, out: &mut LineOutcome) -> &'a str {
        let Some(head) = seg.chars().next() else {
            return "";
        };
        match head.to_ascii_lowercase() {
            ';' => {
                out.commands.push(CanonicalCommand::Comment {
                    text: seg[1..].to_string(),
                });
                ""
            },
            'g' => self.gcode_segment(&seg[1..], out),
            'm' => self.mcode_segment(&seg[1..], out),
            _ => {
                out.diagnostics.push(TranslateError::UnparseableLine {
                    line: seg.to_string(),
                });
                ""
            },
        }
    }

    fn gcode_segment<'a>(&mut self, body: &'a str, out: &mut LineOutcome) -> &'a str {
        let Some((raw, value)) = lexer::scan_code(body) else {
            // G 后没有数字编码
            let snippet: String = body.chars().take(1).collect();
            out.diagnostics
                .push(TranslateError::UnknownGCode { code: snippet });
            return &body[lexer::command_boundary(body)..];
        };

        let after_code = &body[raw.len()..];
        let (params_body, rest) = after_code.split_at(lexer::command_boundary(after_code));

        match GCode::try_from(value) {
            Ok(code) => match code.action() {
                CodeAction::Motion => {
                    if code == GCode::Rapid {
                        self.rapid(params_body, out);
                    } else {
                        self.linear(params_body, out);
                    }
                },
                CodeAction::Ignore => trace!("G{}: ignored", raw),
                CodeAction::Info(message) => info!("G{}: {}", raw, message),
                CodeAction::Report(diagnostic) => out.diagnostics.push(diagnostic),
            },
            Err(_) => out.diagnostics.push(TranslateError::UnknownGCode {
                code: raw.to_string(),
            }),
        }
        rest
    }

    fn mcode_segment<'a>(&mut self, body: &'a str, out: &mut LineOutcome) -> &'a str {
        let Some((raw, value)) = lexer::scan_code(body) else {
            let snippet: String = body.chars().take(1).collect();
            out.diagnostics
                .push(TranslateError::UnknownMCode { code: snippet });
            return &body[lexer::command_boundary(body)..];
        };

        // M 代码不取参数，段内剩余内容一并略过
        let after_code = &body[raw.len()..];
        let rest = &after_code[lexer::command_boundary(after_code)..];

        match MCode::try_from(value) {
            Ok(code) => info!("M{}: {}", raw, code.message()),
            Err(_) => out.diagnostics.push(TranslateError::UnknownMCode {
                code: raw.to_string(),
            }),
        }
        rest
    }

    /// G0/G00：快速定位。功率先归零（若开着），进给速度固定取配置的
    /// 最大值，解析到的 F/S 参数丢弃，也不改写延续状态。
    fn rapid(&mut self, params_body: &str, out: &mut LineOutcome) {
        debug!("rapid positioning segment: {:?}", params_body);
        let params = lexer::scan_params(params_body);

        if self.last_power != 0.0 {
            out.commands
                .push(CanonicalCommand::SetPower { level: 0.0 });
            self.last_power = 0.0;
        }

        match self.steps_for(params.x.unwrap_or(0.0), params.y.unwrap_or(0.0)) {
            Ok((step_x, step_y)) => out.commands.push(CanonicalCommand::Move {
                step_x,
                step_y,
                feedrate: self.config.max_feedrate,
            }),
            Err(diagnostic) => out.diagnostics.push(diagnostic),
        }
    }

    /// G1/G01：直线插补。F/S 缺省沿用上一次的值；功率变化单独发一条
    /// SetPower，进给速度变化只更新延续状态（随 Move 一起携带）。
    fn linear(&mut self, params_body: &str, out: &mut LineOutcome) {
        debug!("linear interpolation segment: {:?}", params_body);
        let params = lexer::scan_params(params_body);

        let power = params.s.unwrap_or(self.last_power);
        let feedrate = params.f.unwrap_or(self.last_feedrate);

        // 精确相等比较是语义：两侧都是解析文本的原样值
        if power != self.last_power {
            out.commands
                .push(CanonicalCommand::SetPower { level: power });
            self.last_power = power;
        }
        if feedrate != self.last_feedrate {
            self.last_feedrate = feedrate;
        }

        match self.steps_for(params.x.unwrap_or(0.0), params.y.unwrap_or(0.0)) {
            Ok((step_x, step_y)) => out.commands.push(CanonicalCommand::Move {
                step_x,
                step_y,
                feedrate,
            }),
            Err(diagnostic) => out.diagnostics.push(diagnostic),
        }
    }

    /// 亚脉冲余量换算：本段位移加上历史余量后折算为整数脉冲数，精确
    /// 残差留给下一次。舍入约定为四舍五入远离零（`f64::round`）。
    ///
    /// 脉冲数放不进 i64 时（坐标字面量溢出解析为无穷，或位移大到折算
    /// 越界）整段折算作废：上报致命诊断，两轴余量保持原值。
    fn steps_for(&mut self, x: f64, y: f64) -> Result<(i64, i64), TranslateError> {
        let x = x + self.remainder_x;
        let y = y + self.remainder_y;
        let step_x = (x / self.config.pulse_length).round();
        let step_y = (y / self.config.pulse_length).round();
        // i64::MAX as f64 即 2^63；NaN 与无穷都通不过这个比较
        if !(step_x.abs() < i64::MAX as f64 && step_y.abs() < i64::MAX as f64) {
            return Err(TranslateError::CoordinateOutOfRange { x, y });
        }
        self.remainder_x = x - step_x * self.config.pulse_length;
        self.remainder_y = y - step_y * self.config.pulse_length;
        Ok((step_x as i64, step_y as i64))
    }

    /// 流式翻译：逐行读入，指令写入输出槽，诊断带行号汇总。
    ///
    /// 遇到致命诊断时在该行后停止（除非 `keep_going`）；IO 错误向上传播。
    pub fn translate_stream<R: BufRead, S: CommandSink>(
        &mut self,
        input: R,
        sink: &mut S,
        keep_going: bool,
    ) -> io::Result<TranslationReport> {
        let mut report = TranslationReport::default();

        for (index, line) in input.lines().enumerate() {
            let line = line?;
            let number = index + 1;
            report.lines = number;

            let outcome = self.translate_line(&line);
            for command in &outcome.commands {
                sink.emit(command)?;
            }
            report.commands += outcome.commands.len();

            let fatal = outcome.fatal().is_some();
            for diagnostic in outcome.diagnostics {
                if diagnostic.is_fatal() {
                    error!("line {}: {}", number, diagnostic);
                } else {
                    warn!("line {}: {}", number, diagnostic);
                }
                report.diagnostics.push(LineDiagnostic {
                    line: number,
                    error: diagnostic,
                });
            }

            if fatal && !keep_going {
                report.aborted_at = Some(number);
                break;
            }
        }

        sink.flush()?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn laser_translator() -> Translator {
        Translator::new(TranslatorConfig {
            pulse_length: 0.02,
            max_feedrate: 20.0,
        })
    }

    /// 测试基准场景：G1 X10 Y5 F100 S50（脉冲长 0.02）
    /// 先 POWER 50 再 MOVE 500 250 @100
    #[test]
    fn test_linear_move_with_power() {
        let mut translator = laser_translator();
        let out = translator.translate_line("G1 X10 Y5 F100 S50");

        assert!(out.is_clean());
        assert_eq!(
            out.commands.as_slice(),
            &[
                CanonicalCommand::SetPower { level: 50.0 },
                CanonicalCommand::Move {
                    step_x: 500,
                    step_y: 250,
                    feedrate: 100.0
                },
            ]
        );
    }

    /// 测试 F/S 延续：第二行不带参数时沿用上一行的值
    #[test]
    fn test_carried_feedrate_and_power() {
        let mut translator = laser_translator();
        translator.translate_line("G1 X1 F100 S50");
        let out = translator.translate_line("G1 Y1");

        assert!(out.is_clean());
        // 功率没变，不再发 SetPower
        assert_eq!(
            out.commands.as_slice(),
            &[CanonicalCommand::Move {
                step_x: 0,
                step_y: 50,
                feedrate: 100.0
            }]
        );
    }

    /// 测试快速定位：功率先归零，进给速度固定为配置最大值
    #[test]
    fn test_rapid_forces_power_off() {
        let mut translator = laser_translator();
        translator.translate_line("G1 X1 F100 S50");

        let out = translator.translate_line("G0 X-1 F3 S99");
        assert_eq!(
            out.commands.as_slice(),
            &[
                CanonicalCommand::SetPower { level: 0.0 },
                CanonicalCommand::Move {
                    step_x: -50,
                    step_y: 0,
                    feedrate: 20.0
                },
            ]
        );

        // 功率已经是 0，第二个 G0 不再发 SetPower
        let out = translator.translate_line("G0 X1");
        assert_eq!(
            out.commands.as_slice(),
            &[CanonicalCommand::Move {
                step_x: 50,
                step_y: 0,
                feedrate: 20.0
            }]
        );

        // G0 不改写延续的进给速度：G1 仍然沿用 100；
        // 功率延续的是归零后的值，不会自动恢复 50
        let out = translator.translate_line("G1 X1");
        assert_eq!(
            out.commands.as_slice(),
            &[CanonicalCommand::Move {
                step_x: 50,
                step_y: 0,
                feedrate: 100.0
            }]
        );
    }

    /// 测试亚脉冲余量：两个 0.01 位移（脉冲长 0.02）漂移归零
    #[test]
    fn test_sub_pulse_remainder() {
        let mut translator = laser_translator();

        let out = translator.translate_line("G1 X0.01 F100");
        assert_eq!(
            out.commands.as_slice(),
            &[CanonicalCommand::Move {
                step_x: 1,
                step_y: 0,
                feedrate: 100.0
            }]
        );
        let (rx, _) = translator.remainders();
        assert!((rx + 0.01).abs() < 1e-12, "remainder was {}", rx);

        let out = translator.translate_line("G1 X0.01");
        assert_eq!(
            out.commands.as_slice(),
            &[CanonicalCommand::Move {
                step_x: 0,
                step_y: 0,
                feedrate: 100.0
            }]
        );
        let (rx, ry) = translator.remainders();
        assert_eq!(rx, 0.0);
        assert_eq!(ry, 0.0);
    }

    /// 测试溢出 f64 的坐标字面量：致命诊断、无指令、余量不被污染，
    /// 后续行照常折算
    #[test]
    fn test_overflowing_coordinate_is_fatal() {
        let mut translator = laser_translator();

        let line = format!("G1 X{} F10", "9".repeat(400));
        let out = translator.translate_line(&line);
        assert!(out.commands.is_empty());
        assert_eq!(
            out.diagnostics.as_slice(),
            &[TranslateError::CoordinateOutOfRange {
                x: f64::INFINITY,
                y: 0.0
            }]
        );
        assert!(out.fatal().is_some());
        let (rx, ry) = translator.remainders();
        assert_eq!(rx, 0.0);
        assert_eq!(ry, 0.0);

        let out = translator.translate_line("G1 X10 F10");
        assert!(out.is_clean());
        assert_eq!(
            out.commands.as_slice(),
            &[CanonicalCommand::Move {
                step_x: 500,
                step_y: 0,
                feedrate: 10.0
            }]
        );
    }

    /// 测试有限但折算越界的位移：拒绝整段折算，不发出截断的指令
    #[test]
    fn test_oversized_displacement_rejected() {
        let mut translator = laser_translator();

        // 1e30：字面量本身有限，折算出的脉冲数超出 i64
        let line = format!("G1 X1{} F10", "0".repeat(30));
        let out = translator.translate_line(&line);

        assert!(out.commands.is_empty());
        assert_eq!(out.diagnostics.len(), 1);
        assert!(matches!(
            out.diagnostics[0],
            TranslateError::CoordinateOutOfRange { .. }
        ));
        assert!(out.fatal().is_some());
        let (rx, ry) = translator.remainders();
        assert_eq!(rx, 0.0);
        assert_eq!(ry, 0.0);
    }

    /// 测试 G90 上报致命诊断且不产生指令
    #[test]
    fn test_absolute_positioning_is_fatal() {
        let mut translator = laser_translator();
        let out = translator.translate_line("G90");

        assert!(out.commands.is_empty());
        assert_eq!(out.fatal(), Some(&TranslateError::AbsolutePositioning));
    }

    /// 测试 M4 仅提示：无指令、无诊断
    #[test]
    fn test_mcode_informational() {
        let mut translator = laser_translator();
        let out = translator.translate_line("M4");
        assert!(out.commands.is_empty());
        assert!(out.is_clean());
    }

    /// 测试 M 代码段吞掉自己的参数（M3 S100 不误报）
    #[test]
    fn test_mcode_consumes_parameters() {
        let mut translator = laser_translator();
        let out = translator.translate_line("M3 S100");
        assert!(out.commands.is_empty());
        assert!(out.is_clean());
    }

    /// 测试未知 G 代码：非致命诊断，翻译继续
    #[test]
    fn test_unknown_gcode_nonfatal() {
        let mut translator = laser_translator();
        let out = translator.translate_line("G99");

        assert!(out.commands.is_empty());
        assert_eq!(
            out.diagnostics.as_slice(),
            &[TranslateError::UnknownGCode {
                code: "99".to_string()
            }]
        );
        assert!(out.fatal().is_none());

        // 后续行照常翻译
        let out = translator.translate_line("G1 X1 F100");
        assert_eq!(out.commands.len(), 1);
    }

    /// 测试注释原样透传
    #[test]
    fn test_comment_verbatim() {
        let mut translator = laser_translator();
        let out = translator.translate_line("; roughing pass");
        assert_eq!(
            out.commands.as_slice(),
            &[CanonicalCommand::Comment {
                text: " roughing pass".to_string()
            }]
        );
    }

    /// 测试无法解析的行
    #[test]
    fn test_unparseable_line() {
        let mut translator = laser_translator();
        let out = translator.translate_line("bogus input");
        assert!(out.commands.is_empty());
        assert_eq!(
            out.diagnostics.as_slice(),
            &[TranslateError::UnparseableLine {
                line: "bogus input".to_string()
            }]
        );
    }

    /// 测试一行多段：G1X5G1Y5 与行尾注释
    #[test]
    fn test_multi_command_line() {
        let mut translator = laser_translator();
        let out = translator.translate_line("G1X0.1F100G1Y0.1;done");

        assert!(out.is_clean());
        assert_eq!(
            out.commands.as_slice(),
            &[
                CanonicalCommand::Move {
                    step_x: 5,
                    step_y: 0,
                    feedrate: 100.0
                },
                CanonicalCommand::Move {
                    step_x: 0,
                    step_y: 5,
                    feedrate: 100.0
                },
                CanonicalCommand::Comment {
                    text: "done".to_string()
                },
            ]
        );
    }

    /// 测试空行与纯空白行不产生任何结果
    #[test]
    fn test_blank_lines() {
        let mut translator = laser_translator();
        let out = translator.translate_line("");
        assert!(out.commands.is_empty() && out.is_clean());
        let out = translator.translate_line("   \t ");
        assert!(out.commands.is_empty() && out.is_clean());
    }

    /// 测试被忽略代码静默通过（G17/G21/G40/G54）
    #[test]
    fn test_ignored_codes_silent() {
        let mut translator = laser_translator();
        for line in ["G17", "G21", "G40", "G54"] {
            let out = translator.translate_line(line);
            assert!(out.commands.is_empty(), "{} produced commands", line);
            assert!(out.is_clean(), "{} produced diagnostics", line);
        }
    }

    /// 测试 G20 上报非致命的英制单位警告
    #[test]
    fn test_inch_units_warning() {
        let mut translator = laser_translator();
        let out = translator.translate_line("G20");
        assert_eq!(out.diagnostics.as_slice(), &[TranslateError::InchUnits]);
        assert!(out.fatal().is_none());
    }

    /// 测试流式翻译：汇总与致命中止
    #[test]
    fn test_translate_stream_aborts_on_fatal() {
        use crate::sink::TextSink;

        let program = "G1 X1 F100\nG90\nG1 X1\n";
        let mut translator = laser_translator();
        let mut sink = TextSink::new(Vec::new());
        let report = translator
            .translate_stream(program.as_bytes(), &mut sink, false)
            .unwrap();

        assert_eq!(report.lines, 2);
        assert_eq!(report.commands, 1);
        assert_eq!(report.aborted_at, Some(2));
        assert_eq!(report.fatal_count(), 1);

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "MOVE 50 0 100\n");
    }

    /// 测试 keep_going 跳过致命诊断继续翻译
    #[test]
    fn test_translate_stream_keep_going() {
        use crate::sink::TextSink;

        let program = "G90\nG1 X1 F100\n";
        let mut translator = laser_translator();
        let mut sink = TextSink::new(Vec::new());
        let report = translator
            .translate_stream(program.as_bytes(), &mut sink, true)
            .unwrap();

        assert_eq!(report.lines, 2);
        assert_eq!(report.commands, 1);
        assert_eq!(report.aborted_at, None);
        assert_eq!(report.fatal_count(), 1);
        assert_eq!(report.warning_count(), 0);
    }
}
