//! 行内词法原语
//!
//! 翻译器把一行 G 代码拆成「命令段」，每段内再做参数扫描。本模块收拢
//! 这些扫描原语，全部为纯函数：
//!
//! - [`scan_code`]：命令字母后的数字代码（最多两位，`0`/`00` 等价）
//! - [`command_boundary`]：段参数体的右边界（下一个 `g G m M ;`）
//! - [`scan_number`]：带符号十进制数，接受规则严格
//! - [`scan_params`]：参数体内的 x/y/f/s 参数字
//!
//! 数字接受规则：可选的前导符号（仅限开头一个）、至多一个小数点、至少
//! 一个数字。扫描总是吞掉整段 `[0-9 + - .]` 字符；不合规的段（尾随符号、
//! 双小数点、裸 `.`）取值为 `None`，但消耗长度照常返回，调用方据此跳过
//! 垃圾内容。参数字后跟不合规数字时，该次出现被忽略。

/// 扫描带符号十进制数。
///
/// 返回 `(值, 消耗的字节数)`。消耗长度覆盖从头开始的整段
/// `[0-9+-.]` 字符，与该段是否构成合法数字无关。
pub fn scan_number(input: &str) -> (Option<f64>, usize) {
    let bytes = input.as_bytes();
    let mut end = 0;
    while end < bytes.len() && matches!(bytes[end], b'0'..=b'9' | b'.' | b'+' | b'-') {
        end += 1;
    }
    if end == 0 {
        return (None, 0);
    }

    let run = &input[..end];
    let value = if is_valid_decimal(run) {
        run.parse::<f64>().ok()
    } else {
        None
    };
    (value, end)
}

/// 合法十进制形态：`[+-]? digits [. digits]?`，其中整体至少一个数字、
/// 至多一个小数点、符号只允许在开头出现一次。
fn is_valid_decimal(run: &str) -> bool {
    let rest = run.strip_prefix(['+', '-']).unwrap_or(run);
    let mut digits = 0usize;
    let mut dots = 0usize;
    for c in rest.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            // 内嵌符号（如 "5-" "1+2"）
            _ => return false,
        }
    }
    digits > 0 && dots <= 1
}

/// 扫描命令字母后的数字代码：最多取两个 ASCII 数字。
///
/// 返回 `(原始数字串, 数值)`。原始串保留 `0` 与 `00` 的书写差异，
/// 用于诊断回显；数值用于查表。首字符不是数字时返回 `None`。
pub fn scan_code(input: &str) -> Option<(&str, u8)> {
    let len = input
        .bytes()
        .take(2)
        .take_while(|b| b.is_ascii_digit())
        .count();
    if len == 0 {
        return None;
    }
    let raw = &input[..len];
    let value = raw.parse::<u8>().ok()?;
    Some((raw, value))
}

/// 段参数体的右边界：下一个命令起始字符（`g G m M ;`）的下标，
/// 没有则为串长。
pub fn command_boundary(input: &str) -> usize {
    input
        .find(['g', 'G', 'm', 'M', ';'])
        .unwrap_or(input.len())
}

/// 一段参数体内扫描到的参数字。`None` 表示该参数字未出现
/// （或每次出现都跟着不合规数字）；缺省值由翻译器决定。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParamSet {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub f: Option<f64>,
    pub s: Option<f64>,
}

/// 逐字符扫描参数体。识别的参数字（x/y/f/s，大小写不敏感）后紧跟
/// 合法数字则写入对应槽位，后出现的覆盖先出现的；其余字符一律跳过。
pub fn scan_params(body: &str) -> ParamSet {
    let mut params = ParamSet::default();
    let bytes = body.as_bytes();
    let mut index = 0;

    while index < bytes.len() {
        let letter = bytes[index].to_ascii_lowercase();
        index += 1;

        let slot = match letter {
            b'x' => &mut params.x,
            b'y' => &mut params.y,
            b'f' => &mut params.f,
            b's' => &mut params.s,
            _ => continue,
        };

        let (value, consumed) = scan_number(&body[index..]);
        if value.is_some() {
            *slot = value;
        }
        index += consumed;
    }

    params
}
