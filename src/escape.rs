//! 转义原语：把值/标识符转成可安全拼入 SQL 的文本（反引号方言）。
//!
//! 这里的函数都是纯函数，不持有任何状态。

use crate::time_zone::{EscapeOptions, TimeZone};
use crate::value::SqlValue;
use std::fmt::Display;
use time::OffsetDateTime;
use time::macros::format_description;

/// 转义单个标识符。
///
/// - 内部的反引号会被加倍；
/// - `forbid_qualified` 为 false 时按 `.` 切分，每段单独加引号（`a.b` => `` `a`.`b` ``）；
/// - 为 true 时 `.` 视为普通字符（`a.b` => `` `a.b` ``）。
pub fn escape_identifier(value: impl Display, forbid_qualified: bool) -> String {
    let s = value.to_string();
    let mut out = String::with_capacity(s.len() + 2);
    out.push('`');
    for ch in s.chars() {
        match ch {
            '`' => out.push_str("``"),
            '.' if !forbid_qualified => out.push_str("`.`"),
            _ => out.push(ch),
        }
    }
    out.push('`');
    out
}

/// 批量转义标识符，逗号分隔。
pub fn escape_identifiers<T: Display>(
    values: impl IntoIterator<Item = T>,
    forbid_qualified: bool,
) -> String {
    values
        .into_iter()
        .map(|v| escape_identifier(v, forbid_qualified))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 按默认选项（不字符串化对象、本地时区）转义值。
pub fn escape_value(value: &SqlValue) -> String {
    escape_value_with(value, &EscapeOptions::default())
}

/// 把值渲染为 SQL 字面量文本。
pub fn escape_value_with(value: &SqlValue, opts: &EscapeOptions) -> String {
    let mut out = String::new();
    write_value(&mut out, value, opts);
    out
}

/// 转义字符串并加单引号。
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    quote_string(&mut out, s);
    out
}

fn write_value(out: &mut String, value: &SqlValue, opts: &EscapeOptions) {
    match value {
        SqlValue::Null => out.push_str("NULL"),
        SqlValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        SqlValue::I64(n) => out.push_str(&n.to_string()),
        SqlValue::U64(n) => out.push_str(&n.to_string()),
        SqlValue::F64(n) => write_f64(out, *n),
        SqlValue::String(s) => quote_string(out, s),
        SqlValue::Bytes(b) => {
            out.push('X');
            let mut hex = String::with_capacity(b.len() * 2);
            push_hex(&mut hex, b);
            quote_string(out, &hex);
        }
        SqlValue::DateTime(dt) => write_datetime(out, *dt, opts.time_zone),
        SqlValue::Raw(r) => out.push_str(&r.sql),
        SqlValue::List(items) => write_list(out, items, opts),
        SqlValue::Object(pairs) => {
            if opts.stringify_objects {
                quote_string(out, &value.to_string());
            } else {
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&escape_identifier(k, false));
                    out.push_str(" = ");
                    write_value(out, v, opts);
                }
            }
        }
        SqlValue::Custom(c) => out.push_str(&c.to_sql_string()),
    }
}

fn write_list(out: &mut String, items: &[SqlValue], opts: &EscapeOptions) {
    for (i, v) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        if let SqlValue::List(inner) = v {
            out.push('(');
            write_list(out, inner, opts);
            out.push(')');
        } else {
            write_value(out, v, opts);
        }
    }
}

fn write_f64(out: &mut String, n: f64) {
    if n.is_nan() {
        out.push_str("NaN");
    } else if n.is_infinite() {
        out.push_str(if n > 0.0 { "Infinity" } else { "-Infinity" });
    } else if n == 0.0 {
        // -0.0 也输出 0
        out.push('0');
    } else {
        out.push_str(&n.to_string());
    }
}

fn push_hex(out: &mut String, data: &[u8]) {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    for &b in data {
        out.push(HEX[((b >> 4) & 0xF) as usize] as char);
        out.push(HEX[(b & 0xF) as usize] as char);
    }
}

fn quote_string(out: &mut String, s: &str) {
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\u{0000}' => out.push_str("\\0"),
            '\u{0008}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{001a}' => out.push_str("\\Z"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
}

/// 日期渲染为 `'YYYY-MM-DD HH:MM:SS.mmm'`；无法换算到目标时区时渲染 `NULL`。
fn write_datetime(out: &mut String, dt: OffsetDateTime, tz: TimeZone) {
    match format_datetime(dt, tz) {
        Some(s) => quote_string(out, &s),
        None => out.push_str("NULL"),
    }
}

pub(crate) fn format_datetime(dt: OffsetDateTime, tz: TimeZone) -> Option<String> {
    let shifted = dt.checked_to_offset(tz.offset_at(dt))?;
    shifted
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
        ))
        .ok()
}
