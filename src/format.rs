//! 模板格式化：把占位符替换为转义后的值、标识符或原样文本。
//!
//! 位置参数：`?` 值、`??` 标识符、`???` 原样字符串或子查询。
//! 命名参数：`:name` 值、`::name` 标识符、`:::name` 原样字符串或子查询。
//!
//! 多余的参数会被忽略；参数不足时剩余占位符按字面保留；
//! 命名参数表里没有的 key 也按字面保留（便于分阶段替换）。

use crate::error::{QueryError, Result};
use crate::escape::{escape_identifier, escape_identifiers, escape_value_with};
use crate::modifiers::{Arg, NamedArgs};
use crate::time_zone::EscapeOptions;
use crate::value::SqlValue;

/// 按默认选项格式化位置参数模板。
pub fn format(sql: &str, values: &[Arg]) -> Result<String> {
    format_with(sql, values, &EscapeOptions::default())
}

/// 格式化位置参数模板。`values` 会先被复制，调用方的数据不会被消费。
pub fn format_with(sql: &str, values: &[Arg], opts: &EscapeOptions) -> Result<String> {
    let values = values.to_vec();
    let mut next = values.iter();
    let mut out = String::with_capacity(sql.len() + values.len() * 8);

    let bytes = sql.as_bytes();
    let mut i = 0usize;
    let mut start = 0usize;
    while i < bytes.len() {
        if bytes[i] != b'?' {
            i += 1;
            continue;
        }

        out.push_str(&sql[start..i]);
        let run = bytes[i..].iter().take_while(|b| **b == b'?').count();
        let width = run.min(3);
        let marker = &sql[i..i + width];

        match next.next() {
            Some(arg) => out.push_str(&render_placeholder(marker, width, arg, opts)?),
            None => out.push_str(marker),
        }

        i += width;
        start = i;
    }
    out.push_str(&sql[start..]);
    Ok(out)
}

/// 按默认选项格式化命名参数模板。
pub fn format_named(sql: &str, values: &NamedArgs) -> Result<String> {
    format_named_with(sql, values, &EscapeOptions::default())
}

/// 格式化命名参数模板。
pub fn format_named_with(sql: &str, values: &NamedArgs, opts: &EscapeOptions) -> Result<String> {
    scan_named(sql, b':', |marker, width, name| match values.get(name) {
        Some(arg) => render_placeholder(marker, width, arg, opts).map(Some),
        None => Ok(None),
    })
}

/// 命名参数的原样模式：不做任何转义，直接代入值的文本。
pub fn format_named_verbatim(sql: &str, values: &NamedArgs) -> Result<String> {
    scan_named(sql, b':', |_, _, name| match values.get(name) {
        Some(Arg::Value(v)) => Ok(Some(v.to_string())),
        Some(Arg::Builder(b)) => b.render().map(Some),
        None => Ok(None),
    })
}

/// 语句宏展开（`$table`、`$limit` 等），原样代入；`lookup` 返回 `None` 的宏保留原文。
pub(crate) fn expand_macros<F>(sql: &str, mut lookup: F) -> Result<String>
where
    F: FnMut(&str) -> Result<Option<String>>,
{
    scan_named(sql, b'$', |_, _, name| lookup(name))
}

fn scan_named<F>(sql: &str, sigil: u8, mut resolve: F) -> Result<String>
where
    F: FnMut(&str, usize, &str) -> Result<Option<String>>,
{
    let mut out = String::with_capacity(sql.len());
    let bytes = sql.as_bytes();
    let mut i = 0usize;
    let mut start = 0usize;
    while i < bytes.len() {
        if bytes[i] != sigil {
            i += 1;
            continue;
        }

        let run = bytes[i..].iter().take_while(|b| **b == sigil).count();
        let name_start = i + run;
        let name_len = bytes[name_start..]
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
            .count();
        if name_len == 0 {
            i = name_start;
            continue;
        }

        // 超过三个前缀时，多出来的按字面保留
        let width = run.min(3);
        let marker_start = name_start - width;
        let marker = &sql[marker_start..name_start];
        let name = &sql[name_start..name_start + name_len];

        if let Some(text) = resolve(marker, width, name)? {
            out.push_str(&sql[start..marker_start]);
            out.push_str(&text);
            start = name_start + name_len;
        }
        i = name_start + name_len;
    }
    out.push_str(&sql[start..]);
    Ok(out)
}

fn render_placeholder(
    marker: &str,
    width: usize,
    arg: &Arg,
    opts: &EscapeOptions,
) -> Result<String> {
    match (width, arg) {
        (1, Arg::Value(v)) => Ok(escape_value_with(v, opts)),
        (1, Arg::Builder(b)) => Ok(format!("({})", b.render()?)),
        (2, Arg::Value(v)) => Ok(identifier_of(v)),
        (2, Arg::Builder(_)) => Err(QueryError::InvalidIdentifier(marker.to_string())),
        (_, Arg::Value(SqlValue::String(s))) => Ok(s.clone()),
        (_, Arg::Builder(b)) => Ok(format!("({})", b.render()?)),
        (_, Arg::Value(_)) => Err(QueryError::InvalidVerbatim(marker.to_string())),
    }
}

fn identifier_of(v: &SqlValue) -> String {
    match v {
        SqlValue::List(items) => escape_identifiers(items, false),
        other => escape_identifier(other, false),
    }
}
