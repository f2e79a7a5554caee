//! JOIN 条目与字段/列的渲染规则。

use crate::escape::escape_identifier;

/// JOIN 类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Inner => "JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Join {
    pub(crate) kind: JoinKind,
    pub(crate) table: String,
    pub(crate) fields: Vec<String>,
    pub(crate) alias: Option<String>,
    pub(crate) on: Option<String>,
}

impl Join {
    pub(crate) fn new(kind: JoinKind, table: String, fields: Vec<String>) -> Self {
        Self {
            kind,
            table,
            fields,
            alias: None,
            on: None,
        }
    }

    /// `LEFT JOIN `w` AS `B` ON ...`
    pub(crate) fn clause(&self) -> String {
        let mut out = format!(
            "{} {}",
            self.kind.as_str(),
            escape_identifier(&self.table, false)
        );
        if let Some(alias) = &self.alias {
            out.push_str(" AS ");
            out.push_str(&escape_identifier(alias, true));
        }
        if let Some(on) = &self.on {
            out.push_str(" ON ");
            out.push_str(on);
        }
        out
    }
}

/// 字段前缀：有别名用别名，否则用转义后的表名。
pub(crate) fn table_prefix(table: &str, alias: Option<&str>) -> String {
    match alias {
        Some(a) => escape_identifier(a, true),
        None => escape_identifier(table, false),
    }
}

/// 已经是表达式的列（`*`、带别名、函数调用、已加引号）原样输出。
fn is_verbatim(field: &str) -> bool {
    field == "*"
        || field.starts_with('`')
        || field.contains(' ')
        || field.contains('(')
}

/// 不带前缀的列：普通名字按标识符转义（`a.b` 会拆成限定名）。
pub(crate) fn render_column(field: &str) -> String {
    if is_verbatim(field) {
        field.to_string()
    } else {
        escape_identifier(field, false)
    }
}

/// 带表前缀的列；已经限定过的名字（含 `.`）不再加前缀。
pub(crate) fn qualify_column(prefix: &str, field: &str) -> String {
    if field == "*" || field.starts_with('`') {
        return format!("{prefix}.{field}");
    }
    if is_verbatim(field) || field.contains('.') {
        return render_column(field);
    }
    format!("{prefix}.{}", escape_identifier(field, true))
}

/// ORDER BY 条目：`col`、`col ASC`、`col DESC`（方向不区分大小写）。
pub(crate) fn render_order(entry: &str) -> String {
    let entry = entry.trim();
    if let Some((col, dir)) = entry.rsplit_once(' ') {
        let dir = dir.to_ascii_uppercase();
        if dir == "ASC" || dir == "DESC" {
            return format!("{} {dir}", render_column(col.trim()));
        }
    }
    render_column(entry)
}
