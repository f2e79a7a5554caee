//! 条件编译与更新编译：把字段到值/运算符的映射转成 WHERE 谓词片段与 SET 赋值片段。

use crate::error::{QueryError, Result};
use crate::escape::{escape_identifier, escape_string, escape_value_with};
use crate::expr::Expression;
use crate::modifiers::{Arg, Template};
use crate::time_zone::EscapeOptions;
use crate::value::SqlValue;
use std::fmt;
use std::str::FromStr;

/// 条件运算符（运算符 key 统一以 `$` 开头）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    NotIn,
    Like,
    NotLike,
    IsNull,
    IsNotNull,
    Raw,
}

impl Operator {
    pub fn key(self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::Ne => "$ne",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::In => "$in",
            Self::NotIn => "$notIn",
            Self::Like => "$like",
            Self::NotLike => "$notLike",
            Self::IsNull => "$isNull",
            Self::IsNotNull => "$isNotNull",
            Self::Raw => "$raw",
        }
    }

    fn comparison(self) -> Option<&'static str> {
        match self {
            Self::Eq => Some("="),
            Self::Ne => Some("<>"),
            Self::Lt => Some("<"),
            Self::Lte => Some("<="),
            Self::Gt => Some(">"),
            Self::Gte => Some(">="),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        let op = match s {
            "$eq" => Self::Eq,
            "$ne" => Self::Ne,
            "$lt" => Self::Lt,
            "$lte" => Self::Lte,
            "$gt" => Self::Gt,
            "$gte" => Self::Gte,
            "$in" => Self::In,
            "$notIn" => Self::NotIn,
            "$like" => Self::Like,
            "$notLike" => Self::NotLike,
            "$isNull" => Self::IsNull,
            "$isNotNull" => Self::IsNotNull,
            "$raw" => Self::Raw,
            _ => return Err(QueryError::UnsupportedOperator(s.to_string())),
        };
        Ok(op)
    }
}

/// 单个字段的条件：等值、运算符列表，或“未定义”（用于捕获误传的空值）。
#[derive(Debug, Clone)]
pub enum ConditionValue {
    Equals(Arg),
    Operators(Vec<(Operator, Arg)>),
    Undefined,
}

/// 有序的条件映射。
#[derive(Debug, Clone, Default)]
pub struct Conditions {
    raw: Option<String>,
    entries: Vec<(String, ConditionValue)>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 等值条件：`` `field`=value ``。
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.entries
            .push((field.into(), ConditionValue::Equals(value.into())));
        self
    }

    /// `None` 视为未定义值，编译时报错。
    pub fn eq_opt<T: Into<Arg>>(mut self, field: impl Into<String>, value: Option<T>) -> Self {
        let v = match value {
            Some(v) => ConditionValue::Equals(v.into()),
            None => ConditionValue::Undefined,
        };
        self.entries.push((field.into(), v));
        self
    }

    /// 追加运算符条件；同一字段连续调用会合并到同一个运算符对象里。
    pub fn op(mut self, field: impl Into<String>, op: Operator, value: impl Into<Arg>) -> Self {
        let field = field.into();
        let value = value.into();
        if let Some((last, ConditionValue::Operators(ops))) = self.entries.last_mut()
            && *last == field
        {
            ops.push((op, value));
            return self;
        }
        self.entries
            .push((field, ConditionValue::Operators(vec![(op, value)])));
        self
    }

    /// 按运算符 key（如 `"$lt"`）追加条件，未知 key 报错。
    pub fn from_operator(
        self,
        field: impl Into<String>,
        key: &str,
        value: impl Into<Arg>,
    ) -> Result<Self> {
        let op: Operator = key.parse()?;
        Ok(self.op(field, op, value))
    }

    pub fn ne(self, field: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.op(field, Operator::Ne, value)
    }

    pub fn lt(self, field: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.op(field, Operator::Lt, value)
    }

    pub fn lte(self, field: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.op(field, Operator::Lte, value)
    }

    pub fn gt(self, field: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.op(field, Operator::Gt, value)
    }

    pub fn gte(self, field: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.op(field, Operator::Gte, value)
    }

    pub fn in_(self, field: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.op(field, Operator::In, value)
    }

    pub fn not_in(self, field: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.op(field, Operator::NotIn, value)
    }

    pub fn like(self, field: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.op(field, Operator::Like, value)
    }

    pub fn not_like(self, field: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.op(field, Operator::NotLike, value)
    }

    pub fn is_null(self, field: impl Into<String>) -> Self {
        self.op(field, Operator::IsNull, true)
    }

    pub fn is_not_null(self, field: impl Into<String>) -> Self {
        self.op(field, Operator::IsNotNull, true)
    }

    /// 顶层原样谓词，不绑定字段，编译时排在最前面。
    pub fn raw(mut self, sql: impl Into<String>) -> Self {
        self.raw = Some(sql.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_none() && self.entries.is_empty()
    }

    pub fn undefined_keys(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, v)| matches!(v, ConditionValue::Undefined))
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// 编译成谓词片段列表，片段之间按 AND 连接。
    pub fn compile(&self, opts: &EscapeOptions) -> Result<Vec<String>> {
        let undefined = self.undefined_keys();
        if !undefined.is_empty() {
            return Err(QueryError::UndefinedValues(undefined));
        }

        let mut out = Vec::with_capacity(self.entries.len() + 1);
        if let Some(raw) = &self.raw {
            out.push(raw.clone());
        }

        for (field, value) in &self.entries {
            let quoted = escape_identifier(field, false);
            match value {
                ConditionValue::Equals(arg) => {
                    out.push(format!("{quoted}={}", render_operand(arg, opts)?));
                }
                ConditionValue::Operators(ops) => {
                    for (op, arg) in ops {
                        out.push(compile_operator(&quoted, field, *op, arg, opts)?);
                    }
                }
                ConditionValue::Undefined => {}
            }
        }
        Ok(out)
    }
}

fn render_operand(arg: &Arg, opts: &EscapeOptions) -> Result<String> {
    match arg {
        Arg::Value(v) => Ok(escape_value_with(v, opts)),
        Arg::Builder(b) => Ok(format!("({})", b.render()?)),
    }
}

fn compile_operator(
    quoted: &str,
    field: &str,
    op: Operator,
    arg: &Arg,
    opts: &EscapeOptions,
) -> Result<String> {
    if let Some(sym) = op.comparison() {
        return Ok(format!("{quoted}{sym}{}", render_operand(arg, opts)?));
    }

    match op {
        Operator::In | Operator::NotIn => {
            let not = if op == Operator::NotIn { " NOT" } else { "" };
            match arg {
                Arg::Builder(b) => Ok(format!("{quoted}{not} IN ({})", b.render()?)),
                Arg::Value(SqlValue::List(items)) if items.is_empty() => {
                    // IN () 不是合法 SQL：IN 恒假，NOT IN 恒真
                    let guard = if op == Operator::In { '0' } else { '1' };
                    Ok(format!(
                        "{guard} /* empty list warn: {quoted}{not} IN () */"
                    ))
                }
                Arg::Value(list @ SqlValue::List(_)) => Ok(format!(
                    "{quoted}{not} IN ({})",
                    escape_value_with(list, opts)
                )),
                Arg::Value(_) => Err(QueryError::InvalidInOperand(op.key(), field.to_string())),
            }
        }
        Operator::Like | Operator::NotLike => {
            let not = if op == Operator::NotLike { " NOT" } else { "" };
            match arg {
                Arg::Value(SqlValue::String(s)) => {
                    Ok(format!("{quoted}{not} LIKE {}", escape_string(s)))
                }
                _ => Err(QueryError::InvalidLikeOperand(op.key(), field.to_string())),
            }
        }
        Operator::IsNull | Operator::IsNotNull => {
            let not = if op == Operator::IsNotNull { " NOT" } else { "" };
            match arg {
                Arg::Value(SqlValue::Bool(true)) => Ok(format!("{quoted} IS{not} NULL")),
                _ => Err(QueryError::InvalidNullOperand(op.key(), field.to_string())),
            }
        }
        Operator::Raw => match raw_text(arg) {
            Some(sql) => Ok(format!("{quoted}={sql}")),
            None => Err(QueryError::InvalidRawOperand(field.to_string())),
        },
        _ => Err(QueryError::UnsupportedOperator(op.key().to_string())),
    }
}

fn raw_text(arg: &Arg) -> Option<&str> {
    match arg {
        Arg::Value(SqlValue::String(s)) => Some(s),
        Arg::Value(SqlValue::Raw(r)) => Some(r.as_str()),
        _ => None,
    }
}

/// 单个字段的更新方式。
#[derive(Debug, Clone)]
pub enum UpdateValue {
    Set(Arg),
    Incr(Arg),
    Decr(Arg),
    Raw(String),
}

/// 有序的更新映射。对象类型的值永远按普通值转义，不会被当作运算符解析。
#[derive(Debug, Clone, Default)]
pub struct Updates {
    entries: Vec<(String, UpdateValue)>,
}

impl Updates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.entries
            .push((field.into(), UpdateValue::Set(value.into())));
        self
    }

    pub fn incr(mut self, field: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.entries
            .push((field.into(), UpdateValue::Incr(value.into())));
        self
    }

    pub fn decr(mut self, field: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.entries
            .push((field.into(), UpdateValue::Decr(value.into())));
        self
    }

    pub fn raw(mut self, field: impl Into<String>, sql: impl Into<String>) -> Self {
        self.entries
            .push((field.into(), UpdateValue::Raw(sql.into())));
        self
    }

    /// 按 `$incr` / `$decr` / `$raw` 追加，其它 key 报错。
    pub fn from_operator(
        self,
        field: impl Into<String>,
        key: &str,
        value: impl Into<Arg>,
    ) -> Result<Self> {
        let field = field.into();
        let value = value.into();
        match key {
            "$incr" => Ok(self.incr(field, value)),
            "$decr" => Ok(self.decr(field, value)),
            "$raw" => match raw_text(&value) {
                Some(sql) => {
                    let sql = sql.to_string();
                    Ok(self.raw(field, sql))
                }
                None => Err(QueryError::InvalidRawOperand(field)),
            },
            _ => Err(QueryError::UnsupportedUpdateOperator(key.to_string())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 编译成 SET 赋值片段列表。
    pub fn compile(&self, opts: &EscapeOptions) -> Result<Vec<String>> {
        let mut out = Vec::with_capacity(self.entries.len());
        for (field, value) in &self.entries {
            let quoted = escape_identifier(field, false);
            let fragment = match value {
                UpdateValue::Set(arg) => format!("{quoted}={}", render_operand(arg, opts)?),
                UpdateValue::Incr(arg) => {
                    format!("{quoted}={quoted}+({})", render_operand(arg, opts)?)
                }
                UpdateValue::Decr(arg) => {
                    format!("{quoted}={quoted}-({})", render_operand(arg, opts)?)
                }
                UpdateValue::Raw(sql) => format!("{quoted}={sql}"),
            };
            out.push(fragment);
        }
        Ok(out)
    }
}

/// 条件输入：格式化字符串、表达式构建器，或条件映射。
#[derive(Debug, Clone)]
pub enum Predicate {
    Template(Template),
    Expression(Expression),
    Map(Conditions),
}

impl Predicate {
    /// 渲染为谓词片段；字符串与表达式各产出一个片段。
    pub fn fragments(&self, opts: &EscapeOptions) -> Result<Vec<String>> {
        match self {
            Self::Template(t) => Ok(vec![t.render(opts)?]),
            Self::Expression(e) => Ok(vec![e.build()?]),
            Self::Map(m) => m.compile(opts),
        }
    }

    /// 空字符串（去除首尾空白后）或空映射。
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Template(t) => t.sql.trim().is_empty(),
            Self::Expression(_) => false,
            Self::Map(m) => m.is_empty(),
        }
    }

    /// 渲染为单个片段：多个片段时用 AND 连接并加括号。
    pub(crate) fn joined(&self, opts: &EscapeOptions) -> Result<String> {
        let mut parts = self.fragments(opts)?;
        if parts.len() == 1 {
            return Ok(parts.remove(0));
        }
        Ok(format!("({})", parts.join(" AND ")))
    }
}

impl From<&str> for Predicate {
    fn from(v: &str) -> Self {
        Self::Template(v.into())
    }
}

impl From<String> for Predicate {
    fn from(v: String) -> Self {
        Self::Template(v.into())
    }
}

impl From<Template> for Predicate {
    fn from(v: Template) -> Self {
        Self::Template(v)
    }
}

impl From<Expression> for Predicate {
    fn from(v: Expression) -> Self {
        Self::Expression(v)
    }
}

impl From<&Expression> for Predicate {
    fn from(v: &Expression) -> Self {
        Self::Expression(v.clone())
    }
}

impl From<Conditions> for Predicate {
    fn from(v: Conditions) -> Self {
        Self::Map(v)
    }
}

/// 更新输入：格式化字符串或更新映射。
#[derive(Debug, Clone)]
pub enum Assignment {
    Template(Template),
    Map(Updates),
}

impl Assignment {
    pub(crate) fn fragments(&self, opts: &EscapeOptions) -> Result<Vec<String>> {
        match self {
            Self::Template(t) => {
                if t.sql.trim().is_empty() {
                    return Err(QueryError::EmptyUpdate);
                }
                Ok(vec![t.render(opts)?])
            }
            Self::Map(m) => m.compile(opts),
        }
    }
}

impl From<&str> for Assignment {
    fn from(v: &str) -> Self {
        Self::Template(v.into())
    }
}

impl From<String> for Assignment {
    fn from(v: String) -> Self {
        Self::Template(v.into())
    }
}

impl From<Template> for Assignment {
    fn from(v: Template) -> Self {
        Self::Template(v)
    }
}

impl From<Updates> for Assignment {
    fn from(v: Updates) -> Self {
        Self::Map(v)
    }
}
