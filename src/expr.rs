//! Expression：把若干 AND/OR 子条件累积成一个带括号的布尔表达式。

use crate::condition::Predicate;
use crate::error::{QueryError, Result};
use crate::modifiers::{Arg, Renderable, Template, Values};
use crate::time_zone::EscapeOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Empty,
    Condition,
}

/// 布尔表达式构建器。
///
/// ```
/// use halo_query::{Conditions, Expression};
///
/// let mut e = Expression::new();
/// e.and(Conditions::new().eq("a", 1)).unwrap()
///     .or("b IS NULL").unwrap();
/// assert_eq!(e.build().unwrap(), "(`a`=1 OR b IS NULL)");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Expression {
    buf: String,
    state: State,
    opts: EscapeOptions,
}

impl Expression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(opts: EscapeOptions) -> Self {
        Self {
            opts,
            ..Self::default()
        }
    }

    pub fn and(&mut self, pred: impl Into<Predicate>) -> Result<&mut Self> {
        self.push("AND", pred.into())
    }

    pub fn or(&mut self, pred: impl Into<Predicate>) -> Result<&mut Self> {
        self.push("OR", pred.into())
    }

    pub fn and_with(
        &mut self,
        sql: impl Into<String>,
        values: impl Into<Values>,
    ) -> Result<&mut Self> {
        self.push("AND", Template::new(sql, values).into())
    }

    pub fn or_with(
        &mut self,
        sql: impl Into<String>,
        values: impl Into<Values>,
    ) -> Result<&mut Self> {
        self.push("OR", Template::new(sql, values).into())
    }

    pub fn is_empty(&self) -> bool {
        self.state == State::Empty
    }

    fn push(&mut self, connector: &str, pred: Predicate) -> Result<&mut Self> {
        if pred.is_empty() {
            return Err(QueryError::EmptyCondition);
        }
        let fragment = pred.joined(&self.opts)?;
        self.buf.push(' ');
        self.buf.push_str(connector);
        self.buf.push(' ');
        self.buf.push_str(&fragment);
        self.state = State::Condition;
        Ok(self)
    }

    /// 渲染为 `( ... )`；去掉开头多余的连接词。可重复调用。
    pub fn build(&self) -> Result<String> {
        if self.state == State::Empty {
            return Err(QueryError::EmptyExpression);
        }
        let body = self.buf.trim();
        let body = body
            .strip_prefix("AND ")
            .or_else(|| body.strip_prefix("OR "))
            .unwrap_or(body);
        Ok(format!("({body})"))
    }
}

impl Renderable for Expression {
    fn render(&self) -> Result<String> {
        self.build()
    }
}

impl From<Expression> for Arg {
    fn from(v: Expression) -> Self {
        Self::Builder(Box::new(v))
    }
}
