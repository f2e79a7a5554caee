//! 执行分发：把 SQL 文本或构建器交给外部连接执行。
//!
//! 本 crate 不做任何 I/O；`Connection` 是唯一的异步边界，由调用方实现。

use crate::error::QueryError;
use crate::expr::Expression;
use crate::modifiers::Renderable;
use crate::query::QueryBuilder;
use crate::value::SqlValue;
use std::future::Future;

/// 外部连接能力。
pub trait Connection: Send + Sync {
    type Output;
    type Error;

    /// 执行一条 SQL，`params` 为可选的位置参数。
    fn query(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> impl Future<Output = Result<Self::Output, Self::Error>> + Send;
}

/// 待执行的语句：原始 SQL 或尚未渲染的构建器。
#[derive(Debug, Clone)]
pub enum Statement {
    Sql(String),
    Builder(Box<dyn Renderable>),
}

impl Statement {
    pub fn render(&self) -> Result<String, QueryError> {
        match self {
            Self::Sql(sql) => Ok(sql.clone()),
            Self::Builder(b) => b.render(),
        }
    }
}

impl From<&str> for Statement {
    fn from(v: &str) -> Self {
        Self::Sql(v.to_string())
    }
}

impl From<String> for Statement {
    fn from(v: String) -> Self {
        Self::Sql(v)
    }
}

impl From<QueryBuilder> for Statement {
    fn from(v: QueryBuilder) -> Self {
        Self::Builder(Box::new(v))
    }
}

impl From<&QueryBuilder> for Statement {
    fn from(v: &QueryBuilder) -> Self {
        Self::Builder(Box::new(v.clone()))
    }
}

impl From<Expression> for Statement {
    fn from(v: Expression) -> Self {
        Self::Builder(Box::new(v))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError<E> {
    #[error(transparent)]
    Build(#[from] QueryError),
    #[error("connection error: {0}")]
    Connection(E),
}

/// 渲染语句（构建器会先 `build()`），然后交给连接执行。
///
/// 渲染在返回 future 之前同步完成，渲染失败时 future 直接返回错误。
pub fn execute<C: Connection>(
    conn: &C,
    statement: impl Into<Statement>,
    params: &[SqlValue],
) -> impl Future<Output = Result<C::Output, DispatchError<C::Error>>> + Send {
    let statement: Statement = statement.into();
    let rendered = statement.render();
    async move {
        let sql = rendered?;
        tracing::debug!(sql = %sql, params = params.len(), "dispatching statement");
        conn.query(&sql, params)
            .await
            .map_err(DispatchError::Connection)
    }
}
