//! halo-query：链式 SQL 文本构建库（MySQL 反引号方言）。
//!
//! 提供值/标识符转义、`?`/`:name` 模板格式化、条件/更新映射编译、
//! 布尔表达式构建器以及 SELECT/INSERT/UPDATE/DELETE/自定义语句构建器。

pub mod condition;
pub mod error;
pub mod escape;
pub mod executor;
pub mod expr;
pub mod format;
pub mod insert;
pub mod join;
pub mod macros;
pub use crate::macros::*;
pub mod modifiers;
pub mod query;
#[cfg(test)]
mod select_tests;
mod string_builder;
pub mod time_zone;
#[cfg(test)]
mod update_delete_tests;
pub mod value;
pub mod valuer;

pub use crate::condition::{
    Assignment, ConditionValue, Conditions, Operator, Predicate, UpdateValue, Updates,
};
pub use crate::error::{QueryError, Result};
pub use crate::escape::{
    escape_identifier, escape_identifiers, escape_string, escape_value, escape_value_with,
};
pub use crate::executor::{Connection, DispatchError, Statement, execute};
pub use crate::expr::Expression;
pub use crate::format::{format, format_named, format_named_verbatim, format_named_with, format_with};
pub use crate::insert::{InsertData, Record};
pub use crate::join::JoinKind;
pub use crate::modifiers::{Arg, NamedArgs, Renderable, Template, Values};
pub use crate::query::{QueryBuilder, QueryType};
pub use crate::time_zone::{EscapeOptions, TimeZone, TimeZoneError};
pub use crate::value::{Raw, SqlValue, raw};
pub use crate::valuer::ToSqlString;
