//! 模板参数与子查询能力：`Arg`、`Renderable`、`Values`、`Template`。

use crate::error::Result;
use crate::value::{Raw, SqlValue};
use dyn_clone::DynClone;
use std::collections::HashMap;
use std::fmt;

/// 可作为子查询嵌入的对象：查询构建器、表达式构建器都实现了它。
pub trait Renderable: DynClone + fmt::Debug + Send + Sync {
    /// 渲染出完整的 SQL 文本（不含外层括号）。
    fn render(&self) -> Result<String>;
}

dyn_clone::clone_trait_object!(Renderable);

impl Renderable for Box<dyn Renderable> {
    fn render(&self) -> Result<String> {
        (**self).render()
    }
}

/// 模板占位符绑定的参数：普通值或子查询。
#[derive(Debug, Clone)]
pub enum Arg {
    Value(SqlValue),
    Builder(Box<dyn Renderable>),
}

impl Arg {
    pub fn builder(b: impl Renderable + 'static) -> Self {
        Self::Builder(Box::new(b))
    }

    pub fn as_value(&self) -> Option<&SqlValue> {
        match self {
            Self::Value(v) => Some(v),
            Self::Builder(_) => None,
        }
    }
}

impl PartialEq for Arg {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a == b,
            _ => false,
        }
    }
}

impl From<SqlValue> for Arg {
    fn from(v: SqlValue) -> Self {
        Self::Value(v)
    }
}

impl From<Box<dyn Renderable>> for Arg {
    fn from(v: Box<dyn Renderable>) -> Self {
        Self::Builder(v)
    }
}

macro_rules! arg_from_value {
    ($($t:ty),*) => {
        $(impl From<$t> for Arg {
            fn from(v: $t) -> Self {
                Self::Value(SqlValue::from(v))
            }
        })*
    };
}

arg_from_value!(
    (),
    bool,
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    String,
    &str,
    &String,
    time::OffsetDateTime,
    Raw
);

impl<T: Into<SqlValue>> From<Option<T>> for Arg {
    fn from(v: Option<T>) -> Self {
        Self::Value(SqlValue::from_option(v))
    }
}

impl<T: Into<SqlValue>> From<Vec<T>> for Arg {
    fn from(v: Vec<T>) -> Self {
        Self::Value(SqlValue::from(v))
    }
}

impl<T: Into<SqlValue>, const N: usize> From<[T; N]> for Arg {
    fn from(v: [T; N]) -> Self {
        Self::Value(SqlValue::from(v))
    }
}

/// 命名参数表（`:name` / `::name` / `:::name`）。
pub type NamedArgs = HashMap<String, Arg>;

/// 模板参数：位置参数与命名参数两种方言，一次调用只能用其中一种。
#[derive(Debug, Clone, Default)]
pub enum Values {
    #[default]
    None,
    Positional(Vec<Arg>),
    Named(NamedArgs),
}

impl From<Vec<Arg>> for Values {
    fn from(v: Vec<Arg>) -> Self {
        Self::Positional(v)
    }
}

impl From<NamedArgs> for Values {
    fn from(v: NamedArgs) -> Self {
        Self::Named(v)
    }
}

impl From<()> for Values {
    fn from(_: ()) -> Self {
        Self::None
    }
}

/// 带参数的 SQL 模板片段。
#[derive(Debug, Clone)]
pub struct Template {
    pub sql: String,
    pub values: Values,
}

impl Template {
    pub fn new(sql: impl Into<String>, values: impl Into<Values>) -> Self {
        Self {
            sql: sql.into(),
            values: values.into(),
        }
    }

    /// 按参数方言格式化模板。
    pub fn render(&self, opts: &crate::time_zone::EscapeOptions) -> Result<String> {
        match &self.values {
            Values::None => Ok(self.sql.clone()),
            Values::Positional(v) => crate::format::format_with(&self.sql, v, opts),
            Values::Named(m) => crate::format::format_named_with(&self.sql, m, opts),
        }
    }
}

impl From<&str> for Template {
    fn from(v: &str) -> Self {
        Self::new(v, ())
    }
}

impl From<String> for Template {
    fn from(v: String) -> Self {
        Self::new(v, ())
    }
}
