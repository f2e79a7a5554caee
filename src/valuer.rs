//! ToSqlString：值自带 SQL 渲染钩子。
//!
//! 实现该 trait 的值在转义时不再走默认规则，而是直接使用钩子返回的文本。

/// 自定义 SQL 渲染钩子，返回的文本原样拼入 SQL。
pub trait ToSqlString: dyn_clone::DynClone + std::fmt::Debug + Send + Sync {
    fn to_sql_string(&self) -> String;
}

dyn_clone::clone_trait_object!(ToSqlString);
