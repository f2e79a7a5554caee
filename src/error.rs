//! QueryError：构建过程中所有同步失败的统一错误类型。
//!
//! 这些错误都是调用方/输入错误，不可通过重试恢复。

use crate::query::QueryType;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    // 状态不变量
    #[error("table name is already set: {0}")]
    TableAlreadySet(String),
    #[error("query type is already set: {0}")]
    TypeAlreadySet(QueryType),
    #[error("fields are already set")]
    FieldsAlreadySet,
    #[error("alias is already registered: {0}")]
    DuplicateAlias(String),
    #[error("alias is already set: {0}")]
    AliasAlreadySet(String),
    #[error("join is required before on()")]
    JoinRequired,
    #[error("on() is already set for join: {0}")]
    OnAlreadySet(String),
    #[error("having() requires group_by() first")]
    HavingWithoutGroupBy,
    #[error("set() requires update() or on_duplicate_key_update() first")]
    SetWithoutUpdate,
    #[error("on duplicate key update requires an insert statement, got: {0}")]
    DuplicateKeyWithoutInsert(String),
    #[error("on duplicate key update requires exactly one inserted row, got {0}")]
    DuplicateKeyRowCount(usize),

    // 形状错误
    #[error("condition cannot be empty")]
    EmptyCondition,
    #[error("update cannot be empty")]
    EmptyUpdate,
    #[error("insert data cannot be empty")]
    EmptyInsert,
    #[error("insert row is missing column: {0}")]
    InsertMissingColumn(String),
    #[error("undefined value for condition keys: {}", .0.join(", "))]
    UndefinedValues(Vec<String>),

    // 运算符错误
    #[error("unsupported condition operator: {0}")]
    UnsupportedOperator(String),
    #[error("unsupported update operator: {0}")]
    UnsupportedUpdateOperator(String),
    #[error("{0} expects an array or a sub-query, field: {1}")]
    InvalidInOperand(&'static str, String),
    #[error("{0} expects a string, field: {1}")]
    InvalidLikeOperand(&'static str, String),
    #[error("{0} expects true, field: {1}")]
    InvalidNullOperand(&'static str, String),
    #[error("$raw expects a string, field: {0}")]
    InvalidRawOperand(String),

    // 模板错误
    #[error("placeholder {0} expects a string or a sub-query")]
    InvalidVerbatim(String),
    #[error("placeholder {0} cannot take a sub-query")]
    InvalidIdentifier(String),

    // 渲染错误
    #[error("table name is not set")]
    MissingTable,
    #[error("query type is not set")]
    MissingType,
    #[error("expression cannot be empty")]
    EmptyExpression,
}

pub type Result<T, E = QueryError> = std::result::Result<T, E>;
