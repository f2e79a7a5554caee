//! QueryBuilder：链式构建 SELECT / INSERT / UPDATE / DELETE / 自定义语句。
//!
//! 语句类型与表名都只能设置一次；条件、赋值在调用时立即编译为片段，
//! 所以时区等选项需要在添加条件之前设置。

use crate::condition::{Assignment, Predicate};
use crate::error::{QueryError, Result};
use crate::escape::escape_identifier;
use crate::format::expand_macros;
use crate::insert::{InsertData, InsertPayload, compile_insert};
use crate::join::{Join, JoinKind, qualify_column, render_column, render_order, table_prefix};
use crate::macros::{IntoStrings, collect_into_strings};
use crate::modifiers::{Arg, Renderable, Template, Values};
use crate::string_builder::StringBuilder;
use crate::time_zone::{EscapeOptions, TimeZone};
use std::collections::HashMap;
use std::fmt;

/// 跳过若干行但不限制行数时使用的 LIMIT 上界（u64::MAX）。
const UNBOUNDED_LIMIT: u64 = u64::MAX;

/// 语句类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    Select,
    SelectDistinct,
    Insert,
    InsertOrUpdate,
    Update,
    Delete,
    Custom,
}

impl QueryType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::SelectDistinct => "SELECT DISTINCT",
            Self::Insert => "INSERT",
            Self::InsertOrUpdate => "INSERT_OR_UPDATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Custom => "CUSTOM",
        }
    }

    fn is_select(self) -> bool {
        matches!(self, Self::Select | Self::SelectDistinct)
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 语句构建器。`clone()` 得到完全独立的副本，可以从公共前缀分叉出多个变体。
///
/// ```
/// use halo_query::{Conditions, QueryBuilder};
///
/// let mut qb = QueryBuilder::new();
/// qb.select(["id", "name"]).unwrap()
///     .from("user").unwrap()
///     .where_(Conditions::new().eq("status", 1)).unwrap()
///     .order_by_desc("id")
///     .limit(10);
/// assert_eq!(
///     qb.build().unwrap(),
///     "SELECT `id`, `name` FROM `user` WHERE `status`=1 ORDER BY `id` DESC LIMIT 10"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query_type: Option<QueryType>,
    table: Option<String>,
    alias: Option<String>,
    fields: Vec<String>,

    joins: Vec<Join>,
    pending_join: bool,
    // 别名 -> 表名；主表先起别名后设表名时表名暂为空串
    alias_tables: HashMap<String, String>,
    // 表名 -> 第一次登记的别名
    table_aliases: HashMap<String, String>,

    wheres: Vec<String>,
    sets: Vec<String>,
    insert: Option<InsertPayload>,
    inserted_rows: usize,
    custom: Option<Template>,

    group_by: Vec<String>,
    having: Vec<String>,
    order_by: Vec<String>,
    limit: u64,
    offset: u64,

    opts: EscapeOptions,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_time_zone(&mut self, tz: TimeZone) -> TimeZone {
        std::mem::replace(&mut self.opts.time_zone, tz)
    }

    pub fn time_zone(&self) -> TimeZone {
        self.opts.time_zone
    }

    pub fn set_stringify_objects(&mut self, on: bool) -> bool {
        std::mem::replace(&mut self.opts.stringify_objects, on)
    }

    pub fn options(&self) -> EscapeOptions {
        self.opts
    }

    pub fn statement_type(&self) -> Option<QueryType> {
        self.query_type
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn inserted_rows(&self) -> usize {
        self.inserted_rows
    }

    /// 表名登记过的别名（主表或任意 JOIN 表）。
    pub fn alias_of(&self, table: &str) -> Option<&str> {
        self.table_aliases.get(table).map(String::as_str)
    }

    /// 别名对应的表名。
    pub fn table_of(&self, alias: &str) -> Option<&str> {
        self.alias_tables
            .get(alias)
            .map(String::as_str)
            .filter(|t| !t.is_empty())
    }

    fn register_alias(&mut self, table: &str, alias: &str) {
        self.alias_tables.insert(alias.to_string(), table.to_string());
        if !table.is_empty() {
            self.table_aliases
                .entry(table.to_string())
                .or_insert_with(|| alias.to_string());
        }
    }

    fn set_type(&mut self, ty: QueryType) -> Result<()> {
        if let Some(cur) = self.query_type {
            return Err(QueryError::TypeAlreadySet(cur));
        }
        self.query_type = Some(ty);
        Ok(())
    }

    fn set_fields(&mut self, fields: Vec<String>) -> Result<()> {
        if fields.is_empty() {
            return Ok(());
        }
        if !self.fields.is_empty() {
            return Err(QueryError::FieldsAlreadySet);
        }
        self.fields = fields;
        Ok(())
    }

    // ---- 表与语句类型 ----

    /// 设置主表；只能设置一次。
    pub fn table(&mut self, name: impl Into<String>) -> Result<&mut Self> {
        if let Some(cur) = &self.table {
            return Err(QueryError::TableAlreadySet(cur.clone()));
        }
        let name = name.into();
        if let Some(alias) = self.alias.clone() {
            self.register_alias(&name, &alias);
        }
        self.table = Some(name);
        Ok(self)
    }

    pub fn from(&mut self, name: impl Into<String>) -> Result<&mut Self> {
        self.table(name)
    }

    pub fn into_table(&mut self, name: impl Into<String>) -> Result<&mut Self> {
        self.table(name)
    }

    /// SELECT；不传字段时渲染为 `*`。
    pub fn select<T: IntoStrings>(&mut self, fields: T) -> Result<&mut Self> {
        self.set_type(QueryType::Select)?;
        self.set_fields(collect_into_strings(fields))?;
        Ok(self)
    }

    pub fn select_distinct<T: IntoStrings>(&mut self, fields: T) -> Result<&mut Self> {
        self.set_type(QueryType::SelectDistinct)?;
        self.set_fields(collect_into_strings(fields))?;
        Ok(self)
    }

    /// 直接设置字段列表；只能设置一次。
    pub fn fields<T: IntoStrings>(&mut self, fields: T) -> Result<&mut Self> {
        self.set_fields(collect_into_strings(fields))?;
        Ok(self)
    }

    pub fn update(&mut self) -> Result<&mut Self> {
        self.set_type(QueryType::Update)?;
        Ok(self)
    }

    /// UPDATE 并以给定赋值作为初始 SET 列表；空的 `Updates` 允许，之后可以继续 `set()`。
    pub fn update_with(&mut self, assignment: impl Into<Assignment>) -> Result<&mut Self> {
        let fragments = assignment.into().fragments(&self.opts)?;
        self.set_type(QueryType::Update)?;
        self.sets = fragments;
        Ok(self)
    }

    pub fn insert(&mut self, data: impl Into<InsertData>) -> Result<&mut Self> {
        self.set_type(QueryType::Insert)?;
        let data = data.into();
        let payload = compile_insert(&data, &self.opts)?;
        self.inserted_rows = payload.rows.len();
        self.insert = Some(payload);
        Ok(self)
    }

    pub fn delete(&mut self) -> Result<&mut Self> {
        self.set_type(QueryType::Delete)?;
        Ok(self)
    }

    /// 自定义语句：模板里的 `$table`、`$fields`、`$orderBy`、`$limit`、
    /// `$skipRows`/`$offsetRows`/`$limitRows` 先按构建器状态展开，再按参数格式化。
    pub fn sql(&mut self, sql: impl Into<String>, values: impl Into<Values>) -> Result<&mut Self> {
        self.set_type(QueryType::Custom)?;
        self.custom = Some(Template::new(sql, values));
        Ok(self)
    }

    // ---- JOIN ----

    pub fn join<T: IntoStrings>(&mut self, table: impl Into<String>, fields: T) -> &mut Self {
        self.push_join(JoinKind::Inner, table.into(), collect_into_strings(fields))
    }

    pub fn left_join<T: IntoStrings>(&mut self, table: impl Into<String>, fields: T) -> &mut Self {
        self.push_join(JoinKind::Left, table.into(), collect_into_strings(fields))
    }

    pub fn right_join<T: IntoStrings>(&mut self, table: impl Into<String>, fields: T) -> &mut Self {
        self.push_join(JoinKind::Right, table.into(), collect_into_strings(fields))
    }

    fn push_join(&mut self, kind: JoinKind, table: String, fields: Vec<String>) -> &mut Self {
        self.joins.push(Join::new(kind, table, fields));
        self.pending_join = true;
        self
    }

    /// 给紧跟着的 JOIN 表设置别名；没有待定的 JOIN 时给主表设置别名。
    ///
    /// 一个 JOIN 只接受紧跟其后的一次 `as_()`：之后再调用 `as_()` 作用于主表，
    /// 所以 `left_join("w", ()).as_("B")?.as_("C")?` 得到 `` FROM `h` AS `C` LEFT JOIN `w` AS `B` ``。
    /// 同一个别名在整条语句里只能登记一次。
    pub fn as_(&mut self, alias: impl Into<String>) -> Result<&mut Self> {
        let alias = alias.into();
        if self.alias_tables.contains_key(&alias) {
            return Err(QueryError::DuplicateAlias(alias));
        }

        let (slot, table) = match self.joins.last_mut() {
            Some(j) if self.pending_join => (&mut j.alias, j.table.clone()),
            _ => (&mut self.alias, self.table.clone().unwrap_or_default()),
        };
        if let Some(cur) = slot.as_ref() {
            return Err(QueryError::AliasAlreadySet(cur.clone()));
        }
        *slot = Some(alias.clone());
        self.register_alias(&table, &alias);
        self.pending_join = false;
        Ok(self)
    }

    /// 设置最近一个 JOIN 的 ON 条件。
    pub fn on(&mut self, pred: impl Into<Predicate>) -> Result<&mut Self> {
        let pred = pred.into();
        let opts = self.opts;
        let Some(join) = self.joins.last_mut() else {
            return Err(QueryError::JoinRequired);
        };
        if join.on.is_some() {
            return Err(QueryError::OnAlreadySet(join.table.clone()));
        }
        if pred.is_empty() {
            return Err(QueryError::EmptyCondition);
        }
        join.on = Some(pred.joined(&opts)?);
        Ok(self)
    }

    pub fn on_with(&mut self, sql: impl Into<String>, values: impl Into<Values>) -> Result<&mut Self> {
        self.on(Template::new(sql, values))
    }

    // ---- WHERE ----

    /// 追加 WHERE 条件，多次调用之间按 AND 连接。
    ///
    /// 空条件只在 SELECT 语句里被接受（不产生 WHERE 子句），其它情况报错。
    pub fn where_(&mut self, pred: impl Into<Predicate>) -> Result<&mut Self> {
        let pred = pred.into();
        if self.accept_vacuous(&pred)? {
            return Ok(self);
        }
        let fragments = pred.fragments(&self.opts)?;
        self.wheres.extend(fragments);
        Ok(self)
    }

    pub fn and(&mut self, pred: impl Into<Predicate>) -> Result<&mut Self> {
        self.where_(pred)
    }

    pub fn where_with(
        &mut self,
        sql: impl Into<String>,
        values: impl Into<Values>,
    ) -> Result<&mut Self> {
        self.where_(Template::new(sql, values))
    }

    /// 与已累积的全部条件做 OR：`a`、`b` 之后再 `or_where(c)` 得到 `((a AND b) OR c)`。
    pub fn or_where(&mut self, pred: impl Into<Predicate>) -> Result<&mut Self> {
        let pred = pred.into();
        if self.accept_vacuous(&pred)? {
            return Ok(self);
        }
        let fragment = pred.joined(&self.opts)?;
        let combined = match self.wheres.len() {
            0 => fragment,
            1 => format!("({} OR {fragment})", self.wheres[0]),
            _ => format!("(({}) OR {fragment})", self.wheres.join(" AND ")),
        };
        self.wheres = vec![combined];
        Ok(self)
    }

    fn accept_vacuous(&self, pred: &Predicate) -> Result<bool> {
        if !pred.is_empty() {
            return Ok(false);
        }
        match self.query_type {
            Some(ty) if ty.is_select() => Ok(true),
            _ => Err(QueryError::EmptyCondition),
        }
    }

    // ---- SET ----

    /// 追加 SET 赋值；需要先调用 `update()` 或 `on_duplicate_key_update()`。
    pub fn set(&mut self, assignment: impl Into<Assignment>) -> Result<&mut Self> {
        match self.query_type {
            Some(QueryType::Update | QueryType::InsertOrUpdate) => {}
            _ => return Err(QueryError::SetWithoutUpdate),
        }
        let fragments = assignment.into().fragments(&self.opts)?;
        self.sets.extend(fragments);
        Ok(self)
    }

    pub fn set_with(&mut self, sql: impl Into<String>, values: impl Into<Values>) -> Result<&mut Self> {
        self.set(Template::new(sql, values))
    }

    /// INSERT 转为 `INSERT ... ON DUPLICATE KEY UPDATE`；只允许单行插入。
    pub fn on_duplicate_key_update(
        &mut self,
        assignment: impl Into<Assignment>,
    ) -> Result<&mut Self> {
        match self.query_type {
            Some(QueryType::Insert) => {}
            Some(other) => return Err(QueryError::DuplicateKeyWithoutInsert(other.to_string())),
            None => return Err(QueryError::DuplicateKeyWithoutInsert("unset".to_string())),
        }
        if self.inserted_rows != 1 {
            return Err(QueryError::DuplicateKeyRowCount(self.inserted_rows));
        }
        let fragments = assignment.into().fragments(&self.opts)?;
        self.query_type = Some(QueryType::InsertOrUpdate);
        self.sets.extend(fragments);
        Ok(self)
    }

    // ---- GROUP BY / HAVING / ORDER BY / LIMIT ----

    pub fn group_by<T: IntoStrings>(&mut self, cols: T) -> &mut Self {
        self.group_by.extend(collect_into_strings(cols));
        self
    }

    /// 需要先调用 `group_by()`；多次调用之间按 AND 连接。
    pub fn having(&mut self, pred: impl Into<Predicate>) -> Result<&mut Self> {
        if self.group_by.is_empty() {
            return Err(QueryError::HavingWithoutGroupBy);
        }
        let pred = pred.into();
        if pred.is_empty() {
            return Err(QueryError::EmptyCondition);
        }
        let fragment = pred.joined(&self.opts)?;
        self.having.push(fragment);
        Ok(self)
    }

    /// 追加排序列，支持 `"col DESC"` 形式。
    pub fn order_by<T: IntoStrings>(&mut self, cols: T) -> &mut Self {
        self.order_by.extend(collect_into_strings(cols));
        self
    }

    pub fn order_by_asc(&mut self, col: impl Into<String>) -> &mut Self {
        self.order_by.push(format!("{} ASC", col.into()));
        self
    }

    pub fn order_by_desc(&mut self, col: impl Into<String>) -> &mut Self {
        self.order_by.push(format!("{} DESC", col.into()));
        self
    }

    pub fn limit(&mut self, n: u64) -> &mut Self {
        self.limit = n;
        self
    }

    pub fn offset(&mut self, n: u64) -> &mut Self {
        self.offset = n;
        self
    }

    /// 分页：页码从 1 开始，0 按 1 处理。
    pub fn page(&mut self, page: u64, page_size: u64) -> &mut Self {
        let page = page.max(1);
        self.offset = (page - 1).saturating_mul(page_size);
        self.limit = page_size;
        self
    }

    // ---- 渲染 ----

    /// 渲染完整语句。不修改构建器状态，可以重复调用。
    pub fn build(&self) -> Result<String> {
        match self.render_statement() {
            Ok(sql) => {
                tracing::trace!(query_type = ?self.query_type, sql = %sql, "query built");
                Ok(sql)
            }
            Err(err) => {
                tracing::debug!(query_type = ?self.query_type, error = %err, "query build failed");
                Err(err)
            }
        }
    }

    fn render_statement(&self) -> Result<String> {
        let ty = self.query_type.ok_or(QueryError::MissingType)?;
        if ty == QueryType::Custom {
            return self.render_custom();
        }
        let table = escape_identifier(self.table.as_deref().ok_or(QueryError::MissingTable)?, false);

        let mut sb = StringBuilder::new();
        match ty {
            QueryType::Select | QueryType::SelectDistinct => {
                sb.write_leading(ty.as_str());
                sb.write_leading(&self.field_list().join(", "));
                sb.write_leading("FROM");
                sb.write_leading(&table);
                if let Some(alias) = &self.alias {
                    sb.write_leading("AS");
                    sb.write_leading(&escape_identifier(alias, true));
                }
                for join in &self.joins {
                    sb.write_leading(&join.clause());
                }
                sb.write_clause("WHERE", &self.wheres, " AND ");
                if !self.group_by.is_empty() {
                    let cols: Vec<String> = self.group_by.iter().map(|c| render_column(c)).collect();
                    sb.write_clause("GROUP BY", &cols, ", ");
                    sb.write_clause("HAVING", &self.having, " AND ");
                }
                self.write_tail(&mut sb);
            }
            QueryType::Insert => {
                let payload = self.insert.as_ref().ok_or(QueryError::EmptyInsert)?;
                sb.write_leading("INSERT INTO");
                sb.write_leading(&table);
                sb.write_leading(&format!("({}) VALUES", payload.columns));
                sb.write_leading(&payload.values_text());
            }
            QueryType::InsertOrUpdate => {
                let payload = self.insert.as_ref().ok_or(QueryError::EmptyInsert)?;
                if self.sets.is_empty() {
                    return Err(QueryError::EmptyUpdate);
                }
                sb.write_leading("INSERT INTO");
                sb.write_leading(&table);
                sb.write_leading(&format!("({}) VALUES", payload.columns));
                sb.write_leading(&payload.values_text());
                sb.write_clause("ON DUPLICATE KEY UPDATE", &self.sets, ", ");
            }
            QueryType::Update => {
                if self.sets.is_empty() {
                    return Err(QueryError::EmptyUpdate);
                }
                sb.write_leading("UPDATE");
                sb.write_leading(&table);
                sb.write_clause("SET", &self.sets, ", ");
                sb.write_clause("WHERE", &self.wheres, " AND ");
                self.write_tail(&mut sb);
            }
            QueryType::Delete => {
                sb.write_leading("DELETE FROM");
                sb.write_leading(&table);
                sb.write_clause("WHERE", &self.wheres, " AND ");
                self.write_tail(&mut sb);
            }
            QueryType::Custom => {}
        }
        Ok(sb.into_string())
    }

    fn write_tail(&self, sb: &mut StringBuilder) {
        sb.write_clause("ORDER BY", &self.order_entries(), ", ");
        sb.write_leading(&self.limit_clause());
    }

    fn order_entries(&self) -> Vec<String> {
        self.order_by.iter().map(|e| render_order(e)).collect()
    }

    /// `LIMIT n` / `LIMIT off,n` / `LIMIT off,18446744073709551615`；都为 0 时为空串。
    fn limit_clause(&self) -> String {
        match (self.offset, self.limit) {
            (0, 0) => String::new(),
            (0, n) => format!("LIMIT {n}"),
            (off, 0) => format!("LIMIT {off},{UNBOUNDED_LIMIT}"),
            (off, n) => format!("LIMIT {off},{n}"),
        }
    }

    /// 有 JOIN 时所有字段都带上表前缀，JOIN 表的字段按声明顺序追加在后面；
    /// 主表没有字段时取 `prefix.*`。
    ///
    /// 前缀优先用该条目自己的别名，其次用同名表登记过的别名，最后用转义后的表名。
    fn field_list(&self) -> Vec<String> {
        let mut out: Vec<String> = if self.joins.is_empty() {
            self.fields.iter().map(|f| render_column(f)).collect()
        } else {
            let table = self.table.as_deref().unwrap_or_default();
            let prefix = table_prefix(table, self.alias.as_deref().or(self.alias_of(table)));
            let mut out: Vec<String> = if self.fields.is_empty() {
                vec![format!("{prefix}.*")]
            } else {
                self.fields
                    .iter()
                    .map(|f| qualify_column(&prefix, f))
                    .collect()
            };
            for join in &self.joins {
                let prefix = table_prefix(
                    &join.table,
                    join.alias.as_deref().or(self.alias_of(&join.table)),
                );
                out.extend(join.fields.iter().map(|f| qualify_column(&prefix, f)));
            }
            out
        };
        if out.is_empty() {
            out.push("*".to_string());
        }
        out
    }

    fn render_custom(&self) -> Result<String> {
        let Some(template) = &self.custom else {
            return Err(QueryError::MissingType);
        };

        let mut macros: HashMap<&'static str, String> = HashMap::new();
        macros.insert("fields", self.field_list().join(", "));
        let order = self.order_entries();
        macros.insert(
            "orderBy",
            if order.is_empty() {
                String::new()
            } else {
                format!("ORDER BY {}", order.join(", "))
            },
        );
        macros.insert("limit", self.limit_clause());
        macros.insert("skipRows", self.offset.to_string());
        macros.insert("offsetRows", self.offset.to_string());
        macros.insert("limitRows", self.limit.to_string());

        let expanded = expand_macros(&template.sql, |name| match name {
            "table" => self
                .table
                .as_deref()
                .map(|t| Some(escape_identifier(t, false)))
                .ok_or(QueryError::MissingTable),
            _ => Ok(macros.get(name).cloned()),
        })?;
        Template {
            sql: expanded,
            values: template.values.clone(),
        }
        .render(&self.opts)
    }
}

impl Renderable for QueryBuilder {
    fn render(&self) -> Result<String> {
        self.build()
    }
}

impl From<QueryBuilder> for Arg {
    fn from(v: QueryBuilder) -> Self {
        Self::Builder(Box::new(v))
    }
}

impl From<&QueryBuilder> for Arg {
    fn from(v: &QueryBuilder) -> Self {
        Self::Builder(Box::new(v.clone()))
    }
}
