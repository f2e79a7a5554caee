//! 插入数据：单行/多行记录，以及 `(cols) VALUES (...)` 负载的渲染。

use crate::error::{QueryError, Result};
use crate::escape::{escape_identifier, escape_value_with};
use crate::time_zone::EscapeOptions;
use crate::value::SqlValue;

/// 一行插入数据（保持列的书写顺序）。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pairs: Vec<(String, SqlValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置列值；同名列会被覆盖，位置不变。
    pub fn set(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        let column = column.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(c, _)| *c == column) {
            Some((_, v)) => *v = value,
            None => self.pairs.push((column, value)),
        }
        self
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.pairs.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(c, _)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Record::new(), |r, (k, v)| r.set(k, v))
    }
}

/// 插入数据：单行或多行。
#[derive(Debug, Clone)]
pub enum InsertData {
    One(Record),
    Many(Vec<Record>),
}

impl InsertData {
    fn rows(&self) -> &[Record] {
        match self {
            Self::One(r) => std::slice::from_ref(r),
            Self::Many(rs) => rs,
        }
    }
}

impl From<Record> for InsertData {
    fn from(v: Record) -> Self {
        Self::One(v)
    }
}

impl From<Vec<Record>> for InsertData {
    fn from(v: Vec<Record>) -> Self {
        Self::Many(v)
    }
}

impl<const N: usize> From<[Record; N]> for InsertData {
    fn from(v: [Record; N]) -> Self {
        Self::Many(v.into())
    }
}

/// 渲染好的插入负载。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct InsertPayload {
    /// 已转义的列名，逗号分隔。
    pub(crate) columns: String,
    /// 每行 `(v1, v2, ...)`。
    pub(crate) rows: Vec<String>,
}

impl InsertPayload {
    pub(crate) fn values_text(&self) -> String {
        self.rows.join(",\n")
    }
}

/// 所有行的列集合以第一行为准；后续行缺列即报错，多出来的列被忽略。
pub(crate) fn compile_insert(data: &InsertData, opts: &EscapeOptions) -> Result<InsertPayload> {
    let rows = data.rows();
    let first = match rows.first() {
        Some(r) if !r.is_empty() => r,
        _ => return Err(QueryError::EmptyInsert),
    };
    let columns: Vec<&str> = first.columns().collect();

    let mut rendered = Vec::with_capacity(rows.len());
    for row in rows {
        let mut values = Vec::with_capacity(columns.len());
        for col in &columns {
            let v = row
                .get(col)
                .ok_or_else(|| QueryError::InsertMissingColumn((*col).to_string()))?;
            values.push(escape_value_with(v, opts));
        }
        rendered.push(format!("({})", values.join(", ")));
    }

    Ok(InsertPayload {
        columns: columns
            .iter()
            .map(|c| escape_identifier(c, false))
            .collect::<Vec<_>>()
            .join(", "),
        rows: rendered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;
    use pretty_assertions::assert_eq;

    #[test]
    fn record_set_overwrites_in_place() {
        let r = record! {"a" => 1, "b" => 2}.set("a", 9);
        assert_eq!(r.columns().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(r.get("a"), Some(&SqlValue::I64(9)));
    }

    #[test]
    fn record_from_iter() {
        let r: Record = [("x", 1_i64), ("y", 2)].into_iter().collect();
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn multi_row_payload() {
        let data = InsertData::from(vec![
            record! {"a" => 1, "b" => 2},
            record! {"b" => 4, "a" => 3},
        ]);
        let p = compile_insert(&data, &EscapeOptions::default()).unwrap();
        assert_eq!(p.columns, "`a`, `b`");
        assert_eq!(p.values_text(), "(1, 2),\n(3, 4)");
    }

    #[test]
    fn missing_column_is_an_error() {
        let data = InsertData::from(vec![record! {"a" => 1, "b" => 2}, record! {"a" => 3}]);
        assert_eq!(
            compile_insert(&data, &EscapeOptions::default()),
            Err(QueryError::InsertMissingColumn("b".into()))
        );
    }

    #[test]
    fn empty_insert_is_an_error() {
        let data = InsertData::from(Vec::<Record>::new());
        assert_eq!(
            compile_insert(&data, &EscapeOptions::default()),
            Err(QueryError::EmptyInsert)
        );
        let data = InsertData::from(Record::new());
        assert_eq!(
            compile_insert(&data, &EscapeOptions::default()),
            Err(QueryError::EmptyInsert)
        );
    }
}
