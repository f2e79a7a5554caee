//! 语句拼接工具：按子句写入，自动处理子句之间的空格。

#[derive(Debug, Default, Clone)]
pub(crate) struct StringBuilder {
    buf: String,
}

impl StringBuilder {
    pub(crate) fn new() -> Self {
        Self { buf: String::new() }
    }

    /// 写入 `s`；如果不是首次写入，会先写入一个空格。空串直接跳过。
    pub(crate) fn write_leading(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        if !self.buf.is_empty() {
            self.buf.push(' ');
        }
        self.buf.push_str(s);
    }

    /// 写入 `KEYWORD item1<sep>item2`；列表为空时整个子句省略。
    pub(crate) fn write_clause(&mut self, keyword: &str, items: &[String], sep: &str) {
        if items.is_empty() {
            return;
        }
        self.write_leading(keyword);
        self.buf.push(' ');
        self.buf.push_str(&items.join(sep));
    }

    pub(crate) fn into_string(self) -> String {
        self.buf
    }
}
