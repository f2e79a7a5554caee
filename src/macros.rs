//! 宏集合：`args!` / `named!` / `record!`，以及字段列表的 `IntoStrings` 输入。

/// 构造位置参数列表：`args![1, "a", sub_query]`。
#[macro_export]
macro_rules! args {
    () => {
        Vec::<$crate::Arg>::new()
    };
    ($($value:expr),+ $(,)?) => {
        vec![$($crate::Arg::from($value)),+]
    };
}

/// 构造命名参数表：`named!{"id" => 1, "name" => "foo"}`。
#[macro_export]
macro_rules! named {
    () => {
        $crate::NamedArgs::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut values = $crate::NamedArgs::new();
        $(
            values.insert(::std::string::String::from($key), $crate::Arg::from($value));
        )+
        values
    }};
}

/// 构造一行插入数据：`record!{"a" => 1, "b" => 2}`。
#[macro_export]
macro_rules! record {
    () => {
        $crate::Record::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Record::new()$(.set($key, $value))+
    };
}

/// 字段/列名列表输入：支持单个字符串、数组、切片与 Vec。
pub trait IntoStrings {
    fn extend_into_strings(self, dst: &mut Vec<String>);
}

impl IntoStrings for String {
    fn extend_into_strings(self, dst: &mut Vec<String>) {
        dst.push(self);
    }
}

impl IntoStrings for &str {
    fn extend_into_strings(self, dst: &mut Vec<String>) {
        dst.push(self.to_string());
    }
}

impl<const N: usize, T> IntoStrings for [T; N]
where
    T: Into<String>,
{
    fn extend_into_strings(self, dst: &mut Vec<String>) {
        dst.extend(self.into_iter().map(Into::into));
    }
}

impl<T> IntoStrings for &[T]
where
    T: Into<String> + Clone,
{
    fn extend_into_strings(self, dst: &mut Vec<String>) {
        dst.extend(self.iter().cloned().map(Into::into));
    }
}

impl<T> IntoStrings for Vec<T>
where
    T: Into<String>,
{
    fn extend_into_strings(self, dst: &mut Vec<String>) {
        dst.extend(self.into_iter().map(Into::into));
    }
}

impl IntoStrings for () {
    fn extend_into_strings(self, _dst: &mut Vec<String>) {}
}

pub(crate) fn collect_into_strings<T: IntoStrings>(value: T) -> Vec<String> {
    let mut dst = Vec::new();
    value.extend_into_strings(&mut dst);
    dst
}
