//! TimeZone / EscapeOptions：控制日期字面量渲染与对象字符串化的配置。

use std::fmt;
use std::str::FromStr;
use time::{OffsetDateTime, UtcOffset};

/// 日期渲染时使用的时区。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeZone {
    #[default]
    Local,
    Utc,
    Offset(UtcOffset),
}

impl TimeZone {
    /// 计算 `dt` 这一时刻在当前时区下的偏移；本地偏移无法确定时回退到 UTC。
    pub fn offset_at(self, dt: OffsetDateTime) -> UtcOffset {
        match self {
            Self::Local => UtcOffset::local_offset_at(dt).unwrap_or(UtcOffset::UTC),
            Self::Utc => UtcOffset::UTC,
            Self::Offset(off) => off,
        }
    }
}

impl fmt::Display for TimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Utc => f.write_str("Z"),
            Self::Offset(off) => {
                let (h, m, _) = off.as_hms();
                let sign = if off.is_negative() { '-' } else { '+' };
                write!(f, "{sign}{:02}:{:02}", h.unsigned_abs(), m.unsigned_abs())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time zone: {0}")]
pub struct TimeZoneError(pub String);

impl FromStr for TimeZone {
    type Err = TimeZoneError;

    /// 支持 `local`、`Z`/`utc`，以及 `+HH:MM`、`-HH:MM`、`+HHMM`。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "local" | "LOCAL" => return Ok(Self::Local),
            "Z" | "z" | "utc" | "UTC" => return Ok(Self::Utc),
            _ => {}
        }

        let err = || TimeZoneError(s.to_string());
        let (sign, rest) = match s.as_bytes().first() {
            Some(b'+') => (1_i8, &s[1..]),
            Some(b'-') => (-1_i8, &s[1..]),
            _ => return Err(err()),
        };
        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let hours: i8 = digits[..2].parse().map_err(|_| err())?;
        let minutes: i8 = digits[2..].parse().map_err(|_| err())?;
        let off = UtcOffset::from_hms(sign * hours, sign * minutes, 0).map_err(|_| err())?;
        Ok(Self::Offset(off))
    }
}

/// 值转义选项。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EscapeOptions {
    /// 为 true 时，对象按其文本形式转义为字符串字面量，而不是 `` `k` = v `` 列表。
    pub stringify_objects: bool,
    pub time_zone: TimeZone,
}

impl EscapeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stringify_objects(mut self, on: bool) -> Self {
        self.stringify_objects = on;
        self
    }

    pub fn time_zone(mut self, tz: TimeZone) -> Self {
        self.time_zone = tz;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_named_zones() {
        assert_eq!("local".parse::<TimeZone>().unwrap(), TimeZone::Local);
        assert_eq!("Z".parse::<TimeZone>().unwrap(), TimeZone::Utc);
        assert_eq!("utc".parse::<TimeZone>().unwrap(), TimeZone::Utc);
    }

    #[test]
    fn parse_fixed_offsets() {
        let tz: TimeZone = "+08:00".parse().unwrap();
        assert_eq!(
            tz,
            TimeZone::Offset(UtcOffset::from_hms(8, 0, 0).unwrap())
        );
        let tz: TimeZone = "-0530".parse().unwrap();
        assert_eq!(
            tz,
            TimeZone::Offset(UtcOffset::from_hms(-5, -30, 0).unwrap())
        );
        assert_eq!(tz.to_string(), "-05:30");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("Mars/Olympus".parse::<TimeZone>().is_err());
        assert!("+8".parse::<TimeZone>().is_err());
        assert!("+99:00".parse::<TimeZone>().is_err());
    }

    #[test]
    fn options_builder() {
        let o = EscapeOptions::new()
            .stringify_objects(true)
            .time_zone(TimeZone::Utc);
        assert!(o.stringify_objects);
        assert_eq!(o.time_zone, TimeZone::Utc);
        assert_eq!(EscapeOptions::default().time_zone, TimeZone::Local);
    }
}
