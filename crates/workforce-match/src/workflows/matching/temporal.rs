use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

const SECONDS_PER_DAY: i64 = 86_400;

/// Date captured at the ingestion boundary.
///
/// Unparseable input keeps its raw text so the owning record can be excluded from a pass
/// (and logged) rather than failing the whole pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlexibleDate {
    Valid(NaiveDate),
    Invalid(String),
}

impl FlexibleDate {
    pub fn parse(raw: &str) -> Self {
        match parse_flexible_date(raw) {
            Some(date) => Self::Valid(date),
            None => Self::Invalid(raw.trim().to_string()),
        }
    }

    /// Strings are parsed; any other JSON value (an epoch number, say) is kept verbatim as invalid.
    fn from_json(value: Value) -> Self {
        match value {
            Value::String(text) => Self::parse(&text),
            other => Self::Invalid(other.to_string()),
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Valid(date) => Some(*date),
            Self::Invalid(_) => None,
        }
    }
}

impl From<NaiveDate> for FlexibleDate {
    fn from(value: NaiveDate) -> Self {
        Self::Valid(value)
    }
}

impl fmt::Display for FlexibleDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Invalid(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for FlexibleDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FlexibleDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_json)
    }
}

/// Serde helper: blank strings and nulls become `None`, anything else is parsed leniently.
pub fn optional_flexible_date<'de, D>(deserializer: D) -> Result<Option<FlexibleDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) if text.trim().is_empty() => None,
        Some(value) => Some(FlexibleDate::from_json(value)),
    })
}

/// Parse ISO dates, ISO/RFC 3339 timestamps and `dd/MM/yyyy` dates.
pub fn parse_flexible_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%d/%m/%Y") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, pattern) {
            return Some(dt.date());
        }
    }

    None
}

/// Signed whole calendar days from `from` to `to`; negative when `to` is earlier.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Fractional day difference rounded up, so 2.1 days reports as 3.
pub fn ceil_days_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    let seconds = (to - from).num_seconds();
    let whole = seconds.div_euclid(SECONDS_PER_DAY);
    if seconds.rem_euclid(SECONDS_PER_DAY) > 0 {
        whole + 1
    } else {
        whole
    }
}

/// Instant a matching pass is evaluated against. Captured once so a pass is time-consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassClock {
    now: NaiveDateTime,
}

impl PassClock {
    pub fn at(now: NaiveDateTime) -> Self {
        Self { now }
    }

    pub fn on(date: NaiveDate) -> Self {
        Self::at(date.and_time(NaiveTime::MIN))
    }

    pub fn current() -> Self {
        Self::at(Local::now().naive_local())
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }

    pub fn days_until(&self, date: NaiveDate) -> i64 {
        days_between(self.today(), date)
    }

    pub fn starts_in(&self, date: NaiveDate) -> i64 {
        ceil_days_between(self.now, date.and_time(NaiveTime::MIN))
    }
}

/// Closed integer-day interval relative to the pass clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub start: i64,
    pub end: i64,
}

impl DayWindow {
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, days: i64) -> bool {
        self.start <= days && days <= self.end
    }
}

impl fmt::Display for DayWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("day window must look like `start..end` with start <= end, found '{0}'")]
pub struct DayWindowParseError(pub String);

impl FromStr for DayWindow {
    type Err = DayWindowParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || DayWindowParseError(value.to_string());
        let (start, end) = value.trim().split_once("..").ok_or_else(invalid)?;
        let start = start.trim().parse::<i64>().map_err(|_| invalid())?;
        let end = end.trim().parse::<i64>().map_err(|_| invalid())?;
        if start > end {
            return Err(invalid());
        }
        Ok(Self::new(start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn parses_iso_and_day_first_formats() {
        assert_eq!(parse_flexible_date("2025-03-14"), Some(date(2025, 3, 14)));
        assert_eq!(parse_flexible_date(" 14/03/2025 "), Some(date(2025, 3, 14)));
        assert_eq!(
            parse_flexible_date("2025-03-14T09:30:00Z"),
            Some(date(2025, 3, 14))
        );
        assert_eq!(
            parse_flexible_date("2025-03-14T09:30:00.000"),
            Some(date(2025, 3, 14))
        );
    }

    #[test]
    fn rejects_garbage_without_panicking() {
        assert_eq!(parse_flexible_date(""), None);
        assert_eq!(parse_flexible_date("ASAP"), None);
        assert_eq!(parse_flexible_date("31/02/2025"), None);
        assert_eq!(
            FlexibleDate::parse("next week"),
            FlexibleDate::Invalid("next week".to_string())
        );
    }

    #[test]
    fn days_between_is_signed() {
        let today = date(2025, 3, 1);
        assert_eq!(days_between(today, date(2025, 3, 11)), 10);
        assert_eq!(days_between(today, date(2025, 2, 22)), -7);
    }

    #[test]
    fn starts_in_rounds_partial_days_up() {
        let clock = PassClock::at(date(2025, 3, 1).and_hms_opt(2, 24, 0).expect("valid time"));
        // 9.9 days away
        assert_eq!(clock.starts_in(date(2025, 3, 11)), 10);
        assert_eq!(clock.days_until(date(2025, 3, 11)), 10);

        let midnight = PassClock::on(date(2025, 3, 1));
        assert_eq!(midnight.starts_in(date(2025, 3, 11)), 10);
        assert_eq!(midnight.starts_in(date(2025, 2, 27)), -2);
    }

    #[test]
    fn day_window_parses_and_checks_bounds() {
        let window: DayWindow = "-7..60".parse().expect("window parses");
        assert_eq!(window, DayWindow::new(-7, 60));
        assert!(window.contains(-7));
        assert!(window.contains(60));
        assert!(!window.contains(61));
        assert!("60..-7".parse::<DayWindow>().is_err());
        assert!("soon".parse::<DayWindow>().is_err());
    }

    #[test]
    fn non_string_dates_are_kept_as_invalid() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "optional_flexible_date")]
            start: Option<FlexibleDate>,
        }

        let row: Row = serde_json::from_str(r#"{ "start": 20250310 }"#).expect("row parses");
        assert_eq!(row.start, Some(FlexibleDate::Invalid("20250310".to_string())));

        let row: Row = serde_json::from_str(r#"{ "start": null }"#).expect("row parses");
        assert_eq!(row.start, None);

        let date: FlexibleDate = serde_json::from_str("false").expect("date parses");
        assert_eq!(date, FlexibleDate::Invalid("false".to_string()));
    }
}
