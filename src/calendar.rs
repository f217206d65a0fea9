//! Logging-day keys and navigation between them.
//!
//! A logging day starts at 04:30 local time, so a snack at 01:00 still counts for
//! the previous calendar day.

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How far the logging day lags behind the calendar day.
pub const ROLLOVER_OFFSET_MINUTES: i64 = 4 * 60 + 30;

const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// A calendar date written as `YYYY-MM-DD`. String order equals date order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(NaiveDate);

#[derive(Error, Debug, Clone, PartialEq)]
#[error("'{0}' is not a YYYY-MM-DD day key")]
pub struct ParseDayKeyError(String);

impl DayKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    /// The calendar day before. Saturates at the earliest representable date.
    pub fn previous(self) -> Self {
        Self(self.0.pred_opt().unwrap_or(self.0))
    }

    /// The calendar day after. Saturates at the latest representable date.
    pub fn next(self) -> Self {
        Self(self.0.succ_opt().unwrap_or(self.0))
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_KEY_FORMAT))
    }
}

impl FromStr for DayKey {
    type Err = ParseDayKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(s, DAY_KEY_FORMAT)
            .map_err(|_| ParseDayKeyError(s.to_string()))?;
        let key = DayKey(date);
        // chrono accepts unpadded fields; only the canonical spelling keeps string order intact
        if key.to_string() != s {
            return Err(ParseDayKeyError(s.to_string()));
        }
        Ok(key)
    }
}

impl Serialize for DayKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// The logging day that `now` belongs to.
///
/// The offset is taken off the instant first and the calendar date is read in
/// `now`'s own time zone afterwards.
pub fn current_day_key<Tz: TimeZone>(now: &DateTime<Tz>) -> DayKey {
    let shifted = now.clone() - Duration::minutes(ROLLOVER_OFFSET_MINUTES);
    DayKey(shifted.date_naive())
}

/// The logging day for the local wall clock.
pub fn today() -> DayKey {
    current_day_key(&Local::now())
}

/// Prev/next stepping bounded by today and by the oldest day holding entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayNavigator {
    today: DayKey,
    earliest: Option<DayKey>,
}

impl DayNavigator {
    /// `earliest` is the oldest stored day with at least one entry; `None` when
    /// nothing has been logged, which leaves only today reachable.
    pub fn new(today: DayKey, earliest: Option<DayKey>) -> Self {
        Self { today, earliest }
    }

    pub fn today(&self) -> DayKey {
        self.today
    }

    fn lower_bound(&self) -> DayKey {
        self.earliest.map_or(self.today, |e| e.min(self.today))
    }

    pub fn previous(&self, from: DayKey) -> Option<DayKey> {
        let candidate = from.previous();
        (candidate < from && candidate >= self.lower_bound()).then_some(candidate)
    }

    pub fn next(&self, from: DayKey) -> Option<DayKey> {
        let candidate = from.next();
        (candidate > from && candidate <= self.today).then_some(candidate)
    }

    /// Pulls an arbitrary day into the navigable range.
    pub fn clamp(&self, day: DayKey) -> DayKey {
        day.clamp(self.lower_bound(), self.today)
    }

    /// Moves `offset` days from `from` (negative = back), stopping at the bounds.
    pub fn step(&self, from: DayKey, offset: i64) -> DayKey {
        let mut current = self.clamp(from);
        for _ in 0..offset.unsigned_abs() {
            let moved = if offset < 0 {
                self.previous(current)
            } else {
                self.next(current)
            };
            match moved {
                Some(day) => current = day,
                None => break,
            }
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDateTime, Utc};

    fn at(date: &str, time: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
    }

    fn key(s: &str) -> DayKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_rollover_boundary() {
        assert_eq!(current_day_key(&at("2024-06-02", "04:29:59")), key("2024-06-01"));
        assert_eq!(current_day_key(&at("2024-06-02", "04:30:00")), key("2024-06-02"));
        assert_eq!(current_day_key(&at("2024-06-02", "23:59:59")), key("2024-06-02"));
    }

    #[test]
    fn test_rollover_uses_the_given_time_zone() {
        let cest = FixedOffset::east_opt(2 * 3600).unwrap();
        // 02:00 UTC is 04:00 in UTC+2, still before the local rollover
        let now = at("2024-06-02", "02:00:00").with_timezone(&cest);
        assert_eq!(current_day_key(&now), key("2024-06-01"));
        let later = at("2024-06-02", "02:30:00").with_timezone(&cest);
        assert_eq!(current_day_key(&later), key("2024-06-02"));
    }

    #[test]
    fn test_parse_is_strict() {
        assert_eq!(key("2024-03-09").to_string(), "2024-03-09");
        assert!("2024-3-9".parse::<DayKey>().is_err());
        assert!("2024-02-30".parse::<DayKey>().is_err());
        assert!("yesterday".parse::<DayKey>().is_err());
    }

    #[test]
    fn test_string_order_matches_date_order() {
        let mut keys = vec![key("2024-10-01"), key("2023-12-31"), key("2024-02-29")];
        keys.sort();
        let strings: Vec<String> = keys.iter().map(ToString::to_string).collect();
        let mut sorted_strings = strings.clone();
        sorted_strings.sort();
        assert_eq!(strings, sorted_strings);
    }

    #[test]
    fn test_calendar_arithmetic_crosses_month_and_leap_day() {
        assert_eq!(key("2024-03-01").previous(), key("2024-02-29"));
        assert_eq!(key("2023-12-31").next(), key("2024-01-01"));
        // last Sunday of March: DST starts in most of Europe
        assert_eq!(key("2024-03-31").next(), key("2024-04-01"));
    }

    #[test]
    fn test_navigator_bounds() {
        let nav = DayNavigator::new(key("2024-06-10"), Some(key("2024-06-07")));
        assert_eq!(nav.next(key("2024-06-10")), None);
        assert_eq!(nav.next(key("2024-06-09")), Some(key("2024-06-10")));
        assert_eq!(nav.previous(key("2024-06-08")), Some(key("2024-06-07")));
        assert_eq!(nav.previous(key("2024-06-07")), None);
        assert_eq!(nav.step(key("2024-06-10"), -10), key("2024-06-07"));
        assert_eq!(nav.step(key("2024-06-07"), 2), key("2024-06-09"));
        assert_eq!(nav.clamp(key("2024-07-01")), key("2024-06-10"));
        assert_eq!(nav.clamp(key("2024-01-01")), key("2024-06-07"));
    }

    #[test]
    fn test_navigator_without_entries_stays_on_today() {
        let nav = DayNavigator::new(key("2024-06-10"), None);
        assert_eq!(nav.previous(key("2024-06-10")), None);
        assert_eq!(nav.step(key("2024-06-10"), -3), key("2024-06-10"));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&key("2024-06-01")).unwrap();
        assert_eq!(json, "\"2024-06-01\"");
        assert!(serde_json::from_str::<DayKey>("\"06/01/2024\"").is_err());
    }
}
