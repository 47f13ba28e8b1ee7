//! Quota Classes and Fixed Windows
//!
//! The declarative half of rate limiting: which time unit a quota is
//! measured against, how much usage a window admits, and how wall-clock
//! time maps onto window indices.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Time unit a quota window is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaUnit {
    /// One-second windows
    Second,
    /// One-minute windows
    Minute,
    /// One-hour windows
    Hour,
    /// One-day windows
    Day,
}

impl QuotaUnit {
    /// Window length in seconds
    pub fn secs(&self) -> u64 {
        match self {
            QuotaUnit::Second => 1,
            QuotaUnit::Minute => 60,
            QuotaUnit::Hour => 3600,
            QuotaUnit::Day => 86400,
        }
    }
}

/// A named rate-limit policy: allowed usage count per time unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuotaClass {
    /// Window unit
    pub unit: QuotaUnit,

    /// Requests admitted per window
    pub usage_per_unit: u32,
}

impl QuotaClass {
    /// Create a quota class
    pub fn new(unit: QuotaUnit, usage_per_unit: u32) -> Self {
        Self {
            unit,
            usage_per_unit,
        }
    }

    /// `n` requests per second
    pub fn per_second(n: u32) -> Self {
        Self::new(QuotaUnit::Second, n)
    }

    /// `n` requests per hour
    pub fn per_hour(n: u32) -> Self {
        Self::new(QuotaUnit::Hour, n)
    }

    /// Index of the window containing `at`: unix seconds truncated to
    /// the unit
    pub fn window_index(&self, at: DateTime<Utc>) -> i64 {
        at.timestamp().div_euclid(self.unit.secs() as i64)
    }

    /// Seconds from `at` until the current window rolls over
    pub fn secs_until_rollover(&self, at: DateTime<Utc>) -> u64 {
        let secs = self.unit.secs() as i64;
        (secs - at.timestamp().rem_euclid(secs)) as u64
    }
}

/// Usage counter for one window of one `(client, class)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCounter {
    /// Window index the count belongs to
    pub window: i64,

    /// Requests admitted so far in this window
    pub count: u32,
}

impl WindowCounter {
    /// Fresh counter for a window
    pub fn new(window: i64) -> Self {
        Self { window, count: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).expect("valid timestamp")
    }

    #[test]
    fn test_unit_lengths() {
        assert_eq!(QuotaUnit::Second.secs(), 1);
        assert_eq!(QuotaUnit::Minute.secs(), 60);
        assert_eq!(QuotaUnit::Hour.secs(), 3600);
        assert_eq!(QuotaUnit::Day.secs(), 86400);
    }

    #[test]
    fn test_window_index_truncates_to_unit() {
        let class = QuotaClass::per_hour(100);
        assert_eq!(class.window_index(at(0)), 0);
        assert_eq!(class.window_index(at(3599)), 0);
        assert_eq!(class.window_index(at(3600)), 1);

        let class = QuotaClass::per_second(1);
        assert_eq!(class.window_index(at(41)), 41);
        assert_eq!(class.window_index(at(42)), 42);
    }

    #[test]
    fn test_secs_until_rollover() {
        let class = QuotaClass::per_hour(100);
        assert_eq!(class.secs_until_rollover(at(0)), 3600);
        assert_eq!(class.secs_until_rollover(at(3599)), 1);

        let class = QuotaClass::per_second(1);
        assert_eq!(class.secs_until_rollover(at(41)), 1);
    }

    #[test]
    fn test_class_serialization() {
        let class = QuotaClass::per_second(200);
        let json = serde_json::to_string(&class).unwrap();
        let parsed: QuotaClass = serde_json::from_str(&json).unwrap();
        assert_eq!(class, parsed);
    }
}
