//! Calendar dates and the injected "today" (no chrono dependency).
//!
//! Uses Howard Hinnant's civil_from_days algorithm for Unix-to-date conversion.

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::constants::MIN_BIRTH_YEAR;
use crate::error::{PdsError, Result};

/// A validated Gregorian calendar date. Serializes as `YYYY-MM-DD`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Date {
    year: u16,
    month: u8,
    day: u8,
}

impl Date {
    pub const UNIX_EPOCH: Date = Date {
        year: 1970,
        month: 1,
        day: 1,
    };

    /// Stand-in birth date for a profile that has not set one.
    pub const PLACEHOLDER_BIRTH: Date = Date {
        year: 1990,
        month: 1,
        day: 1,
    };

    /// Any calendar-valid date in years 1..=9999.
    pub fn new(year: u16, month: u8, day: u8) -> Result<Self> {
        if !(1..=9999).contains(&year) {
            return Err(PdsError::invalid(format!("year {year} out of range")));
        }
        if !(1..=12).contains(&month) {
            return Err(PdsError::invalid(format!("month {month} out of range")));
        }
        let max_day = days_in_month(year, month);
        if day == 0 || day > max_day {
            return Err(PdsError::invalid(format!(
                "day {day} out of range for {year:04}-{month:02}"
            )));
        }
        Ok(Self { year, month, day })
    }

    /// A birth date: calendar-valid and no earlier than 1900.
    pub fn birth(year: u16, month: u8, day: u8) -> Result<Self> {
        if year < MIN_BIRTH_YEAR {
            return Err(PdsError::invalid(format!(
                "birth year {year} is before {MIN_BIRTH_YEAR}"
            )));
        }
        Self::new(year, month, day)
    }

    /// Parse `YYYY-MM-DD`: exactly four, two and two ASCII digits.
    pub fn parse(s: &str) -> Result<Self> {
        let text = s.trim();
        let bytes = text.as_bytes();
        let well_formed = bytes.len() == 10
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
        if !well_formed {
            return Err(PdsError::invalid(format!("expected YYYY-MM-DD, got '{s}'")));
        }
        let field = |range: std::ops::Range<usize>| {
            bytes[range]
                .iter()
                .fold(0u16, |acc, b| acc * 10 + u16::from(b - b'0'))
        };
        let (year, month, day) = (field(0..4), field(5..7), field(8..10));
        if month > 12 || day > 31 {
            return Err(PdsError::invalid(format!("'{s}' is not a calendar date")));
        }
        Self::new(year, month as u8, day as u8)
    }

    /// Parse `YYYY-MM-DD` and apply the birth-date floor.
    pub fn parse_birth(s: &str) -> Result<Self> {
        let date = Self::parse(s)?;
        Self::birth(date.year, date.month, date.day)
    }

    pub fn year(self) -> u16 {
        self.year
    }

    pub fn month(self) -> u8 {
        self.month
    }

    pub fn day(self) -> u8 {
        self.day
    }

    /// The eight digits of `YYYYMMDD`.
    pub fn digits(self) -> [u8; 8] {
        let y = self.year;
        [
            (y / 1000 % 10) as u8,
            (y / 100 % 10) as u8,
            (y / 10 % 10) as u8,
            (y % 10) as u8,
            self.month / 10,
            self.month % 10,
            self.day / 10,
            self.day % 10,
        ]
    }

    /// Completed years on `today`, counting the birthday only once it has passed.
    pub fn age_on(self, today: Date) -> Result<u32> {
        if today < self {
            return Err(PdsError::invalid(format!(
                "reference date {today} precedes birth date {self}"
            )));
        }
        let mut age = u32::from(today.year - self.year);
        if (today.month, today.day) < (self.month, self.day) {
            age -= 1;
        }
        Ok(age)
    }

    /// Date for a count of days since 1970-01-01.
    pub fn from_unix_days(days: i64) -> Result<Self> {
        let (y, m, d) = civil_from_days(days);
        let year = u16::try_from(y).map_err(|_| PdsError::invalid(format!("year {y} out of range")))?;
        Self::new(year, m as u8, d as u8)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for Date {
    type Err = PdsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Date {
    type Error = PdsError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Date> for String {
    fn from(d: Date) -> Self {
        d.to_string()
    }
}

pub fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Source of "today" for computations that depend on the current date.
pub trait Clock {
    fn today(&self) -> Date;
}

/// Reads the system clock, shifted by a fixed UTC offset in minutes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemClock {
    utc_offset_minutes: i32,
}

impl SystemClock {
    pub fn utc() -> Self {
        Self::default()
    }

    /// `480` is UTC+8, `-300` is UTC-5.
    pub fn with_offset(utc_offset_minutes: i32) -> Self {
        Self { utc_offset_minutes }
    }

    /// The local date at `unix_secs` seconds after the epoch.
    pub fn date_at(&self, unix_secs: i64) -> Date {
        let local = unix_secs + i64::from(self.utc_offset_minutes) * 60;
        Date::from_unix_days(local.div_euclid(86400)).unwrap_or(Date::UNIX_EPOCH)
    }
}

impl Clock for SystemClock {
    fn today(&self) -> Date {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.date_at(i64::try_from(secs).unwrap_or(i64::MAX))
    }
}

/// Always returns the same date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> Date {
        (**self).today()
    }
}

/// Howard Hinnant's civil_from_days: Unix epoch days → (year, month, day).
fn civil_from_days(days: i64) -> (i64, u64, u64) {
    let z = days + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d)
}
