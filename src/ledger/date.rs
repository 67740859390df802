//! Zero-padded date keys used to address the operations tree.

use std::{fmt, ops::RangeInclusive, str::FromStr};

use chrono::{Datelike, NaiveDate};

use crate::errors::{LedgerError, Result};

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Location of a single day's operation list: `Operations[year][month][day]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DatePath {
    year: String,
    month: String,
    day: String,
}

impl DatePath {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: format!("{:04}", date.year()),
            month: format!("{:02}", date.month()),
            day: format!("{:02}", date.day()),
        }
    }

    /// Builds a path from loosely formatted parts, padding each component and
    /// rejecting combinations that are not a real calendar date.
    pub fn parse(year: &str, month: &str, day: &str) -> Result<Self> {
        let path = Self {
            year: year_key(year)?,
            month: month_key(month)?,
            day: day_key(day)?,
        };
        if path.to_date().is_none() {
            return Err(LedgerError::malformed(format!(
                "{path} is not a valid calendar date"
            )));
        }
        Ok(path)
    }

    pub(crate) fn from_keys(year: &str, month: &str, day: &str) -> Self {
        Self {
            year: year.to_string(),
            month: month.to_string(),
            day: day.to_string(),
        }
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn month(&self) -> &str {
        &self.month
    }

    pub fn day(&self) -> &str {
        &self.day
    }

    pub fn to_date(&self) -> Option<NaiveDate> {
        let year = self.year.parse().ok()?;
        let month = self.month.parse().ok()?;
        let day = self.day.parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

impl fmt::Display for DatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.year, self.month, self.day)
    }
}

impl FromStr for DatePath {
    type Err = LedgerError;

    fn from_str(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let parts: Vec<&str> = trimmed.split(['-', '/']).collect();
        match parts.as_slice() {
            [year, month, day] => Self::parse(year, month, day),
            _ => Err(LedgerError::malformed(format!(
                "invalid date `{input}` (use YYYY-MM-DD)"
            ))),
        }
    }
}

impl From<NaiveDate> for DatePath {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

pub fn year_key(raw: &str) -> Result<String> {
    pad_key(raw, 4, 1..=9999, "year")
}

/// Accepts `3`, `03`, `March` or `mar` and yields `"03"`.
pub fn month_key(raw: &str) -> Result<String> {
    if let Some(index) = month_index_from_name(raw) {
        return Ok(format!("{:02}", index + 1));
    }
    pad_key(raw, 2, 1..=12, "month")
}

pub fn day_key(raw: &str) -> Result<String> {
    pad_key(raw, 2, 1..=31, "day")
}

/// English name for a stored month key, e.g. `"03"` -> `"March"`.
pub fn month_name(key: &str) -> Option<&'static str> {
    let number: usize = key.parse().ok()?;
    MONTH_NAMES.get(number.checked_sub(1)?).copied()
}

fn month_index_from_name(raw: &str) -> Option<usize> {
    let needle = raw.trim().to_ascii_lowercase();
    if needle.len() < 3 || !needle.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|name| name.to_ascii_lowercase().starts_with(&needle))
}

fn pad_key(raw: &str, width: usize, range: RangeInclusive<u32>, label: &str) -> Result<String> {
    let trimmed = raw.trim();
    let numeric = !trimmed.is_empty()
        && trimmed.len() <= width
        && trimmed.chars().all(|c| c.is_ascii_digit());
    let value = trimmed
        .parse::<u32>()
        .ok()
        .filter(|value| numeric && range.contains(value))
        .ok_or_else(|| LedgerError::malformed(format!("invalid {label} `{raw}`")))?;
    Ok(format!("{value:0width$}"))
}
