use std::fmt;

use crate::errors::Result;

use super::date::{day_key, month_key, year_key, DatePath};

/// Independent year/month/day constraints; an unset component matches all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationFilter {
    year: Option<String>,
    month: Option<String>,
    day: Option<String>,
}

impl OperationFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn year(mut self, raw: &str) -> Result<Self> {
        self.year = Some(year_key(raw)?);
        Ok(self)
    }

    pub fn month(mut self, raw: &str) -> Result<Self> {
        self.month = Some(month_key(raw)?);
        Ok(self)
    }

    pub fn day(mut self, raw: &str) -> Result<Self> {
        self.day = Some(day_key(raw)?);
        Ok(self)
    }

    pub fn is_unrestricted(&self) -> bool {
        self.year.is_none() && self.month.is_none() && self.day.is_none()
    }

    pub fn matches_year(&self, year: &str) -> bool {
        self.year.as_deref().map_or(true, |wanted| wanted == year)
    }

    pub fn matches_month(&self, month: &str) -> bool {
        self.month.as_deref().map_or(true, |wanted| wanted == month)
    }

    pub fn matches_day(&self, day: &str) -> bool {
        self.day.as_deref().map_or(true, |wanted| wanted == day)
    }

    pub fn matches(&self, path: &DatePath) -> bool {
        self.matches_year(path.year())
            && self.matches_month(path.month())
            && self.matches_day(path.day())
    }
}

impl fmt::Display for OperationFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = |value: &Option<String>| value.clone().unwrap_or_else(|| "All".into());
        write!(
            f,
            "Year: {}    Month: {}    Day: {}",
            label(&self.year),
            label(&self.month),
            label(&self.day)
        )
    }
}
