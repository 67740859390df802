//! Year → month → day → operations tree.
//!
//! Keys are zero-padded strings held in ordered maps, so iteration order is
//! chronological without an explicit sort step.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::Result;

use super::date::{day_key, month_key, year_key, DatePath};
use super::filter::OperationFilter;
use super::operation::Operation;

pub type DayMap = BTreeMap<String, Vec<Operation>>;
pub type MonthMap = BTreeMap<String, DayMap>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationTree(BTreeMap<String, MonthMap>);

impl OperationTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn operation_count(&self) -> usize {
        self.operations().count()
    }

    pub fn years(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    pub fn month(&self, year: &str, month: &str) -> Option<&DayMap> {
        self.0.get(year)?.get(month)
    }

    pub fn day(&self, path: &DatePath) -> Option<&[Operation]> {
        self.month(path.year(), path.month())?
            .get(path.day())
            .map(Vec::as_slice)
    }

    /// Every day list in chronological order.
    pub fn days(&self) -> impl Iterator<Item = (DatePath, &[Operation])> + '_ {
        self.0.iter().flat_map(|(year, months)| {
            months.iter().flat_map(move |(month, days)| {
                days.iter()
                    .map(move |(day, ops)| (DatePath::from_keys(year, month, day), ops.as_slice()))
            })
        })
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> + '_ {
        self.days().flat_map(|(_, ops)| ops.iter())
    }

    pub fn total(&self) -> f64 {
        self.operations().map(|op| op.value).sum()
    }

    /// Sum of absolute values; bounds the rounding error of [`Self::total`].
    pub fn volume(&self) -> f64 {
        self.operations().map(|op| op.value.abs()).sum()
    }

    pub fn locate(&self, id: Uuid) -> Option<(DatePath, usize)> {
        self.days().find_map(|(path, ops)| {
            ops.iter()
                .position(|op| op.id == id)
                .map(|index| (path, index))
        })
    }

    /// Copies the days matching `filter`, keeping the nested shape and leaving
    /// out containers that end up empty.
    pub fn filtered(&self, filter: &OperationFilter) -> OperationTree {
        let mut result = OperationTree::new();
        for (year, months) in self.0.iter().filter(|(year, _)| filter.matches_year(year)) {
            for (month, days) in months.iter().filter(|(month, _)| filter.matches_month(month)) {
                for (day, ops) in days.iter().filter(|(day, _)| filter.matches_day(day)) {
                    if ops.is_empty() {
                        continue;
                    }
                    result
                        .0
                        .entry(year.clone())
                        .or_default()
                        .entry(month.clone())
                        .or_default()
                        .insert(day.clone(), ops.clone());
                }
            }
        }
        result
    }

    pub(crate) fn push(&mut self, path: &DatePath, operation: Operation) {
        self.0
            .entry(path.year().to_string())
            .or_default()
            .entry(path.month().to_string())
            .or_default()
            .entry(path.day().to_string())
            .or_default()
            .push(operation);
    }

    pub(crate) fn get_mut(&mut self, path: &DatePath, index: usize) -> Option<&mut Operation> {
        self.0
            .get_mut(path.year())?
            .get_mut(path.month())?
            .get_mut(path.day())?
            .get_mut(index)
    }

    /// Removes one operation and prunes the day, month and year containers
    /// that become empty.
    pub(crate) fn remove(&mut self, path: &DatePath, index: usize) -> Option<Operation> {
        let months = self.0.get_mut(path.year())?;
        let days = months.get_mut(path.month())?;
        let ops = days.get_mut(path.day())?;
        if index >= ops.len() {
            return None;
        }
        let removed = ops.remove(index);
        if ops.is_empty() {
            days.remove(path.day());
            if days.is_empty() {
                months.remove(path.month());
                if months.is_empty() {
                    self.0.remove(path.year());
                }
            }
        }
        Some(removed)
    }

    /// Rewrites every key to its zero-padded form, merging lists whose keys
    /// collide and dropping empty containers. Returns how many keys were
    /// rewritten or dropped.
    pub(crate) fn normalize(&mut self) -> Result<usize> {
        let mut adjustments = 0;
        let mut normalized: BTreeMap<String, MonthMap> = BTreeMap::new();
        for (year, months) in &self.0 {
            let canonical_year = year_key(year)?;
            adjustments += usize::from(&canonical_year != year);
            if months.is_empty() {
                adjustments += 1;
            }
            for (month, days) in months {
                let canonical_month = month_key(month)?;
                adjustments += usize::from(&canonical_month != month);
                if days.is_empty() {
                    adjustments += 1;
                }
                for (day, ops) in days {
                    let canonical_day = day_key(day)?;
                    adjustments += usize::from(&canonical_day != day);
                    if ops.is_empty() {
                        adjustments += 1;
                        continue;
                    }
                    normalized
                        .entry(canonical_year.clone())
                        .or_default()
                        .entry(canonical_month.clone())
                        .or_default()
                        .entry(canonical_day)
                        .or_default()
                        .extend(ops.iter().cloned());
                }
            }
        }
        self.0 = normalized;
        Ok(adjustments)
    }
}
