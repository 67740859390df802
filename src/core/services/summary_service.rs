use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::ledger::{month_key, year_key, Ledger};

use super::ServiceResult;

/// Spending (absolute value of negative entries) versus earning for a month.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpendEarnSplit {
    pub spending: f64,
    pub earning: f64,
}

impl SpendEarnSplit {
    pub fn is_empty(&self) -> bool {
        self.spending == 0.0 && self.earning == 0.0
    }

    pub fn total(&self) -> f64 {
        self.spending + self.earning
    }

    /// Percentage of the month's volume that was spent, `None` without data.
    pub fn spending_share(&self) -> Option<f64> {
        (!self.is_empty()).then(|| self.spending * 100.0 / self.total())
    }

    pub fn earning_share(&self) -> Option<f64> {
        (!self.is_empty()).then(|| self.earning * 100.0 / self.total())
    }
}

pub struct SummaryService;

impl SummaryService {
    /// Sorted years that hold operations, or just `today`'s year when none do.
    pub fn list_years(ledger: &Ledger, today: NaiveDate) -> Vec<String> {
        let years: Vec<String> = ledger.operations().years().map(str::to_string).collect();
        if years.is_empty() {
            vec![format!("{:04}", today.year())]
        } else {
            years
        }
    }

    /// Sum of values per day present in the month; days without entries are
    /// absent rather than zero.
    pub fn monthly_daily_totals(
        ledger: &Ledger,
        year: &str,
        month: &str,
    ) -> ServiceResult<BTreeMap<String, f64>> {
        let year = year_key(year)?;
        let month = month_key(month)?;
        let totals = ledger
            .operations()
            .month(&year, &month)
            .map(|days| {
                days.iter()
                    .map(|(day, ops)| (day.clone(), ops.iter().map(|op| op.value).sum::<f64>()))
                    .collect::<BTreeMap<_, _>>()
            })
            .unwrap_or_default();
        Ok(totals)
    }

    pub fn month_split(ledger: &Ledger, year: &str, month: &str) -> ServiceResult<SpendEarnSplit> {
        let year = year_key(year)?;
        let month = month_key(month)?;
        let mut split = SpendEarnSplit::default();
        let days = ledger.operations().month(&year, &month);
        for op in days.into_iter().flat_map(|days| days.values().flatten()) {
            if op.is_spending() {
                split.spending += op.value.abs();
            } else {
                split.earning += op.value;
            }
        }
        Ok(split)
    }

    pub fn current_month_split(ledger: &Ledger, today: NaiveDate) -> SpendEarnSplit {
        let year = format!("{:04}", today.year());
        let month = format!("{:02}", today.month());
        Self::month_split(ledger, &year, &month).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{DatePath, Operation};

    fn ledger_with(entries: &[(&str, f64)]) -> Ledger {
        let mut ledger = Ledger::new();
        for (date, value) in entries {
            let path: DatePath = date.parse().unwrap();
            ledger.insert_operation(&path, Operation::new(*value, "shopping"));
        }
        ledger
    }

    #[test]
    fn split_separates_spending_and_earning() {
        let ledger = ledger_with(&[
            ("2024-03-01", -50.0),
            ("2024-03-02", -20.0),
            ("2024-03-02", 30.0),
            ("2024-04-01", -999.0),
        ]);
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let split = SummaryService::current_month_split(&ledger, today);
        assert_eq!(split, SpendEarnSplit { spending: 70.0, earning: 30.0 });
        assert_eq!(split.spending_share(), Some(70.0));
    }

    #[test]
    fn split_is_empty_without_data() {
        let ledger = ledger_with(&[("2023-01-01", 5.0)]);
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let split = SummaryService::current_month_split(&ledger, today);
        assert!(split.is_empty());
        assert_eq!(split.earning_share(), None);
    }

    #[test]
    fn daily_totals_skip_empty_days() {
        let ledger = ledger_with(&[
            ("2024-02-01", -10.0),
            ("2024-02-01", 25.0),
            ("2024-02-09", -4.0),
        ]);
        let totals = SummaryService::monthly_daily_totals(&ledger, "2024", "February").unwrap();
        let expected: BTreeMap<String, f64> =
            [("01".to_string(), 15.0), ("09".to_string(), -4.0)].into();
        assert_eq!(totals, expected);

        let none = SummaryService::monthly_daily_totals(&ledger, "2024", "3").unwrap();
        assert!(none.is_empty());
        assert!(SummaryService::monthly_daily_totals(&ledger, "2024", "13").is_err());
    }

    #[test]
    fn years_default_to_today() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(SummaryService::list_years(&Ledger::new(), today), vec!["2026"]);

        let ledger = ledger_with(&[("2023-01-01", 1.0), ("2021-05-05", 1.0)]);
        assert_eq!(SummaryService::list_years(&ledger, today), vec!["2021", "2023"]);
    }
}
