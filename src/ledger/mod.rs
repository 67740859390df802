//! Ledger document model: operations tree, categories and balance.

pub mod balance;
pub mod category;
pub mod date;
pub mod filter;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod operation;
pub mod tree;

pub use balance::Balance;
pub use category::{CategoryRegistry, DEFAULT_CATEGORIES, DEFAULT_CATEGORY};
pub use date::{day_key, month_key, month_name, year_key, DatePath, MONTH_NAMES};
pub use filter::OperationFilter;
pub use ledger::{Ledger, BALANCE_KEY, CATEGORIES_KEY, DOCUMENT_KEYS, OPERATIONS_KEY};
pub use operation::{parse_amount, Operation, OperationEntry};
pub use tree::{DayMap, MonthMap, OperationTree};
