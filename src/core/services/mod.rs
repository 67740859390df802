pub mod category_service;
pub mod operation_service;
pub mod summary_service;

pub use category_service::CategoryService;
pub use operation_service::OperationService;
pub use summary_service::{SpendEarnSplit, SummaryService};

use crate::errors::LedgerError;

pub type ServiceResult<T> = Result<T, LedgerError>;
