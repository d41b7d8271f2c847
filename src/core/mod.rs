//! Core business logic abstractions

pub mod config;
pub mod cost;
pub mod error;
pub mod log;
pub mod rates;
pub mod report;
pub mod store;

// Re-export main types for cleaner imports
pub use cost::{Category, CostRecord, Currency, NewCost};
pub use error::{CostError, CostResult};
pub use rates::{RateProvider, RateSource, RateTable};
pub use report::{Report, ReportEntry, YearlyReport, get_report, get_yearly_report};
pub use store::CostStore;
