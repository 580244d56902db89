//! Fixed-installment ("French") loan amortization: rate convention conversions,
//! baseline schedules and schedules shortened by extra principal payments.

pub mod compare;
pub mod config;
pub mod error;
pub mod extras;
pub mod loan;
pub mod rates;

pub use compare::ScheduleComparison;
pub use config::LoanConfig;
pub use error::AmortizationError;
pub use extras::{ExtraPayment, ExtraPaymentManager};
pub use loan::{Loan, Schedule, ScheduleRow, MAX_TERM};
pub use rates::{convert_rate, PmtFrequency, RateKind, RateTiming};

pub type Result<T> = std::result::Result<T, AmortizationError>;
