use crate::loan::Loan;
use crate::rates::{periodic_rate, PmtFrequency, RateKind, RateTiming};
use crate::Result;
use chrono::NaiveDate;

/// Loan terms as a borrower quotes them: an annual rate with its conventions, a
/// payment frequency and a number of payments.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoanConfig {
    pub principal: f64,
    pub annual_rate: f64,
    pub rate_kind: RateKind,
    pub rate_timing: RateTiming,
    pub pmt_frequency: PmtFrequency,
    pub term: u32,
    pub start_date: NaiveDate,
}

impl LoanConfig {
    pub fn periodic_rate(&self) -> Result<f64> {
        periodic_rate(
            self.annual_rate,
            self.rate_kind,
            self.rate_timing,
            self.pmt_frequency,
        )
    }

    pub fn build(&self) -> Result<Loan> {
        Loan::new(
            self.principal,
            self.periodic_rate()?,
            self.term,
            self.pmt_frequency,
            self.start_date,
        )
    }
}
