use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AmortizationError {
    #[error("invalid parameter: {field} ({reason})")]
    InvalidParameter { field: String, reason: String },

    #[error("period {period} is outside the loan term 1..={term}")]
    InvalidPeriod { period: u32, term: u32 },

    #[error("arithmetic degenerate: {0}")]
    ArithmeticDegenerate(String),
}

impl AmortizationError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        AmortizationError::InvalidParameter {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
