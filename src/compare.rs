use crate::loan::Schedule;
use std::fmt;

/// Side-by-side totals for a baseline schedule and the same loan with extras.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleComparison {
    pub baseline_periods: usize,
    pub extras_periods: usize,
    pub baseline_interest: f64,
    pub extras_interest: f64,
    pub baseline_installments: f64,
    pub extras_installments: f64,
    pub total_extras: f64,
}

impl ScheduleComparison {
    pub fn between(baseline: &Schedule, with_extras: &Schedule) -> Self {
        Self {
            baseline_periods: baseline.len(),
            extras_periods: with_extras.len(),
            baseline_interest: baseline.total_interest(),
            extras_interest: with_extras.total_interest(),
            baseline_installments: baseline.total_installments(),
            extras_installments: with_extras.total_installments(),
            total_extras: with_extras.total_extra_payments(),
        }
    }

    pub fn periods_saved(&self) -> i64 {
        self.baseline_periods as i64 - self.extras_periods as i64
    }

    pub fn periods_saved_pct(&self) -> f64 {
        if self.baseline_periods == 0 {
            return 0.;
        }
        self.periods_saved() as f64 / self.baseline_periods as f64 * 100.
    }

    pub fn interest_saved(&self) -> f64 {
        self.baseline_interest - self.extras_interest
    }

    pub fn interest_saved_pct(&self) -> f64 {
        if self.baseline_interest == 0. {
            return 0.;
        }
        self.interest_saved() / self.baseline_interest * 100.
    }

    pub fn baseline_total_paid(&self) -> f64 {
        self.baseline_installments
    }

    pub fn extras_total_paid(&self) -> f64 {
        self.extras_installments + self.total_extras
    }

    /// Reduction in everything paid over the life of the loan.
    pub fn net_savings(&self) -> f64 {
        self.baseline_total_paid() - self.extras_total_paid()
    }

    /// Interest saved per unit of extra payment, as a percentage.
    pub fn extras_roi_pct(&self) -> f64 {
        if self.total_extras > 0. {
            self.interest_saved() / self.total_extras * 100.
        } else {
            0.
        }
    }
}

impl fmt::Display for ScheduleComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "without extras: {} periods, interest ${:.2}, paid ${:.2}",
            self.baseline_periods,
            self.baseline_interest,
            self.baseline_total_paid()
        )?;
        writeln!(
            f,
            "with extras: {} periods, interest ${:.2}, extras ${:.2}, paid ${:.2}",
            self.extras_periods,
            self.extras_interest,
            self.total_extras,
            self.extras_total_paid()
        )?;
        write!(
            f,
            "saved {} periods ({:.1}%), interest ${:.2} ({:.1}%), extras ROI {:.1}%",
            self.periods_saved(),
            self.periods_saved_pct(),
            self.interest_saved(),
            self.interest_saved_pct(),
            self.extras_roi_pct()
        )
    }
}
