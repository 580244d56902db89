use crate::error::AmortizationError;
use crate::loan::{Loan, Schedule, ScheduleRow};
use crate::Result;
use log::{debug, trace, warn};
use std::fmt;

/// An extra principal payment made on top of the fixed installment.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExtraPayment {
    OneTime {
        period: u32,
        amount: f64,
    },
    Recurring {
        start_period: u32,
        every_n_periods: u32,
        amount: f64,
    },
}

impl ExtraPayment {
    /// Amount this definition contributes to `period`.
    pub fn amount_for(&self, period: u32) -> f64 {
        match *self {
            ExtraPayment::OneTime {
                period: at,
                amount,
            } if at == period => amount,
            ExtraPayment::Recurring {
                start_period,
                every_n_periods,
                amount,
            } if period >= start_period && (period - start_period) % every_n_periods == 0 => {
                amount
            }
            _ => 0.,
        }
    }

    pub fn amount(&self) -> f64 {
        match *self {
            ExtraPayment::OneTime { amount, .. } | ExtraPayment::Recurring { amount, .. } => amount,
        }
    }
}

impl fmt::Display for ExtraPayment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtraPayment::OneTime { period, amount } => {
                write!(f, "${:.2} in period {}", amount, period)
            }
            ExtraPayment::Recurring {
                start_period,
                every_n_periods,
                amount,
            } => write!(
                f,
                "${:.2} every {} period(s) from period {}",
                amount, every_n_periods, start_period
            ),
        }
    }
}

/// Extra-payment plan for one loan. Definitions are only ever appended.
#[derive(Clone, Debug)]
pub struct ExtraPaymentManager<'a> {
    loan: &'a Loan,
    plan: Vec<ExtraPayment>,
}

impl<'a> ExtraPaymentManager<'a> {
    pub fn new(loan: &'a Loan) -> Self {
        Self {
            loan,
            plan: Vec::new(),
        }
    }

    pub fn loan(&self) -> &Loan {
        self.loan
    }

    pub fn add_recurring_extra(
        &mut self,
        start_period: u32,
        amount: f64,
        every_n_periods: u32,
    ) -> Result<()> {
        self.check_period(start_period)?;
        if every_n_periods == 0 {
            return Err(AmortizationError::invalid(
                "every_n_periods",
                "must be at least 1",
            ));
        }
        check_amount(amount)?;

        debug!(
            "recurring extra of {} every {} period(s) from period {}",
            amount, every_n_periods, start_period
        );
        self.plan.push(ExtraPayment::Recurring {
            start_period,
            every_n_periods,
            amount,
        });
        Ok(())
    }

    pub fn add_onetime_extra(&mut self, period: u32, amount: f64) -> Result<()> {
        self.check_period(period)?;
        check_amount(amount)?;

        debug!("one-time extra of {} in period {}", amount, period);
        self.plan.push(ExtraPayment::OneTime { period, amount });
        Ok(())
    }

    /// Every definition, in insertion order.
    pub fn extras(&self) -> &[ExtraPayment] {
        &self.plan
    }

    pub fn recurring(&self) -> impl Iterator<Item = &ExtraPayment> {
        self.plan
            .iter()
            .filter(|e| matches!(e, ExtraPayment::Recurring { .. }))
    }

    pub fn one_time(&self) -> impl Iterator<Item = &ExtraPayment> {
        self.plan
            .iter()
            .filter(|e| matches!(e, ExtraPayment::OneTime { .. }))
    }

    pub fn is_empty(&self) -> bool {
        self.plan.is_empty()
    }

    /// Sum of every definition that falls on `period`.
    pub fn extra_for_period(&self, period: u32) -> f64 {
        self.plan.iter().map(|e| e.amount_for(period)).sum()
    }

    /// Rebuild the schedule from the current plan, keeping the loan's installment
    /// fixed. Extras shorten the term; they never lower the installment.
    pub fn generate_schedule_with_extras(&self) -> Schedule {
        let loan = self.loan;
        let installment = loan.installment();
        let rate = loan.periodic_rate();
        let term = loan.term();

        let mut rows = Vec::with_capacity(term as usize);
        let mut begin_balance = loan.principal();

        for period in 1..=term {
            let interest = begin_balance * rate;
            let extra = self.extra_for_period(period);
            let scheduled = (installment - interest).min(begin_balance);

            if begin_balance <= scheduled + extra || period == term {
                // extra goes first; whatever exceeds the remaining balance is dropped
                let extra_paid = extra.min(begin_balance);
                let principal_paid = begin_balance - extra_paid;
                if extra_paid < extra {
                    warn!(
                        "period {}: extra payment of {} exceeds remaining balance, applying {}",
                        period, extra, extra_paid
                    );
                }
                trace!(
                    "period {} closes the loan, interest {}, principal {}, extra {}",
                    period,
                    interest,
                    principal_paid,
                    extra_paid
                );
                rows.push(ScheduleRow::new(
                    period,
                    begin_balance,
                    principal_paid + interest,
                    interest,
                    principal_paid,
                    extra_paid,
                    0.,
                ));
                break;
            }

            let end_balance = begin_balance - scheduled - extra;
            trace!(
                "period {}, interest {}, principal {}, extra {}, end bal {}",
                period,
                interest,
                scheduled,
                extra,
                end_balance
            );
            rows.push(ScheduleRow::new(
                period,
                begin_balance,
                installment,
                interest,
                scheduled,
                extra,
                end_balance,
            ));
            begin_balance = end_balance;
        }
        Schedule::from_rows(rows)
    }

    fn check_period(&self, period: u32) -> Result<()> {
        if !self.loan.contains_period(period) {
            return Err(AmortizationError::InvalidPeriod {
                period,
                term: self.loan.term(),
            });
        }
        Ok(())
    }
}

fn check_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0. {
        return Err(AmortizationError::invalid(
            "amount",
            format!("must be positive, got {}", amount),
        ));
    }
    Ok(())
}
