use crate::error::AmortizationError;
use crate::rates::PmtFrequency;
use crate::Result;
use chrono::{Months, NaiveDate};
use log::{debug, trace};
use std::fmt;

/// Longest loan accepted, in payment periods.
pub const MAX_TERM: u32 = 600;

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleRow {
    pub period: u32,
    pub opening_balance: f64,
    pub installment_due: f64,
    pub interest_portion: f64,
    pub principal_portion: f64,
    pub extra_payment: f64,
    pub closing_balance: f64,
}

impl ScheduleRow {
    pub fn new(
        period: u32,
        opening_balance: f64,
        installment_due: f64,
        interest_portion: f64,
        principal_portion: f64,
        extra_payment: f64,
        closing_balance: f64,
    ) -> Self {
        Self {
            period,
            opening_balance,
            installment_due,
            interest_portion,
            principal_portion,
            extra_payment,
            closing_balance,
        }
    }
}

impl fmt::Display for ScheduleRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "period {}, opening balance ${:.2}, installment ${:.2}, interest ${:.2}, principal ${:.2}, extra ${:.2}, closing balance ${:.2}",
            self.period,
            self.opening_balance,
            self.installment_due,
            self.interest_portion,
            self.principal_portion,
            self.extra_payment,
            self.closing_balance
        )
    }
}

/// Rows numbered 1..=N contiguously; the last row closes at exactly zero.
#[derive(Clone, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Schedule {
    rows: Vec<ScheduleRow>,
}

impl Schedule {
    pub(crate) fn from_rows(rows: Vec<ScheduleRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ScheduleRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScheduleRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&ScheduleRow> {
        self.rows.last()
    }

    /// Row for a 1-based period number.
    pub fn get(&self, period: u32) -> Option<&ScheduleRow> {
        let index = usize::try_from(period).ok()?.checked_sub(1)?;
        self.rows.get(index)
    }

    pub fn total_interest(&self) -> f64 {
        self.rows.iter().map(|r| r.interest_portion).sum()
    }

    pub fn total_installments(&self) -> f64 {
        self.rows.iter().map(|r| r.installment_due).sum()
    }

    pub fn total_principal(&self) -> f64 {
        self.rows.iter().map(|r| r.principal_portion).sum()
    }

    pub fn total_extra_payments(&self) -> f64 {
        self.rows.iter().map(|r| r.extra_payment).sum()
    }

    /// Installments plus extra payments.
    pub fn total_paid(&self) -> f64 {
        self.total_installments() + self.total_extra_payments()
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a ScheduleRow;
    type IntoIter = std::slice::Iter<'a, ScheduleRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// A fixed-installment ("French") loan. Immutable once built.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Loan {
    principal: f64,
    periodic_rate: f64,
    term: u32,
    pmt_frequency: PmtFrequency,
    start_date: NaiveDate,
    installment: f64,
}

impl Loan {
    /// `periodic_rate` is the due rate of one payment period, already converted to
    /// `pmt_frequency`.
    pub fn new(
        principal: f64,
        periodic_rate: f64,
        term: u32,
        pmt_frequency: PmtFrequency,
        start_date: NaiveDate,
    ) -> Result<Self> {
        if !principal.is_finite() || principal <= 0. {
            return Err(AmortizationError::invalid(
                "principal",
                format!("must be positive, got {}", principal),
            ));
        }
        if !periodic_rate.is_finite() || !(0. ..1.).contains(&periodic_rate) {
            return Err(AmortizationError::invalid(
                "periodic_rate",
                format!("must be in [0, 1), got {}", periodic_rate),
            ));
        }
        if term == 0 || term > MAX_TERM {
            return Err(AmortizationError::invalid(
                "term",
                format!("must be in 1..={}, got {}", MAX_TERM, term),
            ));
        }

        let installment = get_installment(principal, periodic_rate, term);
        debug!(
            "loan of {} at {} per period over {} {} periods, installment {}",
            principal, periodic_rate, term, pmt_frequency, installment
        );

        Ok(Self {
            principal,
            periodic_rate,
            term,
            pmt_frequency,
            start_date,
            installment,
        })
    }

    pub fn principal(&self) -> f64 {
        self.principal
    }

    pub fn periodic_rate(&self) -> f64 {
        self.periodic_rate
    }

    /// Effective annual rate implied by the periodic rate.
    pub fn annual_effective_rate(&self) -> f64 {
        (1. + self.periodic_rate).powf(self.pmt_frequency.periods_per_year()) - 1.
    }

    pub fn term(&self) -> u32 {
        self.term
    }

    pub fn pmt_frequency(&self) -> PmtFrequency {
        self.pmt_frequency
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn installment(&self) -> f64 {
        self.installment
    }

    pub fn contains_period(&self, period: u32) -> bool {
        (1..=self.term).contains(&period)
    }

    /// Calendar date of a period's payment, counted from the start date so month-end
    /// clamping never accumulates.
    pub fn payment_date(&self, period: u32) -> Option<NaiveDate> {
        if !self.contains_period(period) {
            return None;
        }
        let months = period.checked_mul(self.pmt_frequency.months_per_period())?;
        self.start_date.checked_add_months(Months::new(months))
    }

    pub fn generate_baseline_schedule(&self) -> Schedule {
        let mut rows = Vec::with_capacity(self.term as usize);
        let mut begin_balance = self.principal;

        for period in 1..=self.term {
            let interest = begin_balance * self.periodic_rate;

            // the last row absorbs the rounding residue, and no row overshoots
            let (pmt_amt, principal_paid) =
                if period == self.term || self.installment - interest > begin_balance {
                    (begin_balance + interest, begin_balance)
                } else {
                    (self.installment, self.installment - interest)
                };
            let end_balance = begin_balance - principal_paid;

            trace!(
                "period {}, interest {}, principal {}, end bal {}",
                period,
                interest,
                principal_paid,
                end_balance
            );

            rows.push(ScheduleRow::new(
                period,
                begin_balance,
                pmt_amt,
                interest,
                principal_paid,
                0.,
                end_balance,
            ));
            begin_balance = end_balance;
        }
        Schedule::from_rows(rows)
    }

    pub fn show_amortization(&self) {
        for row in &self.generate_baseline_schedule() {
            println!("{}", row);
        }
    }
}

fn get_installment(principal: f64, periodic_rate: f64, term: u32) -> f64 {
    if periodic_rate == 0. {
        return principal / term as f64;
    }
    // term is capped at MAX_TERM so the cast cannot overflow
    principal * periodic_rate / (1. - (1. + periodic_rate).powi(-(term as i32)))
}

#[cfg(test)]
mod tests {
    use super::{get_installment, Loan, MAX_TERM};
    use crate::error::AmortizationError;
    use crate::rates::PmtFrequency;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use test_log::test;

    fn scenario_a() -> Loan {
        Loan::new(
            100000.,
            0.01,
            24,
            PmtFrequency::Monthly,
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_get_installment() {
        assert_abs_diff_eq!(get_installment(100000., 0.01, 24), 4707.35, epsilon = 0.005);
        assert_abs_diff_eq!(get_installment(200000., 0.07 / 12., 180), 1797.66, epsilon = 0.005);
        assert_eq!(get_installment(1200., 0., 12), 100.);
        assert_eq!(get_installment(1000., 0., 3), 1000. / 3.);
    }

    #[test]
    fn test_baseline_schedule() {
        let loan = scenario_a();
        let schedule = loan.generate_baseline_schedule();

        assert_eq!(schedule.len(), 24);
        assert_eq!(schedule.last().unwrap().closing_balance, 0.);
        assert_abs_diff_eq!(schedule.total_principal(), 100000., epsilon = 1e-6);
        assert_abs_diff_eq!(schedule.total_interest(), 12976.33, epsilon = 0.01);

        for (i, row) in schedule.iter().enumerate() {
            assert_eq!(row.period as usize, i + 1);
            assert_eq!(row.extra_payment, 0.);
            assert!(row.closing_balance >= 0.);
            assert_abs_diff_eq!(
                row.closing_balance,
                row.opening_balance - row.principal_portion - row.extra_payment,
                epsilon = 1e-9
            );
        }
        for pair in schedule.rows().windows(2) {
            assert_eq!(pair[1].opening_balance, pair[0].closing_balance);
        }
        for row in &schedule.rows()[..23] {
            assert_abs_diff_eq!(
                row.interest_portion + row.principal_portion,
                loan.installment(),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_baseline_rows() {
        let schedule = scenario_a().generate_baseline_schedule();

        assert_eq!(
            schedule.get(1).unwrap().to_string(),
            "period 1, opening balance $100000.00, installment $4707.35, interest $1000.00, principal $3707.35, extra $0.00, closing balance $96292.65"
        );
        let last = schedule.get(24).unwrap();
        assert_abs_diff_eq!(last.installment_due, 4707.35, epsilon = 0.01);
        assert_abs_diff_eq!(last.interest_portion, 46.61, epsilon = 0.01);
        assert!(schedule.get(0).is_none());
        assert!(schedule.get(25).is_none());
    }

    #[test]
    fn test_baseline_is_idempotent() {
        let loan = scenario_a();
        assert_eq!(
            loan.generate_baseline_schedule(),
            loan.generate_baseline_schedule()
        );
    }

    #[test]
    fn test_zero_rate_loan() {
        let loan = Loan::new(
            1000.,
            0.,
            3,
            PmtFrequency::Quarterly,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .unwrap();
        assert_eq!(loan.installment(), 1000. / 3.);

        let schedule = loan.generate_baseline_schedule();
        assert_eq!(schedule.len(), 3);
        assert!(schedule.iter().all(|r| r.interest_portion == 0.));
        assert_eq!(schedule.last().unwrap().closing_balance, 0.);
        assert_abs_diff_eq!(schedule.total_principal(), 1000., epsilon = 1e-9);
        assert_eq!(loan.annual_effective_rate(), 0.);
    }

    #[test]
    fn test_single_period_loan() {
        let loan = Loan::new(
            5000.,
            0.05,
            1,
            PmtFrequency::Annually,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .unwrap();
        let schedule = loan.generate_baseline_schedule();

        assert_eq!(schedule.len(), 1);
        let row = &schedule.rows()[0];
        assert_abs_diff_eq!(row.installment_due, 5250., epsilon = 1e-9);
        assert_eq!(row.principal_portion, 5000.);
        assert_eq!(row.closing_balance, 0.);
    }

    #[test]
    fn test_loan_validation() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let monthly = PmtFrequency::Monthly;

        for principal in [0., -100., f64::NAN, f64::INFINITY] {
            assert!(matches!(
                Loan::new(principal, 0.01, 12, monthly, date),
                Err(AmortizationError::InvalidParameter { field, .. }) if field == "principal"
            ));
        }
        for rate in [-0.01, 1., 1.5, f64::NAN] {
            assert!(matches!(
                Loan::new(1000., rate, 12, monthly, date),
                Err(AmortizationError::InvalidParameter { field, .. }) if field == "periodic_rate"
            ));
        }
        for term in [0, MAX_TERM + 1] {
            assert!(matches!(
                Loan::new(1000., 0.01, term, monthly, date),
                Err(AmortizationError::InvalidParameter { field, .. }) if field == "term"
            ));
        }
        assert!(Loan::new(1000., 0.01, MAX_TERM, monthly, date).is_ok());
    }

    #[test]
    fn test_payment_date() {
        let loan = scenario_a();

        assert_eq!(
            loan.payment_date(1),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(
            loan.payment_date(2),
            NaiveDate::from_ymd_opt(2024, 3, 31)
        );
        assert_eq!(
            loan.payment_date(24),
            NaiveDate::from_ymd_opt(2026, 1, 31)
        );
        assert_eq!(loan.payment_date(0), None);
        assert_eq!(loan.payment_date(25), None);

        let quarterly = Loan::new(
            1000.,
            0.02,
            8,
            PmtFrequency::Quarterly,
            NaiveDate::from_ymd_opt(2022, 11, 30).unwrap(),
        )
        .unwrap();
        assert_eq!(
            quarterly.payment_date(1),
            NaiveDate::from_ymd_opt(2023, 2, 28)
        );
        assert_eq!(
            quarterly.payment_date(2),
            NaiveDate::from_ymd_opt(2023, 5, 30)
        );
    }

    #[test]
    fn test_annual_effective_rate() {
        assert_abs_diff_eq!(
            scenario_a().annual_effective_rate(),
            0.126825030131969,
            epsilon = 1e-12
        );
    }
}
