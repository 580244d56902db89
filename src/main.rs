use amortization::*;
use chrono::NaiveDate;
use log::{error, info};
use simple_logger::SimpleLogger;

fn run() -> Result<()> {
    let config = LoanConfig {
        principal: 100000.,
        annual_rate: 0.12,
        rate_kind: RateKind::Nominal,
        rate_timing: RateTiming::Due,
        pmt_frequency: PmtFrequency::Monthly,
        term: 24,
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
    };

    let loan = config.build()?;
    info!(
        "installment ${:.2}, periodic rate {:.4}%, effective annual {:.4}%",
        loan.installment(),
        loan.periodic_rate() * 100.,
        loan.annual_effective_rate() * 100.
    );
    loan.show_amortization();

    let mut extras = ExtraPaymentManager::new(&loan);
    extras.add_recurring_extra(6, 1000., 6)?;
    extras.add_onetime_extra(12, 5000.)?;
    for extra in extras.extras() {
        info!("extra payment: {}", extra);
    }
    info!(
        "an anticipated quote of the same loan is {:.4}% nominal quarterly",
        convert_rate(
            extras.loan().annual_effective_rate(),
            (RateKind::Effective, RateTiming::Due, 1.),
            (RateKind::Nominal, RateTiming::Anticipated, 4.),
        )? * 100.
    );

    let baseline = loan.generate_baseline_schedule();
    let with_extras = extras.generate_schedule_with_extras();
    for row in &with_extras {
        let date = loan.payment_date(row.period).unwrap_or(loan.start_date());
        println!("{} {}", date, row);
    }
    println!("{}", ScheduleComparison::between(&baseline, &with_extras));
    Ok(())
}

fn main() {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()
        .unwrap();

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

// verifies that types can implement the gated traits below
#[cfg(test)]
fn is_normal<T: Sized + Send + Sync + Unpin>() {}

#[test]
fn normal_types() {
    is_normal::<Loan>();
    is_normal::<Schedule>();
    is_normal::<ScheduleRow>();
    is_normal::<ExtraPaymentManager<'static>>();
    is_normal::<AmortizationError>();
}
