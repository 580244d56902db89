use crate::error::AmortizationError;
use crate::Result;
use log::trace;
use std::fmt;

/// Payment frequency, expressed as payment periods per year.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PmtFrequency {
    Monthly,
    Bimonthly,
    Quarterly,
    SemiAnnually,
    Annually,
}

impl PmtFrequency {
    pub fn periods_per_year(&self) -> f64 {
        match self {
            PmtFrequency::Monthly => 12.,
            PmtFrequency::Bimonthly => 6.,
            PmtFrequency::Quarterly => 4.,
            PmtFrequency::SemiAnnually => 2.,
            PmtFrequency::Annually => 1.,
        }
    }

    pub fn months_per_period(&self) -> u32 {
        match self {
            PmtFrequency::Monthly => 1,
            PmtFrequency::Bimonthly => 2,
            PmtFrequency::Quarterly => 3,
            PmtFrequency::SemiAnnually => 6,
            PmtFrequency::Annually => 12,
        }
    }
}

impl fmt::Display for PmtFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PmtFrequency::Monthly => "monthly",
            PmtFrequency::Bimonthly => "bimonthly",
            PmtFrequency::Quarterly => "quarterly",
            PmtFrequency::SemiAnnually => "semi-annually",
            PmtFrequency::Annually => "annually",
        };
        write!(f, "{}", name)
    }
}

/// Whether a quoted annual rate ignores intra-year compounding (nominal) or not.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RateKind {
    Nominal,
    Effective,
}

/// Whether interest is charged at the end (due) or the start (anticipated) of a period.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RateTiming {
    Due,
    Anticipated,
}

fn check_periods(field: &str, m: f64) -> Result<()> {
    if !m.is_finite() || m <= 0. {
        return Err(AmortizationError::invalid(
            field,
            format!("periods per year must be positive, got {}", m),
        ));
    }
    Ok(())
}

fn check_rate(field: &str, rate: f64) -> Result<()> {
    if !rate.is_finite() {
        return Err(AmortizationError::invalid(field, "rate must be finite"));
    }
    Ok(())
}

fn check_base(base: f64, context: &str) -> Result<f64> {
    if base <= 0. {
        return Err(AmortizationError::ArithmeticDegenerate(format!(
            "{}: base {} of the power is not positive",
            context, base
        )));
    }
    Ok(base)
}

/// `(1 + j/m)^m - 1`
pub fn nominal_to_effective(nominal_annual: f64, m: f64) -> Result<f64> {
    check_rate("nominal_annual", nominal_annual)?;
    check_periods("m", m)?;
    let base = check_base(1. + nominal_annual / m, "nominal_to_effective")?;
    Ok(base.powf(m) - 1.)
}

/// `m * ((1 + e)^(1/m) - 1)`
pub fn effective_to_nominal(effective_annual: f64, m: f64) -> Result<f64> {
    check_rate("effective_annual", effective_annual)?;
    check_periods("m", m)?;
    let base = check_base(1. + effective_annual, "effective_to_nominal")?;
    Ok(m * (base.powf(1. / m) - 1.))
}

/// `i_v / (1 + i_v)`
pub fn due_rate_to_anticipated(i_v: f64) -> Result<f64> {
    check_rate("i_v", i_v)?;
    let base = check_base(1. + i_v, "due_rate_to_anticipated")?;
    Ok(i_v / base)
}

/// `i_a / (1 - i_a)`
pub fn anticipated_to_due_rate(i_a: f64) -> Result<f64> {
    check_rate("i_a", i_a)?;
    if i_a >= 1. {
        return Err(AmortizationError::ArithmeticDegenerate(format!(
            "anticipated rate {} is not below 1",
            i_a
        )));
    }
    Ok(i_a / (1. - i_a))
}

/// Rate per period at `to_m` periods per year equivalent to `rate` quoted per period
/// at `from_m` periods per year.
pub fn equivalent_rate(rate: f64, from_m: f64, to_m: f64) -> Result<f64> {
    check_rate("rate", rate)?;
    check_periods("from_m", from_m)?;
    check_periods("to_m", to_m)?;
    let base = check_base(1. + rate, "equivalent_rate")?;
    Ok(base.powf(from_m / to_m) - 1.)
}

/// Re-express an annual rate quoted under one convention in another. Each side is
/// `(kind, timing, periods per year)`; the periods only matter for a nominal rate.
/// An effective result is an annual effective rate.
pub fn convert_rate(
    rate: f64,
    from: (RateKind, RateTiming, f64),
    to: (RateKind, RateTiming, f64),
) -> Result<f64> {
    let (from_kind, from_timing, from_m) = from;
    let (to_kind, to_timing, to_m) = to;
    check_periods("from_m", from_m)?;
    check_periods("to_m", to_m)?;

    let mut effective = match from_kind {
        RateKind::Nominal => nominal_to_effective(rate, from_m)?,
        RateKind::Effective => {
            check_rate("rate", rate)?;
            rate
        }
    };

    effective = match (from_timing, to_timing) {
        (RateTiming::Anticipated, RateTiming::Due) => anticipated_to_due_rate(effective)?,
        (RateTiming::Due, RateTiming::Anticipated) => due_rate_to_anticipated(effective)?,
        _ => effective,
    };

    let converted = match to_kind {
        RateKind::Nominal => effective_to_nominal(effective, to_m)?,
        RateKind::Effective => effective,
    };
    trace!(
        "{} {:?} -> effective {} -> {} {:?}",
        rate,
        from,
        effective,
        converted,
        to
    );
    Ok(converted)
}

/// Reduce a quoted annual rate to the due rate of one payment period.
pub fn periodic_rate(
    annual_rate: f64,
    kind: RateKind,
    timing: RateTiming,
    frequency: PmtFrequency,
) -> Result<f64> {
    let m = frequency.periods_per_year();

    let mut effective = match kind {
        RateKind::Nominal => nominal_to_effective(annual_rate, m)?,
        RateKind::Effective => annual_rate,
    };
    if timing == RateTiming::Anticipated {
        effective = anticipated_to_due_rate(effective)?;
    }

    let periodic = equivalent_rate(effective, 1., m)?;
    trace!(
        "annual {} ({:?}, {:?}) -> effective {} -> {} periodic {}",
        annual_rate,
        kind,
        timing,
        effective,
        frequency,
        periodic
    );
    Ok(periodic)
}
