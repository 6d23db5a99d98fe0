//! Failure-mode calculator
//!
//! ```text
//! RF   = is_SPF ? total * (1 - spf_dc/100) : 0
//! base = total - RF
//! MPFL = is_MPF ? base * (1 - mpf_dc/100) : 0
//! MPFD = is_MPF ? base * (mpf_dc/100)     : 0
//! ```
//!
//! `base` excludes the residual SPF portion before MPF coverage is applied,
//! so a mode flagged both SPF and MPF only feeds its SPF-covered share into
//! the MPF pool. Coverage is not clamped to 0..=100.

use crate::entities::{FailureMode, FailureModeRates};

/// Compute the derived rates from raw inputs
pub fn compute(
    total: f64,
    is_spf: bool,
    spf_dc: f64,
    is_mpf: bool,
    mpf_dc: f64,
) -> FailureModeRates {
    let rf = if is_spf {
        total * (1.0 - spf_dc / 100.0)
    } else {
        0.0
    };
    let base = total - rf;
    let (mpfl, mpfd) = if is_mpf {
        (base * (1.0 - mpf_dc / 100.0), base * (mpf_dc / 100.0))
    } else {
        (0.0, 0.0)
    };

    FailureModeRates { rf, mpfl, mpfd }
}

/// Compute the derived rates of a failure mode without storing them
pub fn rates_for(fm: &FailureMode) -> FailureModeRates {
    compute(
        fm.failure_rate_total,
        fm.is_spf,
        fm.spf_diagnostic_coverage,
        fm.is_mpf,
        fm.mpf_diagnostic_coverage,
    )
}

/// Recompute and persist the derived rates onto the failure mode
pub fn refresh(fm: &mut FailureMode) -> FailureModeRates {
    let rates = rates_for(fm);
    fm.rates = rates;
    rates
}
