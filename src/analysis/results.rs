//! Per-safety-function result rows and their presentation helpers

use serde::{Deserialize, Serialize};

use crate::core::identity::SafetyFunctionId;
use crate::entities::SafetyFunction;

/// Metrics of one safety function as returned by a calculation
///
/// `spfm` and `lfm` are percentages here; the entity stores fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    /// Internal id of the safety function
    pub safety_function: SafetyFunctionId,
    /// External id of the safety function
    pub sf_id: String,
    pub spfm: f64,
    pub lfm: f64,
    pub mphf: f64,
    pub rf: f64,
    pub mpfl: f64,
    pub mpfd: f64,
    pub safetyrelated: f64,
}

impl MetricResult {
    /// Read the stored metrics of a safety function
    pub fn from_safety_function(sf: &SafetyFunction) -> Self {
        let m = sf.metrics();
        Self {
            safety_function: sf.id,
            sf_id: sf.sf_id.clone(),
            spfm: m.spfm * 100.0,
            lfm: m.lfm * 100.0,
            mphf: m.mphf,
            rf: m.rf,
            mpfl: m.mpfl,
            mpfd: m.mpfd,
            safetyrelated: m.safetyrelated,
        }
    }
}

/// A stored result together with whether it predates the latest mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    #[serde(flatten)]
    pub result: MetricResult,
    pub stale: bool,
}

/// Qualitative band for a coverage metric given in percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl MetricRating {
    /// Rate an SPFM or LFM percentage: >=99 excellent, >=90 good, >=60 fair
    pub fn for_percent(value: f64) -> Self {
        if value >= 99.0 {
            MetricRating::Excellent
        } else if value >= 90.0 {
            MetricRating::Good
        } else if value >= 60.0 {
            MetricRating::Fair
        } else {
            MetricRating::Poor
        }
    }
}

impl std::fmt::Display for MetricRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricRating::Excellent => write!(f, "excellent"),
            MetricRating::Good => write!(f, "good"),
            MetricRating::Fair => write!(f, "fair"),
            MetricRating::Poor => write!(f, "poor"),
        }
    }
}

/// Format a rate or probability for display
///
/// Very small magnitudes switch to scientific notation so MPHF values in
/// the 1e-8 range stay readable.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "N/A".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if magnitude < 1e-6 {
        format!("{:.2e}", value)
    } else if magnitude < 0.01 {
        format!("{:.3e}", value)
    } else {
        format!("{:.6}", value)
    }
}

/// Format a percentage with two decimals
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_thresholds() {
        assert_eq!(MetricRating::for_percent(99.5), MetricRating::Excellent);
        assert_eq!(MetricRating::for_percent(99.0), MetricRating::Excellent);
        assert_eq!(MetricRating::for_percent(94.0), MetricRating::Good);
        assert_eq!(MetricRating::for_percent(78.72), MetricRating::Fair);
        assert_eq!(MetricRating::for_percent(10.0), MetricRating::Poor);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(0.0), "0");
        assert_eq!(format_value(6.4e-8), "6.40e-8");
        assert_eq!(format_value(0.005), "5.000e-3");
        assert_eq!(format_value(60.0), "60.000000");
        assert_eq!(format_value(f64::NAN), "N/A");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(94.0), "94.00%");
        assert_eq!(format_percent(78.723404), "78.72%");
    }
}
