//! Safety-function aggregator
//!
//! Walks from a safety function to the components linked to it, and from
//! those to their failure modes, summing the residual, latent and detected
//! rates into the headline metrics:
//!
//! ```text
//! MPHF = RF/1e9 + (MPFL/1e9) * (MPFD/1e9) * lifetime
//! SPFM = safetyrelated > 0        ? 1 - RF/safetyrelated          : 0
//! LFM  = (safetyrelated - RF) > 0 ? 1 - MPFL/(safetyrelated - RF) : 0
//! ```

use crate::analysis::calculator;
use crate::entities::{Component, FailureMode, SafetyFunction, SafetyMetrics};

/// FIT are failures per 1e9 hours
const FIT_HOURS: f64 = 1e9;

/// Recalculate `sf`'s metrics from the given components and failure modes
///
/// Metrics are reset before summing, so repeated calls over unchanged inputs
/// produce identical values. Every failure mode visited has its derived
/// rates refreshed. Failure modes whose component is not in `components`
/// are never visited. `revision` is stamped onto the result.
pub fn aggregate<'c, 'f, C, F>(
    sf: &mut SafetyFunction,
    components: C,
    failure_modes: F,
    lifetime: f64,
    revision: u64,
) -> SafetyMetrics
where
    C: IntoIterator<Item = &'c Component>,
    F: IntoIterator<Item = &'f mut FailureMode>,
{
    sf.metrics = SafetyMetrics::default();

    let related: Vec<&Component> = components
        .into_iter()
        .filter(|c| c.is_related_to(sf.id))
        .collect();

    if related.is_empty() {
        tracing::debug!(sf = %sf.sf_id, "no related components");
        sf.metrics.calculated_at = Some(revision);
        return sf.metrics;
    }

    let mut failure_modes: Vec<&mut FailureMode> = failure_modes.into_iter().collect();

    let safetyrelated: f64 = related.iter().map(|c| c.failure_rate).sum();
    let mut rf = 0.0;
    let mut mpfl = 0.0;
    let mut mpfd = 0.0;

    for component in &related {
        for fm in failure_modes
            .iter_mut()
            .filter(|fm| fm.component == component.id)
        {
            let rates = calculator::refresh(fm);
            rf += rates.rf;
            mpfl += rates.mpfl;
            mpfd += rates.mpfd;
        }
    }

    let mphf = rf / FIT_HOURS + (mpfl / FIT_HOURS) * (mpfd / FIT_HOURS) * lifetime;
    let spfm = if safetyrelated > 0.0 {
        1.0 - rf / safetyrelated
    } else {
        0.0
    };
    let lfm_denominator = safetyrelated - rf;
    let lfm = if lfm_denominator > 0.0 {
        1.0 - mpfl / lfm_denominator
    } else {
        0.0
    };

    sf.metrics = SafetyMetrics {
        rf,
        mpfl,
        mpfd,
        mphf,
        spfm,
        lfm,
        safetyrelated,
        calculated_at: Some(revision),
    };

    tracing::debug!(
        sf = %sf.sf_id,
        components = related.len(),
        spfm,
        lfm,
        mphf,
        "aggregated safety function"
    );

    sf.metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::{ComponentId, FailureModeId, ProjectId, SafetyFunctionId};
    use crate::entities::{NewComponent, NewFailureMode, NewSafetyFunction};

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= 1e-9 * expected.abs().max(1e-12),
            "expected {expected}, got {actual}"
        );
    }

    fn sf(id: u64) -> SafetyFunction {
        SafetyFunction::new(
            SafetyFunctionId::new(id),
            NewSafetyFunction {
                project: ProjectId::new(1),
                sf_id: format!("SF{id}"),
                description: String::new(),
                target_integrity_level: String::new(),
            },
        )
    }

    fn component(id: u64, rate: f64, related: &[u64]) -> Component {
        Component::new(
            ComponentId::new(id),
            NewComponent {
                project: ProjectId::new(1),
                comp_id: format!("C{id}"),
                component_type: String::new(),
                failure_rate: rate,
                is_safety_related: true,
                related_sfs: related.iter().map(|&s| SafetyFunctionId::new(s)).collect(),
            },
        )
    }

    fn failure_mode(id: u64, component: u64, input: NewFailureMode) -> FailureMode {
        FailureMode::new(
            FailureModeId::new(id),
            NewFailureMode {
                component: ComponentId::new(component),
                ..input
            },
        )
    }

    fn worked_example() -> (SafetyFunction, Vec<Component>, Vec<FailureMode>) {
        let fms = vec![
            failure_mode(
                1,
                1,
                NewFailureMode {
                    failure_rate_total: 600.0,
                    is_spf: true,
                    spf_diagnostic_coverage: 90.0,
                    ..Default::default()
                },
            ),
            failure_mode(
                2,
                1,
                NewFailureMode {
                    failure_rate_total: 400.0,
                    is_mpf: true,
                    mpf_diagnostic_coverage: 50.0,
                    ..Default::default()
                },
            ),
        ];
        (sf(1), vec![component(1, 1000.0, &[1])], fms)
    }

    #[test]
    fn test_worked_example() {
        let (mut sf, components, mut fms) = worked_example();
        let m = aggregate(&mut sf, &components, &mut fms, 100_000.0, 0);

        assert_close(m.safetyrelated, 1000.0);
        assert_close(m.rf, 60.0);
        assert_close(m.mpfl, 200.0);
        assert_close(m.mpfd, 200.0);
        assert_close(m.spfm, 0.94);
        assert_close(m.lfm, 1.0 - 200.0 / 940.0);
        assert_close(m.mphf, 6.4e-8);
        assert_eq!(*sf.metrics(), m);
    }

    #[test]
    fn test_visited_failure_modes_get_fresh_rates() {
        let (mut sf, components, mut fms) = worked_example();
        aggregate(&mut sf, &components, &mut fms, 100_000.0, 0);
        assert_close(fms[0].rates().rf, 60.0);
        assert_close(fms[1].rates().mpfd, 200.0);
    }

    #[test]
    fn test_no_related_components_yields_zero() {
        let mut sf = sf(1);
        let components = vec![component(1, 500.0, &[2])];
        let mut fms: Vec<FailureMode> = Vec::new();

        let m = aggregate(&mut sf, &components, &mut fms, 8760.0, 3);
        assert_eq!(m.spfm, 0.0);
        assert_eq!(m.lfm, 0.0);
        assert_eq!(m.mphf, 0.0);
        assert_eq!(m.safetyrelated, 0.0);
        assert_eq!(m.calculated_at, Some(3));
    }

    #[test]
    fn test_zero_rate_components_fall_back_to_zero() {
        let mut sf = sf(1);
        let components = vec![component(1, 0.0, &[1])];
        let mut fms: Vec<FailureMode> = Vec::new();

        let m = aggregate(&mut sf, &components, &mut fms, 8760.0, 0);
        assert_eq!(m.spfm, 0.0);
        assert_eq!(m.lfm, 0.0);
        assert!(!m.spfm.is_nan());
    }

    #[test]
    fn test_repeated_aggregation_is_identical() {
        let (mut sf, components, mut fms) = worked_example();
        let first = aggregate(&mut sf, &components, &mut fms, 100_000.0, 5);
        let second = aggregate(&mut sf, &components, &mut fms, 100_000.0, 5);
        assert_eq!(first.rf.to_bits(), second.rf.to_bits());
        assert_eq!(first.spfm.to_bits(), second.spfm.to_bits());
        assert_eq!(first.lfm.to_bits(), second.lfm.to_bits());
        assert_eq!(first.mphf.to_bits(), second.mphf.to_bits());
        assert_eq!(first, second);
    }

    #[test]
    fn test_orphan_failure_modes_are_ignored() {
        let (mut sf, components, mut fms) = worked_example();
        fms.push(failure_mode(
            3,
            99,
            NewFailureMode {
                failure_rate_total: 1.0e6,
                is_spf: true,
                ..Default::default()
            },
        ));
        let m = aggregate(&mut sf, &components, &mut fms, 100_000.0, 0);
        assert_close(m.rf, 60.0);
    }

    #[test]
    fn test_unrelated_components_do_not_contribute() {
        let (mut sf, mut components, mut fms) = worked_example();
        components.push(component(2, 5000.0, &[]));
        fms.push(failure_mode(
            3,
            2,
            NewFailureMode {
                failure_rate_total: 5000.0,
                is_spf: true,
                ..Default::default()
            },
        ));
        let m = aggregate(&mut sf, &components, &mut fms, 100_000.0, 0);
        assert_close(m.safetyrelated, 1000.0);
        assert_close(m.rf, 60.0);
    }
}
