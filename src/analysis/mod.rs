//! FMEDA metric calculation
//!
//! # Recompute policy
//!
//! Failure-mode rates are always fresh: the store recalculates them whenever
//! a failure mode is created or patched, and the aggregator refreshes every
//! failure mode it visits.
//!
//! Safety-function metrics are lazy. They are only correct immediately after
//! [`Store::calculate`](crate::core::Store::calculate) (or an export/report
//! that calls it). Adding or removing components, relinking safety
//! functions or editing failure modes does not touch previously calculated
//! metrics. The store tracks a revision counter so callers can tell when
//! stored metrics predate the latest mutation
//! ([`Store::is_stale`](crate::core::Store::is_stale)), but nothing
//! recalculates on its own.

pub mod aggregator;
pub mod calculator;
pub mod results;

pub use aggregator::aggregate;
pub use results::{format_percent, format_value, MetricRating, MetricResult, StoredResult};
