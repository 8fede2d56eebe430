//! Pluggable metrics for the analysis harness.
//!
//! A metric is a single unit of computation: it receives every row of the
//! dataset exactly once, accumulates state of its own, and reports a named
//! result at the end of a pass. Concrete metrics are registered explicitly
//! in an ordered list; there is no dynamic discovery.
//!
//! - [`Metric`] - the capability trait
//! - [`DomainDistribution`] - frequency of sender email domains
//! - [`TopCorrespondents`] - correspondents ranked by message count

mod counts;
mod domains;

pub use counts::TopCorrespondents;
pub use domains::DomainDistribution;

use serde_json::Value;

use crate::error::{MetricError, MetricResult};
use crate::record::Record;

/// A stateful aggregation unit processing one record at a time.
///
/// Lifecycle per analysis run: [`preprocess`](Metric::preprocess) once,
/// [`process`](Metric::process) once per row in row order,
/// [`postprocess`](Metric::postprocess) once, then
/// [`value`](Metric::value) queried. `value` must be idempotent and
/// side-effect-free after `postprocess`.
pub trait Metric {
    /// Stable identifier used as the key in the result set.
    ///
    /// The default implementation fails with [`MetricError::Unconfigured`];
    /// every concrete metric must override it.
    fn name(&self) -> MetricResult<&str> {
        Err(MetricError::Unconfigured(
            "metrics must provide a name or an implementation of name()".into(),
        ))
    }

    /// Hook called once before any row is processed.
    fn preprocess(&mut self) {}

    /// Process one row. Must tolerate any field being empty and must not
    /// assume anything about other metrics.
    fn process(&mut self, record: &Record);

    /// Hook called once after the last row is processed.
    fn postprocess(&mut self) {}

    /// The finalized result of this metric.
    fn value(&self) -> Value;
}

/// The default metric registration: a single domain distribution.
pub fn default_metrics() -> Vec<Box<dyn Metric>> {
    vec![Box::new(DomainDistribution::new())]
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unnamed;

    impl Metric for Unnamed {
        fn process(&mut self, _record: &Record) {}

        fn value(&self) -> Value {
            Value::Null
        }
    }

    #[test]
    fn test_unnamed_metric_is_unconfigured() {
        let metric = Unnamed;
        assert!(matches!(metric.name(), Err(MetricError::Unconfigured(_))));
    }

    #[test]
    fn test_default_metrics() {
        let metrics = default_metrics();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].name().unwrap(), "domain_distribution");
    }
}
