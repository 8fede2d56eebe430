//! Statistical distribution of email domains.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::MetricResult;
use crate::metric::Metric;
use crate::record::Record;

/// Frequency count of the domain part of every email address.
///
/// Domains are compared as exact strings; no case or whitespace
/// normalization is performed. Rows whose email field is empty or has no
/// `@` are skipped.
#[derive(Debug, Default)]
pub struct DomainDistribution {
    data: BTreeMap<String, u64>,
}

impl DomainDistribution {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Metric for DomainDistribution {
    fn name(&self) -> MetricResult<&str> {
        Ok("domain_distribution")
    }

    fn preprocess(&mut self) {
        self.data.clear();
    }

    fn process(&mut self, record: &Record) {
        if let Some(domain) = record.email_domain() {
            *self.data.entry(domain.to_string()).or_insert(0) += 1;
        }
    }

    fn value(&self) -> Value {
        serde_json::to_value(&self.data).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(email: &str) -> Record {
        Record {
            email: email.into(),
            ..Record::default()
        }
    }

    #[test]
    fn test_single_domain() {
        let mut metric = DomainDistribution::new();
        metric.preprocess();
        for _ in 0..5 {
            metric.process(&row("someone@gmail.com"));
        }
        metric.postprocess();

        assert_eq!(metric.value(), json!({ "gmail.com": 5 }));
    }

    #[test]
    fn test_multiple_domains() {
        let mut metric = DomainDistribution::new();
        metric.preprocess();
        metric.process(&row("a@x.com"));
        metric.process(&row("b@x.com"));
        metric.process(&row("c@y.com"));
        metric.postprocess();

        assert_eq!(metric.value(), json!({ "x.com": 2, "y.com": 1 }));
    }

    #[test]
    fn test_empty_dataset_yields_empty_mapping() {
        let mut metric = DomainDistribution::new();
        metric.preprocess();
        metric.postprocess();

        assert_eq!(metric.value(), json!({}));
    }

    #[test]
    fn test_tolerates_empty_and_malformed_emails() {
        let mut metric = DomainDistribution::new();
        metric.preprocess();
        metric.process(&row(""));
        metric.process(&row("no-at-sign"));
        metric.process(&row("a@x.com"));
        metric.postprocess();

        assert_eq!(metric.value(), json!({ "x.com": 1 }));
    }

    #[test]
    fn test_no_normalization() {
        let mut metric = DomainDistribution::new();
        metric.preprocess();
        metric.process(&row("a@X.com"));
        metric.process(&row("b@x.com"));
        metric.postprocess();

        assert_eq!(metric.value(), json!({ "X.com": 1, "x.com": 1 }));
    }

    #[test]
    fn test_value_is_idempotent() {
        let mut metric = DomainDistribution::new();
        metric.preprocess();
        metric.process(&row("a@x.com"));
        metric.postprocess();

        assert_eq!(metric.value(), metric.value());
    }
}
