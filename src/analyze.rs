//! The analysis harness.
//!
//! [`Analysis`] drives one synchronous, single-threaded pass over a
//! [`Dataset`], dispatching every row to every registered [`Metric`] in
//! registration order, and collects the finalized results into a
//! [`ResultSet`]. Any error raised by the dataset (including a coercion
//! failure) propagates immediately; there is no partial-result recovery
//! or retry.

use serde_json::Value;

use crate::error::{AnalysisError, AnalysisResult};
use crate::metric::{default_metrics, Metric};
use crate::reader::Dataset;

/// Final mapping of metric name to computed value after a full pass.
///
/// Built once by [`Analysis::serialize`]; a snapshot, not a live view.
pub type ResultSet = serde_json::Map<String, Value>;

/// The analysis and data processing harness.
pub struct Analysis {
    dataset: Dataset,
    metrics: Vec<Box<dyn Metric>>,
    analyzed: bool,
}

impl Analysis {
    /// Harness over a dataset with the default metric registration.
    pub fn new(dataset: Dataset) -> Self {
        Self::with_metrics(dataset, default_metrics())
    }

    /// Harness over a dataset with an explicit ordered list of metrics.
    pub fn with_metrics(dataset: Dataset, metrics: Vec<Box<dyn Metric>>) -> Self {
        Self {
            dataset,
            metrics,
            analyzed: false,
        }
    }

    /// The dataset under analysis.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Run one full pass: `preprocess` every metric, dispatch every row to
    /// every metric in registration order, then `postprocess` every metric.
    pub fn analyze(&mut self) -> AnalysisResult<()> {
        for metric in &mut self.metrics {
            metric.preprocess();
        }

        for record in self.dataset.records()? {
            let record = record?;
            for metric in &mut self.metrics {
                metric.process(&record);
            }
        }

        for metric in &mut self.metrics {
            metric.postprocess();
        }

        self.analyzed = true;
        Ok(())
    }

    /// Collect the finalized results, keyed by metric name.
    ///
    /// Calling this before a completed [`analyze`](Analysis::analyze) pass
    /// is a defined failure ([`AnalysisError::NotAnalyzed`]), not a silent
    /// default. May be called multiple times afterwards.
    pub fn serialize(&self) -> AnalysisResult<ResultSet> {
        if !self.analyzed {
            return Err(AnalysisError::NotAnalyzed);
        }

        let mut results = ResultSet::new();
        for metric in &self.metrics {
            let name = metric.name()?;
            results.insert(name.to_string(), metric.value());
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MetricResult;
    use crate::metric::{DomainDistribution, TopCorrespondents};
    use crate::record::Record;
    use serde_json::json;
    use std::cell::RefCell;
    use std::io::Write;
    use std::rc::Rc;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Email Address,Display Name,First Name,Middle Name,Last Name,\
City,Region,Country,Facebook Link,Count,First Seen,Last Seen";

    fn fixture(rows: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        file
    }

    /// Records the order of lifecycle calls it receives.
    struct Probe {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Metric for Probe {
        fn name(&self) -> MetricResult<&str> {
            Ok(self.name)
        }

        fn preprocess(&mut self) {
            self.log.borrow_mut().push(format!("{}:pre", self.name));
        }

        fn process(&mut self, record: &Record) {
            self.log
                .borrow_mut()
                .push(format!("{}:row:{}", self.name, record.email));
        }

        fn postprocess(&mut self) {
            self.log.borrow_mut().push(format!("{}:post", self.name));
        }

        fn value(&self) -> serde_json::Value {
            serde_json::Value::Null
        }
    }

    #[test]
    fn test_end_to_end_domain_distribution() {
        let file = fixture(&["a@x.com,,,,,,,,,5,,", "b@x.com,,,,,,,,,3,,"]);
        let dataset = Dataset::new(file.path()).unwrap();

        let mut analysis = Analysis::new(dataset);
        analysis.analyze().unwrap();

        let results = analysis.serialize().unwrap();
        assert_eq!(results["domain_distribution"], json!({ "x.com": 2 }));
    }

    #[test]
    fn test_empty_dataset_yields_empty_results() {
        let file = fixture(&[]);
        let dataset = Dataset::new(file.path()).unwrap();

        let mut analysis = Analysis::new(dataset);
        analysis.analyze().unwrap();

        let results = analysis.serialize().unwrap();
        assert_eq!(results["domain_distribution"], json!({}));
    }

    #[test]
    fn test_serialize_before_analyze_fails() {
        let file = fixture(&["a@x.com,,,,,,,,,1,,"]);
        let dataset = Dataset::new(file.path()).unwrap();

        let analysis = Analysis::new(dataset);
        assert!(matches!(
            analysis.serialize(),
            Err(AnalysisError::NotAnalyzed)
        ));
    }

    #[test]
    fn test_serialize_is_repeatable() {
        let file = fixture(&["a@x.com,,,,,,,,,1,,"]);
        let dataset = Dataset::new(file.path()).unwrap();

        let mut analysis = Analysis::new(dataset);
        analysis.analyze().unwrap();
        assert_eq!(analysis.serialize().unwrap(), analysis.serialize().unwrap());
    }

    #[test]
    fn test_dispatch_order() {
        let file = fixture(&["a@x.com,,,,,,,,,1,,", "b@y.com,,,,,,,,,2,,"]);
        let dataset = Dataset::new(file.path()).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));

        let metrics: Vec<Box<dyn Metric>> = vec![
            Box::new(Probe { name: "one", log: Rc::clone(&log) }),
            Box::new(Probe { name: "two", log: Rc::clone(&log) }),
        ];
        let mut analysis = Analysis::with_metrics(dataset, metrics);
        analysis.analyze().unwrap();

        let calls = log.borrow().clone();
        assert_eq!(
            calls,
            vec![
                "one:pre",
                "two:pre",
                "one:row:a@x.com",
                "two:row:a@x.com",
                "one:row:b@y.com",
                "two:row:b@y.com",
                "one:post",
                "two:post",
            ]
        );
    }

    #[test]
    fn test_coercion_failure_propagates() {
        let file = fixture(&["a@x.com,,,,,,,,,not-a-number,,"]);
        let dataset = Dataset::new(file.path()).unwrap();

        let mut analysis = Analysis::new(dataset);
        let err = analysis.analyze().unwrap_err();
        assert!(err.to_string().contains("Count"));

        // The failed pass never completes, so results stay guarded.
        assert!(matches!(
            analysis.serialize(),
            Err(AnalysisError::NotAnalyzed)
        ));
    }

    #[test]
    fn test_multiple_metrics() {
        let file = fixture(&[
            "a@x.com,Alice,,,,,,,,5,,",
            "b@x.com,Bob,,,,,,,,3,,",
        ]);
        let dataset = Dataset::new(file.path()).unwrap();

        let metrics: Vec<Box<dyn Metric>> = vec![
            Box::new(DomainDistribution::new()),
            Box::new(TopCorrespondents::new(1)),
        ];
        let mut analysis = Analysis::with_metrics(dataset, metrics);
        analysis.analyze().unwrap();

        let results = analysis.serialize().unwrap();
        assert_eq!(results["domain_distribution"], json!({ "x.com": 2 }));
        assert_eq!(results["top_correspondents"][0]["name"], "Alice");
    }
}
