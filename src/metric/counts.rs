//! Counting statistics over correspondents.

use serde_json::{json, Value};

use crate::error::MetricResult;
use crate::metric::Metric;
use crate::record::Record;

/// Correspondents ranked by their message count, highest first.
///
/// Rows without a count are ignored. Ties keep row order. The ranking is
/// finalized in `postprocess`; `value` before that reflects whatever has
/// accumulated so far.
#[derive(Debug)]
pub struct TopCorrespondents {
    limit: usize,
    entries: Vec<(String, i64)>,
}

impl TopCorrespondents {
    /// Keep the `limit` most frequent correspondents.
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            entries: Vec::new(),
        }
    }

    /// Prefer the display name, falling back to the email address.
    fn correspondent(record: &Record) -> &str {
        if record.display_name.is_empty() {
            &record.email
        } else {
            &record.display_name
        }
    }
}

impl Default for TopCorrespondents {
    fn default() -> Self {
        Self::new(10)
    }
}

impl Metric for TopCorrespondents {
    fn name(&self) -> MetricResult<&str> {
        Ok("top_correspondents")
    }

    fn preprocess(&mut self) {
        self.entries.clear();
    }

    fn process(&mut self, record: &Record) {
        let who = Self::correspondent(record);
        if who.is_empty() {
            return;
        }
        if let Some(count) = record.count {
            self.entries.push((who.to_string(), count));
        }
    }

    fn postprocess(&mut self) {
        self.entries.sort_by(|a, b| b.1.cmp(&a.1));
        self.entries.truncate(self.limit);
    }

    fn value(&self) -> Value {
        Value::Array(
            self.entries
                .iter()
                .map(|(name, count)| json!({ "name": name, "count": count }))
                .collect(),
        )
    }
}
