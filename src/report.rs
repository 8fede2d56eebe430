//! HTML report generation.
//!
//! Templates are embedded at compile time from the `templates/` directory
//! and loaded into a shared [`minijinja`] environment:
//!
//! - `base.html` - page skeleton with a `title` substitution
//! - `report.html` - extends the base and renders a [`ResultSet`] context
//!
//! A [`Report`] holds a template name and renders arbitrary serializable
//! context into it. Requesting a template without ever setting one fails
//! with [`ReportError::Unconfigured`]; no output file is produced on
//! failure.
//!
//! [`ResultSet`]: crate::analyze::ResultSet

use std::fs;
use std::path::Path;

use minijinja::{Environment, Template};
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{ReportError, ReportResult};

static ENVIRONMENT: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.add_template("base.html", include_str!("../templates/base.html"))
        .expect("invalid embedded template: base.html");
    env.add_template("report.html", include_str!("../templates/report.html"))
        .expect("invalid embedded template: report.html");
    env
});

/// An HTML report bound to a named template.
#[derive(Debug, Clone, Default)]
pub struct Report {
    template_name: Option<String>,
}

impl Report {
    /// A report with no template configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// A report bound to the given template name.
    pub fn with_template(name: impl Into<String>) -> Self {
        Self {
            template_name: Some(name.into()),
        }
    }

    /// Set or replace the template name.
    pub fn set_template(&mut self, name: impl Into<String>) {
        self.template_name = Some(name.into());
    }

    /// The configured template name, if any.
    pub fn template_name(&self) -> Option<&str> {
        self.template_name.as_deref()
    }

    /// Fetch the configured template from the environment.
    ///
    /// Fails with [`ReportError::Unconfigured`] when no template name was
    /// set, and [`ReportError::UnknownTemplate`] when the name does not
    /// match an embedded template.
    pub fn template(&self) -> ReportResult<Template<'static, 'static>> {
        let name = self.template_name.as_deref().ok_or_else(|| {
            ReportError::Unconfigured(
                "report requires a template name before rendering".into(),
            )
        })?;
        ENVIRONMENT
            .get_template(name)
            .map_err(|_| ReportError::UnknownTemplate(name.to_string()))
    }

    /// Render the template with the given context.
    pub fn render<S: Serialize>(&self, context: S) -> ReportResult<String> {
        let template = self.template()?;
        Ok(template.render(context)?)
    }

    /// Render the template and write the result to `path`.
    pub fn render_to_file<S: Serialize>(&self, path: &Path, context: S) -> ReportResult<()> {
        let html = self.render(context)?;
        fs::write(path, html)?;
        Ok(())
    }
}

/// Build a report context from a title and a metrics mapping.
///
/// Adds a generation timestamp alongside the caller-supplied data.
pub fn report_context(title: &str, row_count: usize, metrics: Value) -> Value {
    json!({
        "title": title,
        "row_count": row_count,
        "metrics": metrics,
        "generated_at": chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_unconfigured_template() {
        let report = Report::new();
        assert!(matches!(
            report.template(),
            Err(ReportError::Unconfigured(_))
        ));
    }

    #[test]
    fn test_unknown_template() {
        let report = Report::with_template("missing.html");
        assert!(matches!(
            report.template(),
            Err(ReportError::UnknownTemplate(_))
        ));
    }

    #[test]
    fn test_base_template_fetchable() {
        let report = Report::with_template("base.html");
        assert!(report.template().is_ok());
    }

    #[test]
    fn test_render_substitutes_title() {
        let report = Report::with_template("base.html");
        let html = report
            .render(json!({ "title": "Quarterly Contact Digest" }))
            .unwrap();
        assert!(html.contains("Quarterly Contact Digest"));
        assert!(html.contains("<html"));
    }

    #[test]
    fn test_render_to_file() {
        let dir = tempdir().unwrap();
        let outpath = dir.path().join("report.html");

        let report = Report::with_template("base.html");
        report
            .render_to_file(&outpath, json!({ "title": "test report" }))
            .unwrap();

        let contents = fs::read_to_string(&outpath).unwrap();
        assert!(contents.contains("test report"));
    }

    #[test]
    fn test_no_output_file_on_failure() {
        let dir = tempdir().unwrap();
        let outpath = dir.path().join("report.html");

        let report = Report::new();
        assert!(report
            .render_to_file(&outpath, json!({ "title": "t" }))
            .is_err());
        assert!(!outpath.exists());
    }

    #[test]
    fn test_full_report_template() {
        let metrics = json!({
            "domain_distribution": { "x.com": 2, "y.com": 1 },
            "top_correspondents": [ { "name": "Alice", "count": 9 } ],
        });
        let context = report_context("Email Report", 3, metrics);

        let report = Report::with_template("report.html");
        let html = report.render(&context).unwrap();

        assert!(html.contains("Email Report"));
        assert!(html.contains("x.com"));
        assert!(html.contains("Alice"));
        assert!(html.contains("Domain Distribution"));
    }
}
