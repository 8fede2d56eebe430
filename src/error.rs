//! Error types for the mailmetrics analysis pipeline.
//!
//! This module defines one error enum per component:
//!
//! - [`DatasetError`] - CSV dataset reading and type coercion errors
//! - [`MetricError`] - metric configuration errors
//! - [`ReportError`] - HTML report rendering errors
//! - [`MboxError`] - mbox archive reading errors
//! - [`GeneratorError`] - test data generation errors
//! - [`AnalysisError`] - top-level harness errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Dataset Errors
// =============================================================================

/// Errors while reading or coercing the CSV dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// No readable regular file at the given path.
    #[error("No CSV file found at '{0}'")]
    InvalidSource(String),

    /// Failed to read the file.
    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    /// The configured encoding label is not recognized.
    #[error("Unknown encoding label '{0}'")]
    UnknownEncoding(String),

    /// An expected column is missing from the header row.
    #[error("Missing expected column: {0}")]
    MissingColumn(String),

    /// Malformed CSV structure.
    #[error("Invalid CSV format: {0}")]
    Csv(#[from] csv::Error),

    /// A cell failed type coercion (fails fast, not salvaged).
    #[error("Line {line}, column '{column}' (value '{value}'): {message}")]
    InvalidValue {
        line: usize,
        column: String,
        value: String,
        message: String,
    },
}

// =============================================================================
// Metric Errors
// =============================================================================

/// Errors from metric configuration.
#[derive(Debug, Error)]
pub enum MetricError {
    /// The metric declares no name and does not override `name()`.
    #[error("Metric is unconfigured: {0}")]
    Unconfigured(String),
}

// =============================================================================
// Report Errors
// =============================================================================

/// Errors while rendering an HTML report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// No template name was set on the report.
    #[error("Report is unconfigured: {0}")]
    Unconfigured(String),

    /// The named template does not exist in the environment.
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    /// Template rendering failed.
    #[error("Failed to render template: {0}")]
    Render(#[from] minijinja::Error),

    /// Failed to write the output file.
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Mbox Errors
// =============================================================================

/// Errors while reading an mbox archive.
#[derive(Debug, Error)]
pub enum MboxError {
    /// No readable regular file at the given path.
    #[error("No mbox archive found at '{0}'")]
    InvalidSource(String),

    /// Failed to read the archive.
    #[error("Failed to read mbox: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Generator Errors
// =============================================================================

/// Errors from the test data generator.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Failed to read a name/domain list or write the output.
    #[error("Generator IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The fixture to anonymize could not be read.
    #[error("Fixture error: {0}")]
    Dataset(#[from] DatasetError),

    /// Failed to serialize a CSV row.
    #[error("Generator CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The configured output encoding label is not recognized.
    #[error("Unknown encoding label '{0}'")]
    UnknownEncoding(String),

    /// Could not finalize the in-memory CSV buffer.
    #[error("Failed to finalize CSV output: {0}")]
    Finalize(String),

    /// A candidate list (names or domains) is empty.
    #[error("No candidate {0} available")]
    EmptyCandidates(&'static str),

    /// Anonymization was requested without a fixture configured.
    #[error("No fixture configured to anonymize")]
    MissingFixture,
}

// =============================================================================
// Analysis Errors (top-level)
// =============================================================================

/// Top-level harness errors.
///
/// This is the main error type returned by [`crate::analyze::Analysis`].
/// It wraps the lower-level errors and adds harness-specific variants.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Dataset reading or coercion error.
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// Metric configuration error.
    #[error("Metric error: {0}")]
    Metric(#[from] MetricError),

    /// Results were requested before a completed `analyze()` pass.
    #[error("Analysis has not been run; call analyze() before serialize()")]
    NotAnalyzed,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for dataset operations.
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Result type for metric operations.
pub type MetricResult<T> = Result<T, MetricError>;

/// Result type for report operations.
pub type ReportResult<T> = Result<T, ReportError>;

/// Result type for mbox operations.
pub type MboxResult<T> = Result<T, MboxError>;

/// Result type for generator operations.
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
