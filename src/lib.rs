//! # Mailmetrics - email contact metadata analytics
//!
//! Mailmetrics ingests a tabular export of email-contact metadata, computes
//! aggregate statistics through a pluggable metric pipeline, and renders the
//! results into an HTML report.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Dataset   │────▶│  Analysis   │────▶│ HTML Report │
//! │ (ISO/UTF8)  │     │  (coerced)  │     │  (metrics)  │     │ (templated) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mailmetrics::{Analysis, Dataset};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut analysis = Analysis::new(Dataset::new("contacts.csv")?);
//!     analysis.analyze()?;
//!     println!("{:?}", analysis.serialize()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`record`] - Domain models (Record, Field)
//! - [`reader`] - CSV dataset reading with encoding detection
//! - [`metric`] - Pluggable metrics
//! - [`analyze`] - The analysis harness
//! - [`report`] - HTML report rendering
//! - [`mbox`] - Mbox archive timestamp extraction
//! - [`testgen`] - Synthetic/anonymized test data generation

// Core modules
pub mod error;
pub mod record;

// Reading
pub mod reader;

// Analysis
pub mod analyze;
pub mod metric;

// Reporting
pub mod report;

// Peripheral utilities
pub mod mbox;
pub mod testgen;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AnalysisError, DatasetError, GeneratorError, MboxError, MetricError, ReportError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use record::{Field, Record, DEFAULT_DATE_FORMAT, DEFAULT_ENCODING};

// =============================================================================
// Re-exports - Reader
// =============================================================================

pub use reader::{detect_encoding, Dataset, ReaderOptions, Records};

// =============================================================================
// Re-exports - Metrics
// =============================================================================

pub use metric::{default_metrics, DomainDistribution, Metric, TopCorrespondents};

// =============================================================================
// Re-exports - Analysis
// =============================================================================

pub use analyze::{Analysis, ResultSet};

// =============================================================================
// Re-exports - Reporting
// =============================================================================

pub use report::{report_context, Report};

// =============================================================================
// Re-exports - Mbox
// =============================================================================

pub use mbox::{GmailMbox, MboxReader, TimestampExtraction};

// =============================================================================
// Re-exports - Generator
// =============================================================================

pub use testgen::{list_from_file, name_fields, GeneratorOptions, NameParts, TestDataGenerator};
