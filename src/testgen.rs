//! Synthetic and anonymized test dataset generation.
//!
//! Real contact exports are private, so tests and demos need fake ones.
//! [`TestDataGenerator`] builds rows in the export file format from a list
//! of candidate names and domains, either from scratch or by anonymizing
//! an existing fixture.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{GeneratorError, GeneratorResult};
use crate::reader::{Dataset, ReaderOptions};
use crate::record::{Field, Record, DEFAULT_DATE_FORMAT, DEFAULT_ENCODING};

// =============================================================================
// Options
// =============================================================================

/// Configuration for generated output.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Encoding of the written file.
    pub encoding: String,

    /// Format used to stringify the timestamp columns.
    pub datefmt: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            encoding: DEFAULT_ENCODING.to_string(),
            datefmt: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Read a newline-delimited list from a file, skipping blanks and `#` comments.
pub fn list_from_file<P: AsRef<Path>>(path: P) -> GeneratorResult<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}

/// The name columns derived from one display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameParts {
    pub display: String,
    pub first: String,
    pub middle: String,
    pub last: String,
}

/// Split a display name into first/middle/last parts.
///
/// Two words become first + last; three or more put the second word in the
/// middle slot and join the rest as the last name.
pub fn name_fields(name: &str) -> NameParts {
    let parts: Vec<&str> = name.split_whitespace().collect();
    let first = parts.first().copied().unwrap_or("").to_string();
    let (middle, last) = if parts.len() > 2 {
        (parts[1].to_string(), parts[2..].join(" "))
    } else {
        (String::new(), parts.get(1..).unwrap_or(&[]).join(" "))
    };
    NameParts {
        display: name.to_string(),
        first,
        middle,
        last,
    }
}

// =============================================================================
// Generator
// =============================================================================

/// Generates random test data in the contact export format.
#[derive(Debug, Clone)]
pub struct TestDataGenerator {
    names: Vec<String>,
    domains: Vec<String>,
    fixture: Option<PathBuf>,
    options: GeneratorOptions,
}

impl TestDataGenerator {
    /// Generator over in-memory candidate lists.
    pub fn new(names: Vec<String>, domains: Vec<String>) -> Self {
        Self {
            names,
            domains,
            fixture: None,
            options: GeneratorOptions::default(),
        }
    }

    /// Generator with candidate lists loaded from newline-delimited files.
    pub fn from_files<P: AsRef<Path>>(names: P, domains: P) -> GeneratorResult<Self> {
        Ok(Self::new(list_from_file(names)?, list_from_file(domains)?))
    }

    /// Anonymize an existing fixture instead of generating from scratch.
    pub fn with_fixture(mut self, fixture: impl Into<PathBuf>) -> Self {
        self.fixture = Some(fixture.into());
        self
    }

    /// Replace the output options.
    pub fn with_options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    /// Candidate names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Candidate domains.
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Build an email address from a name and a domain (random when `None`).
    pub fn email_from_name(&self, name: &str, domain: Option<&str>) -> GeneratorResult<String> {
        let domain = match domain {
            Some(d) => d.to_string(),
            None => self
                .domains
                .choose(&mut rand::thread_rng())
                .ok_or(GeneratorError::EmptyCandidates("domains"))?
                .clone(),
        };
        let local: Vec<String> = name
            .split_whitespace()
            .map(|p| p.to_lowercase())
            .collect();
        Ok(format!("{}@{}", local.join("."), domain))
    }

    /// Write the dataset to `outpath`, or stdout when `None`.
    ///
    /// Anonymizes the fixture when one is configured, otherwise generates
    /// from scratch. The output carries the canonical header row and is
    /// encoded with the configured encoding.
    pub fn write(&self, outpath: Option<&Path>) -> GeneratorResult<()> {
        let rows = if self.fixture.is_some() {
            self.anonymize()?
        } else {
            self.generate()?
        };

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(Field::ALL.iter().map(|f| f.header()))?;
        for row in &rows {
            writer.write_record(row)?;
        }
        let buffer = writer
            .into_inner()
            .map_err(|e| GeneratorError::Finalize(e.to_string()))?;
        let text =
            String::from_utf8(buffer).map_err(|e| GeneratorError::Finalize(e.to_string()))?;

        let encoding = encoding_rs::Encoding::for_label(self.options.encoding.as_bytes())
            .ok_or_else(|| GeneratorError::UnknownEncoding(self.options.encoding.clone()))?;
        let (bytes, _, _) = encoding.encode(&text);

        match outpath {
            Some(path) => fs::write(path, &bytes)?,
            None => std::io::stdout().write_all(&bytes)?,
        }
        Ok(())
    }

    /// Generate one completely random row per candidate name.
    ///
    /// Regional columns are left empty, matching real exports where those
    /// fields are sparsely populated.
    pub fn generate(&self) -> GeneratorResult<Vec<Vec<String>>> {
        let mut rng = rand::thread_rng();
        let mut rows = Vec::with_capacity(self.names.len());

        for name in &self.names {
            let parts = name_fields(name);
            let first_seen = random_datetime(&mut rng);
            let last_seen = random_datetime_after(&mut rng, first_seen);

            let record = Record {
                email: self.email_from_name(name, None)?,
                display_name: parts.display,
                first_name: parts.first,
                middle_name: parts.middle,
                last_name: parts.last,
                count: Some(rng.gen_range(1..=600)),
                first_seen: Some(first_seen),
                last_seen: Some(last_seen),
                ..Record::default()
            };
            rows.push(record.to_cells(&self.options.datefmt));
        }
        Ok(rows)
    }

    /// Anonymize the configured fixture.
    ///
    /// Keeps only rows whose email domain is in the candidate domain list,
    /// then replaces the name columns and the email address with random
    /// picks. Timestamps are re-stringified with the configured format.
    pub fn anonymize(&self) -> GeneratorResult<Vec<Vec<String>>> {
        let fixture = self
            .fixture
            .as_ref()
            .ok_or(GeneratorError::MissingFixture)?;

        let reader_options = ReaderOptions {
            encoding: Some(self.options.encoding.clone()),
            datefmt: self.options.datefmt.clone(),
        };
        let dataset = Dataset::with_options(fixture, reader_options)?;

        let mut rng = rand::thread_rng();
        let mut rows = Vec::new();

        for record in dataset.records()? {
            let mut record = record?;
            let domain = match record.email_domain() {
                Some(d) => d.to_string(),
                None => continue,
            };
            if !self.domains.iter().any(|d| d == &domain) {
                continue;
            }

            let name = self
                .names
                .choose(&mut rng)
                .ok_or(GeneratorError::EmptyCandidates("names"))?
                .clone();
            let parts = name_fields(&name);
            record.email = self.email_from_name(&name, None)?;
            record.display_name = parts.display;
            record.first_name = parts.first;
            record.middle_name = parts.middle;
            record.last_name = parts.last;

            rows.push(record.to_cells(&self.options.datefmt));
        }
        Ok(rows)
    }
}

/// A random timestamp between 2000 and 2013.
fn random_datetime<R: Rng>(rng: &mut R) -> NaiveDateTime {
    let date = NaiveDate::from_ymd_opt(
        rng.gen_range(2000..=2012),
        rng.gen_range(1..=12),
        rng.gen_range(1..=28),
    )
    .expect("random date components are range-bounded");
    date.and_hms_opt(rng.gen_range(0..=23), rng.gen_range(0..=59), 0)
        .expect("random time components are range-bounded")
}

/// A random timestamp between `start` and now.
fn random_datetime_after<R: Rng>(rng: &mut R, start: NaiveDateTime) -> NaiveDateTime {
    let span = (Local::now().naive_local() - start).num_seconds().max(1);
    start + Duration::seconds(rng.gen_range(0..span))
}
