//! CSV dataset reader with encoding detection and per-field type coercion.
//!
//! [`Dataset`] wraps a contact metadata export on disk and produces an
//! ordered, finite, restartable sequence of validated [`Record`]s. Every
//! produced record satisfies the coercion invariant: the count cell is
//! parsed as an integer and the two timestamp cells are parsed with the
//! configured date format before any consumer sees the row. Malformed
//! values fail fast with full line/column/value context.

use std::cell::Cell;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::error::{DatasetError, DatasetResult};
use crate::record::{Field, Record, DEFAULT_DATE_FORMAT, DEFAULT_ENCODING};

// =============================================================================
// Options
// =============================================================================

/// Configuration for reading a dataset.
///
/// Every recognized option is a named field; there is no dynamic
/// configuration surface.
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// Encoding label of the file. `None` auto-detects from the raw bytes.
    pub encoding: Option<String>,

    /// Format of the two timestamp columns.
    pub datefmt: String,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            encoding: Some(DEFAULT_ENCODING.to_string()),
            datefmt: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl ReaderOptions {
    /// Options that auto-detect the encoding instead of assuming the default.
    pub fn auto_encoding() -> Self {
        Self {
            encoding: None,
            ..Self::default()
        }
    }
}

// =============================================================================
// Dataset
// =============================================================================

/// A contact metadata export on disk, readable as typed records.
///
/// Iteration is restartable: every call to [`Dataset::records`] re-reads the
/// file from the start. The row count is computed by full iteration on first
/// demand and cached; an iterator that runs to exhaustion also populates the
/// cache.
#[derive(Debug)]
pub struct Dataset {
    path: PathBuf,
    options: ReaderOptions,
    cached_len: Cell<Option<usize>>,
}

impl Dataset {
    /// Open a dataset with default options.
    ///
    /// Fails with [`DatasetError::InvalidSource`] unless `path` is an
    /// existing regular file.
    pub fn new<P: AsRef<Path>>(path: P) -> DatasetResult<Self> {
        Self::with_options(path, ReaderOptions::default())
    }

    /// Open a dataset with explicit options.
    pub fn with_options<P: AsRef<Path>>(path: P, options: ReaderOptions) -> DatasetResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DatasetError::InvalidSource(path.display().to_string()));
        }
        Ok(Self {
            path: path.to_path_buf(),
            options,
            cached_len: Cell::new(None),
        })
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reader options in effect.
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Start a fresh pass over the rows.
    ///
    /// Decodes the whole file, validates that every expected column is
    /// present, and returns an iterator of coerced records.
    pub fn records(&self) -> DatasetResult<Records<'_>> {
        let bytes = fs::read(&self.path)?;
        let content = decode(&bytes, self.options.encoding.as_deref())?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(Cursor::new(content.into_bytes()));

        let headers = reader.headers()?.clone();
        let columns = resolve_columns(&headers)?;

        Ok(Records {
            inner: reader.into_records(),
            columns,
            datefmt: &self.options.datefmt,
            seen: 0,
            errored: false,
            cached_len: &self.cached_len,
        })
    }

    /// Number of data rows in the file.
    ///
    /// Computed by full iteration if no pass has completed yet; stable
    /// across repeated calls.
    pub fn len(&self) -> DatasetResult<usize> {
        if let Some(n) = self.cached_len.get() {
            return Ok(n);
        }
        let mut count = 0;
        for record in self.records()? {
            record?;
            count += 1;
        }
        Ok(count)
    }

    /// Whether the dataset has no data rows.
    pub fn is_empty(&self) -> DatasetResult<bool> {
        Ok(self.len()? == 0)
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Detect the encoding of raw bytes, normalized to a WHATWG label.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let (charset, _, _) = chardet::detect(bytes);
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes with the given encoding label, or auto-detect when `None`.
///
/// An unrecognized label is a defined error, not a silent fallback.
fn decode(bytes: &[u8], label: Option<&str>) -> DatasetResult<String> {
    let label = match label {
        Some(l) => l.to_string(),
        None => detect_encoding(bytes),
    };
    let encoding = encoding_rs::Encoding::for_label(label.as_bytes())
        .ok_or_else(|| DatasetError::UnknownEncoding(label.clone()))?;
    Ok(encoding.decode(bytes).0.into_owned())
}

// =============================================================================
// Row iteration and coercion
// =============================================================================

/// Map every expected [`Field`] to its position in the header row.
fn resolve_columns(headers: &csv::StringRecord) -> DatasetResult<Vec<usize>> {
    Field::ALL
        .iter()
        .map(|field| {
            headers
                .iter()
                .position(|h| h.trim() == field.header())
                .ok_or_else(|| DatasetError::MissingColumn(field.header().to_string()))
        })
        .collect()
}

/// Iterator over the coerced rows of one pass.
pub struct Records<'a> {
    inner: csv::StringRecordsIntoIter<Cursor<Vec<u8>>>,
    columns: Vec<usize>,
    datefmt: &'a str,
    seen: usize,
    errored: bool,
    cached_len: &'a Cell<Option<usize>>,
}

impl Iterator for Records<'_> {
    type Item = DatasetResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.next() {
            None => {
                // A pass that yielded any error must not populate the
                // cache: len() computed fresh would propagate the error.
                if !self.errored {
                    self.cached_len.set(Some(self.seen));
                }
                None
            }
            Some(Err(e)) => {
                self.errored = true;
                Some(Err(e.into()))
            }
            Some(Ok(row)) => {
                self.seen += 1;
                // +1 for 1-based lines, +1 for the header row.
                let line = self.seen + 1;
                let result = munge(&row, &self.columns, self.datefmt, line);
                if result.is_err() {
                    self.errored = true;
                }
                Some(result)
            }
        }
    }
}

/// Coerce one raw CSV row into a typed [`Record`].
fn munge(
    row: &csv::StringRecord,
    columns: &[usize],
    datefmt: &str,
    line: usize,
) -> DatasetResult<Record> {
    let cell = |field: Field| -> String {
        let slot = Field::ALL
            .iter()
            .position(|f| *f == field)
            .and_then(|i| columns.get(i))
            .copied();
        slot.and_then(|idx| row.get(idx))
            .unwrap_or("")
            .trim()
            .to_string()
    };

    let count_raw = cell(Field::Count);
    let count = if count_raw.is_empty() {
        None
    } else {
        let parsed = count_raw
            .parse::<i64>()
            .map_err(|e| DatasetError::InvalidValue {
                line,
                column: Field::Count.header().to_string(),
                value: count_raw.clone(),
                message: e.to_string(),
            })?;
        Some(parsed)
    };

    let first_seen = parse_timestamp(&cell(Field::FirstSeen), Field::FirstSeen, datefmt, line)?;
    let last_seen = parse_timestamp(&cell(Field::LastSeen), Field::LastSeen, datefmt, line)?;

    Ok(Record {
        email: cell(Field::Email),
        display_name: cell(Field::DisplayName),
        first_name: cell(Field::FirstName),
        middle_name: cell(Field::MiddleName),
        last_name: cell(Field::LastName),
        city: cell(Field::City),
        region: cell(Field::Region),
        country: cell(Field::Country),
        facebook_link: cell(Field::FacebookLink),
        count,
        first_seen,
        last_seen,
    })
}

/// Parse a timestamp cell; empty cells coerce to `None` without error.
fn parse_timestamp(
    value: &str,
    column: Field,
    datefmt: &str,
    line: usize,
) -> DatasetResult<Option<NaiveDateTime>> {
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDateTime::parse_from_str(value, datefmt)
        .map(Some)
        .map_err(|e| DatasetError::InvalidValue {
            line,
            column: column.header().to_string(),
            value: value.to_string(),
            message: e.to_string(),
        })
}
