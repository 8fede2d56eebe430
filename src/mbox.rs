//! Mbox archive reading.
//!
//! An mbox file is a concatenation of messages, each introduced by an
//! envelope line starting with `From `. [`MboxReader`] lazily yields those
//! envelope lines; [`GmailMbox`] specializes it to extract sender
//! timestamps from Gmail-style envelopes, tolerating a bounded number of
//! malformed lines before stopping.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{MboxError, MboxResult};

/// Gmail envelope payload: `<message-id>@<host> <date>`.
static FROM_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)@(\w+)\s(.+)$").expect("invalid envelope regex")
});

/// Date format of the envelope trailer, e.g. `Wed Jan 15 15:56:43 2014`.
const FROM_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// Malformed envelope lines tolerated before extraction stops early.
const MAX_MALFORMED: usize = 100;

// =============================================================================
// MboxReader
// =============================================================================

/// Reader over the envelope lines of an mbox archive.
#[derive(Debug, Clone)]
pub struct MboxReader {
    path: PathBuf,
}

impl MboxReader {
    /// Open an archive.
    ///
    /// Fails with [`MboxError::InvalidSource`] unless `path` is an
    /// existing regular file.
    pub fn new<P: AsRef<Path>>(path: P) -> MboxResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(MboxError::InvalidSource(path.display().to_string()));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Path of the underlying archive.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lazily yield every envelope line (without the `From ` prefix).
    ///
    /// Mbox archives are not reliably UTF-8, so lines are read as bytes
    /// and decoded lossily.
    pub fn envelope_lines(&self) -> MboxResult<EnvelopeLines> {
        let file = File::open(&self.path)?;
        Ok(EnvelopeLines {
            reader: BufReader::new(file),
            buf: Vec::new(),
        })
    }
}

/// Iterator over the envelope lines of one pass through the archive.
pub struct EnvelopeLines {
    reader: BufReader<File>,
    buf: Vec<u8>,
}

impl Iterator for EnvelopeLines {
    type Item = std::io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Err(e) => return Some(Err(e)),
                Ok(0) => return None,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&self.buf);
                    let line = line.trim_end();
                    if let Some(envelope) = line.strip_prefix("From ") {
                        if !envelope.is_empty() {
                            return Some(Ok(envelope.to_string()));
                        }
                    }
                }
            }
        }
    }
}

// =============================================================================
// GmailMbox
// =============================================================================

/// Outcome of a timestamp extraction pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampExtraction {
    /// Sender timestamps, in archive order.
    pub timestamps: Vec<NaiveDateTime>,
    /// Envelope lines that did not match the expected format.
    pub malformed: usize,
}

/// Specialization for Gmail takeout archives: extracts sender timestamps
/// by pattern-matching the envelope line against the fixed Gmail format.
#[derive(Debug, Clone)]
pub struct GmailMbox {
    inner: MboxReader,
}

impl GmailMbox {
    pub fn new<P: AsRef<Path>>(path: P) -> MboxResult<Self> {
        Ok(Self {
            inner: MboxReader::new(path)?,
        })
    }

    /// The underlying envelope reader.
    pub fn reader(&self) -> &MboxReader {
        &self.inner
    }

    /// Extract the sender timestamp from every envelope line.
    ///
    /// Lines that do not match the envelope pattern, or whose date does
    /// not parse, count as malformed; extraction stops early once more
    /// than [`MAX_MALFORMED`] lines have failed.
    pub fn sender_timestamps(&self) -> MboxResult<TimestampExtraction> {
        let mut timestamps = Vec::new();
        let mut malformed = 0;

        for line in self.inner.envelope_lines()? {
            if malformed > MAX_MALFORMED {
                break;
            }
            let line = line?;
            let Some(caps) = FROM_LINE.captures(&line) else {
                malformed += 1;
                continue;
            };
            match NaiveDateTime::parse_from_str(&caps[3], FROM_DATE_FORMAT) {
                Ok(ts) => timestamps.push(ts),
                Err(_) => malformed += 1,
            }
        }

        Ok(TimestampExtraction {
            timestamps,
            malformed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn archive(messages: &[(&str, &str)]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for (envelope, body) in messages {
            writeln!(file, "From {}", envelope).unwrap();
            writeln!(file, "Subject: hi").unwrap();
            writeln!(file).unwrap();
            writeln!(file, "{}", body).unwrap();
        }
        file
    }

    #[test]
    fn test_bad_path() {
        let result = MboxReader::new("/path/to/bad/archive.mbox");
        assert!(matches!(result, Err(MboxError::InvalidSource(_))));
    }

    #[test]
    fn test_envelope_lines() {
        let file = archive(&[
            ("1234567890@xxx Wed Jan 15 15:56:43 2014", "hello"),
            ("1234567891@xxx Thu Jan 16 09:12:01 2014", "world"),
        ]);

        let reader = MboxReader::new(file.path()).unwrap();
        let lines: Vec<_> = reader
            .envelope_lines()
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("1234567890@xxx"));
        // Body lines (even ones mentioning From) are not envelopes.
        assert!(!lines.iter().any(|l| l.contains("hello")));
    }

    #[test]
    fn test_sender_timestamps() {
        let file = archive(&[
            ("1234567890@xxx Wed Jan 15 15:56:43 2014", "a"),
            ("1234567891@xxx Thu Jan 16 09:12:01 2014", "b"),
        ]);

        let gmail = GmailMbox::new(file.path()).unwrap();
        let extraction = gmail.sender_timestamps().unwrap();

        assert_eq!(extraction.timestamps.len(), 2);
        assert_eq!(extraction.malformed, 0);
        assert_eq!(
            extraction.timestamps[0].format("%Y-%m-%d %H:%M:%S").to_string(),
            "2014-01-15 15:56:43"
        );
    }

    #[test]
    fn test_malformed_lines_counted() {
        let file = archive(&[
            ("not-a-gmail-envelope", "a"),
            ("1234567890@xxx Wed Jan 15 15:56:43 2014", "b"),
            ("1234567891@xxx not a date at all", "c"),
        ]);

        let gmail = GmailMbox::new(file.path()).unwrap();
        let extraction = gmail.sender_timestamps().unwrap();

        assert_eq!(extraction.timestamps.len(), 1);
        assert_eq!(extraction.malformed, 2);
    }

    #[test]
    fn test_malformed_budget_stops_extraction() {
        let mut file = NamedTempFile::new().unwrap();
        for i in 0..=MAX_MALFORMED {
            writeln!(file, "From garbage-envelope-{}", i).unwrap();
        }
        writeln!(file, "From 1234567890@xxx Wed Jan 15 15:56:43 2014").unwrap();

        let gmail = GmailMbox::new(file.path()).unwrap();
        let extraction = gmail.sender_timestamps().unwrap();

        // The valid envelope after the budget is never reached.
        assert!(extraction.timestamps.is_empty());
        assert_eq!(extraction.malformed, MAX_MALFORMED + 1);
    }

    #[test]
    fn test_empty_archive() {
        let file = NamedTempFile::new().unwrap();
        let gmail = GmailMbox::new(file.path()).unwrap();
        let extraction = gmail.sender_timestamps().unwrap();

        assert!(extraction.timestamps.is_empty());
        assert_eq!(extraction.malformed, 0);
    }
}
