//! Domain models for the email contact dataset.
//!
//! This module contains the core data structures shared by the reader,
//! the metrics, and the generator:
//!
//! - [`Field`] - the fixed set of recognized CSV columns
//! - [`Record`] - one typed row of contact/email metadata
//!
//! The coercion invariant lives in the types: the count column is an
//! `Option<i64>` and the two timestamp columns are `Option<NaiveDateTime>`,
//! so no metric ever sees a raw string where a typed value is declared.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Default encoding of exported datasets (legacy single-byte Western).
pub const DEFAULT_ENCODING: &str = "iso-8859-1";

/// Default timestamp format: `MM/DD/YYYY hh:mm:ss AM|PM`.
pub const DEFAULT_DATE_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

// =============================================================================
// Fields
// =============================================================================

/// The fixed, ordered set of columns in a contact metadata export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Email,
    DisplayName,
    FirstName,
    MiddleName,
    LastName,
    City,
    Region,
    Country,
    FacebookLink,
    Count,
    FirstSeen,
    LastSeen,
}

impl Field {
    /// Canonical column order of the export format.
    pub const ALL: [Field; 12] = [
        Field::Email,
        Field::DisplayName,
        Field::FirstName,
        Field::MiddleName,
        Field::LastName,
        Field::City,
        Field::Region,
        Field::Country,
        Field::FacebookLink,
        Field::Count,
        Field::FirstSeen,
        Field::LastSeen,
    ];

    /// The CSV header string for this column.
    pub fn header(&self) -> &'static str {
        match self {
            Field::Email => "Email Address",
            Field::DisplayName => "Display Name",
            Field::FirstName => "First Name",
            Field::MiddleName => "Middle Name",
            Field::LastName => "Last Name",
            Field::City => "City",
            Field::Region => "Region",
            Field::Country => "Country",
            Field::FacebookLink => "Facebook Link",
            Field::Count => "Count",
            Field::FirstSeen => "First Seen",
            Field::LastSeen => "Last Seen",
        }
    }

    /// Look up a field from its CSV header string.
    pub fn from_header(header: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.header() == header)
    }
}

// =============================================================================
// Record
// =============================================================================

/// One typed row of contact/email metadata.
///
/// Text fields keep absent or empty cells as empty strings. The count and
/// timestamp fields use `None` for absent/empty cells; a non-empty cell that
/// fails coercion never produces a `Record` (the read fails fast instead).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub email: String,
    pub display_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub city: String,
    pub region: String,
    pub country: String,
    pub facebook_link: String,
    pub count: Option<i64>,
    pub first_seen: Option<NaiveDateTime>,
    pub last_seen: Option<NaiveDateTime>,
}

impl Record {
    /// The domain part of the email address (the substring after the first `@`).
    ///
    /// Returns `None` when the email field is empty or has no `@`.
    pub fn email_domain(&self) -> Option<&str> {
        self.email.split('@').nth(1).filter(|d| !d.is_empty())
    }

    /// Stringify the record back into CSV cells, in [`Field::ALL`] order.
    ///
    /// Timestamps are formatted with `datefmt`; `None` becomes an empty cell.
    pub fn to_cells(&self, datefmt: &str) -> Vec<String> {
        Field::ALL
            .iter()
            .map(|field| match field {
                Field::Email => self.email.clone(),
                Field::DisplayName => self.display_name.clone(),
                Field::FirstName => self.first_name.clone(),
                Field::MiddleName => self.middle_name.clone(),
                Field::LastName => self.last_name.clone(),
                Field::City => self.city.clone(),
                Field::Region => self.region.clone(),
                Field::Country => self.country.clone(),
                Field::FacebookLink => self.facebook_link.clone(),
                Field::Count => self.count.map(|c| c.to_string()).unwrap_or_default(),
                Field::FirstSeen => self
                    .first_seen
                    .map(|t| t.format(datefmt).to_string())
                    .unwrap_or_default(),
                Field::LastSeen => self
                    .last_seen
                    .map(|t| t.format(datefmt).to_string())
                    .unwrap_or_default(),
            })
            .collect()
    }
}
