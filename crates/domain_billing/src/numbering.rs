//! Document numbering
//!
//! The Sequence Allocator hands out bare integers; everything about how a
//! number is printed lives here. Keeping the format out of the allocator's
//! contract means a format change can never renumber existing documents.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Terminal prefix on every document number
pub const NUMBER_PREFIX: &str = "MTT";

/// The two independently numbered document sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceKind {
    Invoice,
    CreditNote,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unparseable document number: {0}")]
pub struct ParseNumberError(String);

/// A formatted, year-scoped document number
///
/// Invoices render as `MTT-{year}-{number:04}`, credit notes as
/// `MTT-CR-{year}-{number:04}`. The value is the allocator's integer,
/// starting at 1 each year per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentNumber {
    kind: SequenceKind,
    year: i32,
    value: u32,
}

impl DocumentNumber {
    pub fn new(kind: SequenceKind, year: i32, value: u32) -> Self {
        Self { kind, year, value }
    }

    pub fn kind(&self) -> SequenceKind {
        self.kind
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn value(&self) -> u32 {
        self.value
    }
}

impl fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SequenceKind::Invoice => {
                write!(f, "{}-{}-{:04}", NUMBER_PREFIX, self.year, self.value)
            }
            SequenceKind::CreditNote => {
                write!(f, "{}-CR-{}-{:04}", NUMBER_PREFIX, self.year, self.value)
            }
        }
    }
}

impl FromStr for DocumentNumber {
    type Err = ParseNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseNumberError(s.to_string());

        let rest = s.strip_prefix(NUMBER_PREFIX).ok_or_else(err)?;
        let rest = rest.strip_prefix('-').ok_or_else(err)?;
        let (kind, rest) = match rest.strip_prefix("CR-") {
            Some(rest) => (SequenceKind::CreditNote, rest),
            None => (SequenceKind::Invoice, rest),
        };
        let (year, value) = rest.split_once('-').ok_or_else(err)?;
        let year = year.parse::<i32>().map_err(|_| err())?;
        let value = value.parse::<u32>().map_err(|_| err())?;
        if value == 0 {
            return Err(err());
        }
        Ok(Self { kind, year, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_format() {
        let number = DocumentNumber::new(SequenceKind::Invoice, 2026, 1);
        assert_eq!(number.to_string(), "MTT-2026-0001");
    }

    #[test]
    fn test_credit_note_format() {
        let number = DocumentNumber::new(SequenceKind::CreditNote, 2026, 17);
        assert_eq!(number.to_string(), "MTT-CR-2026-0017");
    }

    #[test]
    fn test_width_grows_past_four_digits() {
        let number = DocumentNumber::new(SequenceKind::Invoice, 2026, 12345);
        assert_eq!(number.to_string(), "MTT-2026-12345");
    }

    #[test]
    fn test_parse_round_trip() {
        for number in [
            DocumentNumber::new(SequenceKind::Invoice, 2026, 1),
            DocumentNumber::new(SequenceKind::CreditNote, 2025, 204),
        ] {
            let parsed: DocumentNumber = number.to_string().parse().unwrap();
            assert_eq!(parsed, number);
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("INV-2026-0001".parse::<DocumentNumber>().is_err());
        assert!("MTT-2026".parse::<DocumentNumber>().is_err());
        assert!("MTT-2026-0000".parse::<DocumentNumber>().is_err());
        assert!("MTT-CR-20x6-0001".parse::<DocumentNumber>().is_err());
    }
}
