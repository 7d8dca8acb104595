//! Charge domain errors

use core_kernel::{CompanyId, StayId};
use thiserror::Error;

/// Errors raised while validating or aggregating charge data
///
/// Aggregation never partially commits: any of these aborts the whole run
/// for the affected company and leaves no line items behind.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregationError {
    /// Two stay records for the same container overlap in time
    #[error("Overlapping stays for container {container}")]
    OverlappingStays { container: String },

    /// A stay record belongs to a different company than the one being billed
    #[error("Stay {stay} belongs to another company (expected {expected})")]
    ForeignStay { stay: StayId, expected: CompanyId },

    /// A stay record is internally inconsistent
    #[error("Invalid stay for container {container}: {reason}")]
    InvalidStay { container: String, reason: String },

    /// A container number does not match the ISO 6346 shape
    #[error("Invalid container number: {0}")]
    InvalidContainerNumber(String),

    /// The underlying charge data could not be loaded
    #[error("Charge data unavailable: {0}")]
    Unavailable(String),
}
