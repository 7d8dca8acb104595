//! Billing domain errors
//!
//! Callers can tell retryable failures apart from state-machine violations:
//! `SequenceExhausted` and `Backend` may be retried, everything else must
//! be surfaced to the operator as-is.

use thiserror::Error;

use core_kernel::{BillingPeriod, CompanyId, StatementId};
use domain_charges::AggregationError;

use crate::numbering::{DocumentNumber, SequenceKind};
use crate::statement::StatementStatus;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// Statement not found
    #[error("Statement not found: {0}")]
    NotFound(StatementId),

    /// Mutation attempted on a non-draft statement
    #[error("Statement {id} is {status:?} and can no longer be modified")]
    ImmutableStatement {
        id: StatementId,
        status: StatementStatus,
    },

    /// Finalize raced or repeated on an already-finalized statement
    ///
    /// The lifecycle engine absorbs this into a no-op success; stores raise
    /// it when a compare-and-set finds the draft already gone.
    #[error("Statement {id} is already finalized as {number}")]
    AlreadyFinalized {
        id: StatementId,
        number: DocumentNumber,
    },

    /// Credit note requested against a statement that cannot take one
    #[error("Credit note rejected: original {id} is {status:?}")]
    InvalidOriginalState {
        id: StatementId,
        status: StatementStatus,
    },

    /// A state-machine guard rejected the event
    #[error("Cannot {event} a {from:?} statement")]
    InvalidTransition {
        from: StatementStatus,
        event: &'static str,
    },

    /// A draft already exists for this company and period
    #[error("Statement already exists for company {company} in {period}")]
    DraftAlreadyExists {
        company: CompanyId,
        period: BillingPeriod,
    },

    /// The allocator issued a number but could not persist it
    ///
    /// The issued number is permanently burned; retrying allocates a fresh
    /// one and the statement stays in its prior state.
    #[error("Sequence allocation failed for {kind:?} {year}: {reason}")]
    SequenceExhausted {
        kind: SequenceKind,
        year: i32,
        reason: String,
    },

    /// Underlying charge data was inconsistent
    #[error("Aggregation failed: {0}")]
    Aggregation(#[from] AggregationError),

    /// The requested period is not a valid calendar month
    #[error("Invalid period: {0}")]
    InvalidPeriod(#[from] core_kernel::PeriodError),

    /// Storage backend failure
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl BillingError {
    /// True if retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BillingError::SequenceExhausted { .. } | BillingError::Backend(_)
        )
    }
}
