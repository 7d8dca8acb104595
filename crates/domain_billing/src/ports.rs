//! Ports to the infrastructure the lifecycle engine drives
//!
//! Each port is an async trait implemented twice in `infra_db`: once on
//! PostgreSQL and once in memory. The engine only ever talks to these
//! traits; the serialization guarantees (row locks, atomic increments)
//! are the adapters' responsibility.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use core_kernel::{BillingPeriod, CompanyId, StatementId};
use domain_charges::{AggregationError, ChargeBundle};

use crate::error::BillingError;
use crate::numbering::{DocumentNumber, SequenceKind};
use crate::statement::{Statement, StatementStatus, StatementTotals};

/// Issues gap-free year-scoped document numbers
///
/// `next` must behave as an atomic increment: two concurrent calls for the
/// same (kind, year) can never observe the same value. A value that was
/// issued but never attached to a statement is a permanent gap; it is never
/// handed out again.
#[async_trait]
pub trait SequenceAllocator: Send + Sync {
    /// Returns the smallest integer not yet issued for (kind, year),
    /// starting at 1 each year
    async fn next(&self, kind: SequenceKind, year: i32) -> Result<u32, BillingError>;
}

/// Persists statements and enforces the immutability invariant centrally
///
/// Every mutation on a non-draft statement other than the transitions the
/// lifecycle engine applies fails with `ImmutableStatement`. Writes that
/// touch line items and totals are atomic: a reader never sees the two out
/// of sync.
#[async_trait]
pub trait StatementStore: Send + Sync {
    /// Inserts a freshly created statement
    ///
    /// Fails with `DraftAlreadyExists` when a non-credit-note statement for
    /// the same (company, period) is already present.
    async fn insert(&self, statement: &Statement) -> Result<(), BillingError>;

    async fn fetch(&self, id: StatementId) -> Result<Statement, BillingError>;

    /// The invoice for (company, period), if one exists
    async fn find_invoice(
        &self,
        company_id: CompanyId,
        period: BillingPeriod,
    ) -> Result<Option<Statement>, BillingError>;

    async fn list_by_status(
        &self,
        status: StatementStatus,
    ) -> Result<Vec<Statement>, BillingError>;

    /// All credit notes linked to the given original, oldest first
    async fn list_credit_notes(
        &self,
        original: StatementId,
    ) -> Result<Vec<Statement>, BillingError>;

    /// Replaces a draft's line items and totals in one atomic step
    async fn replace_line_items(
        &self,
        id: StatementId,
        bundle: ChargeBundle,
        totals: StatementTotals,
    ) -> Result<Statement, BillingError>;

    /// Compare-and-set Draft → Finalized
    ///
    /// The loser of a concurrent race observes `AlreadyFinalized` with the
    /// winner's number; its own allocated number is burned.
    async fn apply_finalize(
        &self,
        id: StatementId,
        number: DocumentNumber,
        by: &str,
        at: DateTime<Utc>,
    ) -> Result<Statement, BillingError>;

    /// Finalized → Paid
    async fn apply_paid(
        &self,
        id: StatementId,
        by: &str,
        at: DateTime<Utc>,
    ) -> Result<Statement, BillingError>;

    /// Finalized/Paid → Cancelled (exact cumulative reversal)
    async fn apply_cancelled(&self, id: StatementId) -> Result<Statement, BillingError>;
}

/// Supplies aggregated charge data for draft generation
#[async_trait]
pub trait ChargeSource: Send + Sync {
    /// Companies with any billable activity in the period
    async fn companies_with_activity(
        &self,
        period: BillingPeriod,
    ) -> Result<Vec<CompanyId>, AggregationError>;

    /// Runs charge aggregation for one company
    async fn bundle_for(
        &self,
        company_id: CompanyId,
        period: BillingPeriod,
        as_of: NaiveDate,
    ) -> Result<ChargeBundle, AggregationError>;
}
