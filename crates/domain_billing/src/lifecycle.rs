//! Statement lifecycle engine
//!
//! Orchestrates the state machine over the store, allocator, and charge
//! source ports. All operations are short and synchronous request-response;
//! serialization per statement is delegated to the store's compare-and-set
//! transitions, with the allocator's atomic increment as the enforcement
//! point against double numbering.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use core_kernel::{BillingPeriod, CompanyId, StatementId};

use crate::config::EngineConfig;
use crate::error::BillingError;
use crate::numbering::{DocumentNumber, SequenceKind};
use crate::ports::{ChargeSource, SequenceAllocator, StatementStore};
use crate::statement::{
    AdjustmentLine, Statement, StatementKind, StatementStatus, StatementTotals,
};

/// Result of creating a credit note
#[derive(Debug, Clone)]
pub struct CreditNoteOutcome {
    pub credit_note: Statement,
    /// The original as it stands afterwards; `Cancelled` if the credit note
    /// completed an exact cumulative reversal
    pub original: Statement,
}

/// The statement state machine
#[derive(Clone)]
pub struct LifecycleEngine {
    store: Arc<dyn StatementStore>,
    allocator: Arc<dyn SequenceAllocator>,
    charges: Arc<dyn ChargeSource>,
    config: EngineConfig,
}

impl LifecycleEngine {
    pub fn new(
        store: Arc<dyn StatementStore>,
        allocator: Arc<dyn SequenceAllocator>,
        charges: Arc<dyn ChargeSource>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            allocator,
            charges,
            config,
        }
    }

    pub fn store(&self) -> &Arc<dyn StatementStore> {
        &self.store
    }

    pub fn charges(&self) -> &Arc<dyn ChargeSource> {
        &self.charges
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Creates a draft invoice for one company and period
    pub async fn create_draft(
        &self,
        company_id: CompanyId,
        period: BillingPeriod,
    ) -> Result<Statement, BillingError> {
        if let Some(existing) = self.store.find_invoice(company_id, period).await? {
            warn!(%company_id, %period, statement = %existing.id, "draft already exists");
            return Err(BillingError::DraftAlreadyExists {
                company: company_id,
                period,
            });
        }

        let as_of = Utc::now().date_naive();
        let bundle = self.charges.bundle_for(company_id, period, as_of).await?;
        let statement =
            Statement::draft_invoice(company_id, period, bundle, self.config.currency_pair());
        self.store.insert(&statement).await?;

        info!(
            statement = %statement.id,
            %company_id,
            %period,
            total = %statement.totals.total,
            "draft created"
        );
        Ok(statement)
    }

    /// Discards and rebuilds a draft's line items from current charge data
    pub async fn regenerate(&self, id: StatementId) -> Result<Statement, BillingError> {
        let statement = self.store.fetch(id).await?;
        if !matches!(statement.kind, StatementKind::Invoice) {
            return Err(BillingError::InvalidTransition {
                from: statement.status,
                event: "regenerate",
            });
        }
        if statement.status != StatementStatus::Draft {
            return Err(BillingError::ImmutableStatement {
                id,
                status: statement.status,
            });
        }

        let as_of = Utc::now().date_naive();
        let bundle = self
            .charges
            .bundle_for(statement.company_id, statement.period, as_of)
            .await?;
        let totals = StatementTotals::from_bundle(&bundle, self.config.currency_pair());
        let updated = self.store.replace_line_items(id, bundle, totals).await?;

        info!(statement = %id, total = %updated.totals.total, "draft regenerated");
        Ok(updated)
    }

    /// Finalizes a draft: allocates its number and locks it
    ///
    /// Re-finalizing an already finalized (or paid) statement is a no-op
    /// success returning the existing record, so retried requests are
    /// harmless and never allocate a second number.
    pub async fn finalize(
        &self,
        id: StatementId,
        user: &str,
    ) -> Result<Statement, BillingError> {
        let statement = self.store.fetch(id).await?;
        match statement.status {
            StatementStatus::Finalized | StatementStatus::Paid => {
                info!(statement = %id, "finalize repeated; returning existing record");
                return Ok(statement);
            }
            StatementStatus::Cancelled => {
                return Err(BillingError::InvalidTransition {
                    from: statement.status,
                    event: "finalize",
                });
            }
            StatementStatus::Draft => {}
        }

        let year = statement.period.year();
        let value = self.allocator.next(SequenceKind::Invoice, year).await?;
        let number = DocumentNumber::new(SequenceKind::Invoice, year, value);

        match self
            .store
            .apply_finalize(id, number, user, Utc::now())
            .await
        {
            Ok(finalized) => {
                info!(statement = %id, %number, user, "statement finalized");
                Ok(finalized)
            }
            Err(BillingError::AlreadyFinalized { .. }) => {
                // Lost a race: the allocated number is burned, the winner's
                // record is the statement's truth.
                warn!(statement = %id, burned = %number, "finalize raced; number burned");
                self.store.fetch(id).await
            }
            Err(other) => Err(other),
        }
    }

    /// Marks a finalized statement as paid; repeat calls are no-ops
    pub async fn mark_paid(
        &self,
        id: StatementId,
        user: &str,
    ) -> Result<Statement, BillingError> {
        let statement = self.store.fetch(id).await?;
        match statement.status {
            StatementStatus::Paid => Ok(statement),
            StatementStatus::Finalized => {
                let paid = self.store.apply_paid(id, user, Utc::now()).await?;
                info!(statement = %id, user, "statement paid");
                Ok(paid)
            }
            StatementStatus::Draft | StatementStatus::Cancelled => {
                Err(BillingError::InvalidTransition {
                    from: statement.status,
                    event: "mark paid",
                })
            }
        }
    }

    /// Issues a credit note against a finalized or paid invoice
    ///
    /// `corrections` carry the positive amounts being reversed. When the
    /// cumulative credit-note total against the original exactly negates
    /// the original's total, the original flips to `Cancelled`.
    pub async fn create_credit_note(
        &self,
        original_id: StatementId,
        user: &str,
        corrections: Vec<AdjustmentLine>,
    ) -> Result<CreditNoteOutcome, BillingError> {
        let original = self.store.fetch(original_id).await?;

        // Validate before touching the allocator so an invalid request
        // cannot burn a number.
        if !matches!(original.kind, StatementKind::Invoice)
            || !matches!(
                original.status,
                StatementStatus::Finalized | StatementStatus::Paid
            )
        {
            return Err(BillingError::InvalidOriginalState {
                id: original_id,
                status: original.status,
            });
        }

        let year = original.period.year();
        let value = self.allocator.next(SequenceKind::CreditNote, year).await?;
        let number = DocumentNumber::new(SequenceKind::CreditNote, year, value);

        let credit_note = Statement::credit_note(&original, number, corrections, user)?;
        self.store.insert(&credit_note).await?;
        info!(
            credit_note = %credit_note.id,
            %number,
            original = %original_id,
            total = %credit_note.totals.total,
            "credit note issued"
        );

        let original = self.settle_cumulative_reversal(&original).await?;

        Ok(CreditNoteOutcome {
            credit_note,
            original,
        })
    }

    /// Applies the exact-cumulative-reversal cancellation rule
    async fn settle_cumulative_reversal(
        &self,
        original: &Statement,
    ) -> Result<Statement, BillingError> {
        let credit_notes = self.store.list_credit_notes(original.id).await?;
        let reversed = credit_notes
            .iter()
            .fold(original.totals.total, |acc, note| acc + note.totals.total);

        if reversed.is_zero() {
            let cancelled = self.store.apply_cancelled(original.id).await?;
            info!(statement = %original.id, "original fully reversed; cancelled");
            Ok(cancelled)
        } else {
            self.store.fetch(original.id).await
        }
    }
}
