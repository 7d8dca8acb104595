//! Monthly batch draft generation
//!
//! Walks every company with billable activity in a period and creates its
//! draft statement. Companies are independent units of work: one failure or
//! timeout is recorded and the batch moves on. Re-running the same period
//! is safe; companies that already have a statement are skipped.

use tokio::time::timeout;
use tracing::{error, info, warn};

use core_kernel::{BillingPeriod, CompanyId, StatementId};

use crate::error::BillingError;
use crate::lifecycle::LifecycleEngine;

/// One successfully created draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedDraft {
    pub company_id: CompanyId,
    pub statement_id: StatementId,
}

/// Why a company was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A statement for (company, period) already exists
    AlreadyExists,
    /// Draft generation exceeded the per-company time budget; the store
    /// insert is atomic, so no partial line items were left behind
    TimedOut,
    /// Aggregation or persistence failed
    Failed(String),
}

/// One skipped company and the reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCompany {
    pub company_id: CompanyId,
    pub reason: SkipReason,
}

/// The result of one batch run
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub created: Vec<CreatedDraft>,
    pub skipped: Vec<SkippedCompany>,
}

impl BatchOutcome {
    /// True if every company either got a draft or already had one
    pub fn is_clean(&self) -> bool {
        self.skipped
            .iter()
            .all(|s| s.reason == SkipReason::AlreadyExists)
    }
}

/// Drives monthly draft creation across all eligible companies
pub struct BatchGenerator {
    engine: LifecycleEngine,
}

impl BatchGenerator {
    pub fn new(engine: LifecycleEngine) -> Self {
        Self { engine }
    }

    /// Creates draft statements for every company with billable activity
    /// in the given month
    pub async fn generate_all_drafts(
        &self,
        year: i32,
        month: u32,
    ) -> Result<BatchOutcome, BillingError> {
        let period = BillingPeriod::new(year, month)?;
        let companies = self
            .engine
            .charges()
            .companies_with_activity(period)
            .await?;
        info!(%period, companies = companies.len(), "batch generation started");

        let mut outcome = BatchOutcome::default();
        let budget = self.engine.config().batch_company_timeout();

        for company_id in companies {
            match timeout(budget, self.engine.create_draft(company_id, period)).await {
                Ok(Ok(statement)) => {
                    outcome.created.push(CreatedDraft {
                        company_id,
                        statement_id: statement.id,
                    });
                }
                Ok(Err(BillingError::DraftAlreadyExists { .. })) => {
                    outcome.skipped.push(SkippedCompany {
                        company_id,
                        reason: SkipReason::AlreadyExists,
                    });
                }
                Ok(Err(e)) => {
                    error!(%company_id, %period, error = %e, "draft generation failed");
                    outcome.skipped.push(SkippedCompany {
                        company_id,
                        reason: SkipReason::Failed(e.to_string()),
                    });
                }
                Err(_) => {
                    warn!(%company_id, %period, "draft generation timed out");
                    outcome.skipped.push(SkippedCompany {
                        company_id,
                        reason: SkipReason::TimedOut,
                    });
                }
            }
        }

        info!(
            %period,
            created = outcome.created.len(),
            skipped = outcome.skipped.len(),
            "batch generation finished"
        );
        Ok(outcome)
    }
}
