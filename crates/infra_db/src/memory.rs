//! In-memory port adapters
//!
//! Hermetic implementations of the domain ports backed by mutex-guarded
//! maps. The test suite runs the whole lifecycle against these; they honor
//! the same contracts as the PostgreSQL adapters, including the central
//! immutability enforcement and compare-and-set transitions.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use core_kernel::{BillingPeriod, CompanyId, StatementId};
use domain_billing::{
    BillingError, ChargeSource, DocumentNumber, SequenceAllocator, SequenceKind, Statement,
    StatementKind, StatementStatus, StatementStore, StatementTotals,
};
use domain_charges::{aggregator, AggregationError, ChargeBundle, ContainerStay, ServiceCharge};

/// Mutex-guarded statement map enforcing the store contract
#[derive(Default)]
pub struct MemoryStatementStore {
    statements: Mutex<HashMap<StatementId, Statement>>,
}

impl MemoryStatementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of statements held; test helper
    pub fn len(&self) -> usize {
        self.statements.lock().expect("store lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StatementStore for MemoryStatementStore {
    async fn insert(&self, statement: &Statement) -> Result<(), BillingError> {
        let mut statements = self.statements.lock().expect("store lock");
        if matches!(statement.kind, StatementKind::Invoice) {
            let duplicate = statements.values().any(|s| {
                matches!(s.kind, StatementKind::Invoice)
                    && s.company_id == statement.company_id
                    && s.period == statement.period
            });
            if duplicate {
                return Err(BillingError::DraftAlreadyExists {
                    company: statement.company_id,
                    period: statement.period,
                });
            }
        }
        statements.insert(statement.id, statement.clone());
        Ok(())
    }

    async fn fetch(&self, id: StatementId) -> Result<Statement, BillingError> {
        self.statements
            .lock()
            .expect("store lock")
            .get(&id)
            .cloned()
            .ok_or(BillingError::NotFound(id))
    }

    async fn find_invoice(
        &self,
        company_id: CompanyId,
        period: BillingPeriod,
    ) -> Result<Option<Statement>, BillingError> {
        let statements = self.statements.lock().expect("store lock");
        Ok(statements
            .values()
            .find(|s| {
                matches!(s.kind, StatementKind::Invoice)
                    && s.company_id == company_id
                    && s.period == period
            })
            .cloned())
    }

    async fn list_by_status(
        &self,
        status: StatementStatus,
    ) -> Result<Vec<Statement>, BillingError> {
        let statements = self.statements.lock().expect("store lock");
        let mut result: Vec<Statement> = statements
            .values()
            .filter(|s| s.status == status)
            .cloned()
            .collect();
        result.sort_by_key(|s| (s.created_at, s.id));
        Ok(result)
    }

    async fn list_credit_notes(
        &self,
        original: StatementId,
    ) -> Result<Vec<Statement>, BillingError> {
        let statements = self.statements.lock().expect("store lock");
        let mut result: Vec<Statement> = statements
            .values()
            .filter(|s| s.original_id() == Some(original))
            .cloned()
            .collect();
        result.sort_by_key(|s| (s.created_at, s.id));
        Ok(result)
    }

    async fn replace_line_items(
        &self,
        id: StatementId,
        bundle: ChargeBundle,
        totals: StatementTotals,
    ) -> Result<Statement, BillingError> {
        let mut statements = self.statements.lock().expect("store lock");
        let statement = statements.get_mut(&id).ok_or(BillingError::NotFound(id))?;
        if statement.status != StatementStatus::Draft {
            return Err(BillingError::ImmutableStatement {
                id,
                status: statement.status,
            });
        }
        statement.storage_items = bundle.storage_items;
        statement.service_items = bundle.service_items;
        statement.pending_snapshot = bundle.pending;
        statement.totals = totals;
        statement.updated_at = Utc::now();
        Ok(statement.clone())
    }

    async fn apply_finalize(
        &self,
        id: StatementId,
        number: DocumentNumber,
        by: &str,
        at: DateTime<Utc>,
    ) -> Result<Statement, BillingError> {
        let mut statements = self.statements.lock().expect("store lock");
        let statement = statements.get_mut(&id).ok_or(BillingError::NotFound(id))?;
        match statement.status {
            StatementStatus::Draft => {
                statement.status = StatementStatus::Finalized;
                statement.invoice_number = Some(number);
                statement.finalized_at = Some(at);
                statement.finalized_by = Some(by.to_string());
                statement.updated_at = at;
                Ok(statement.clone())
            }
            StatementStatus::Finalized | StatementStatus::Paid => {
                Err(BillingError::AlreadyFinalized {
                    id,
                    number: statement
                        .invoice_number
                        .expect("finalized statements are numbered"),
                })
            }
            StatementStatus::Cancelled => Err(BillingError::InvalidTransition {
                from: statement.status,
                event: "finalize",
            }),
        }
    }

    async fn apply_paid(
        &self,
        id: StatementId,
        by: &str,
        at: DateTime<Utc>,
    ) -> Result<Statement, BillingError> {
        let mut statements = self.statements.lock().expect("store lock");
        let statement = statements.get_mut(&id).ok_or(BillingError::NotFound(id))?;
        match statement.status {
            StatementStatus::Finalized => {
                statement.status = StatementStatus::Paid;
                statement.paid_at = Some(at);
                statement.paid_by = Some(by.to_string());
                statement.updated_at = at;
                Ok(statement.clone())
            }
            StatementStatus::Paid => Ok(statement.clone()),
            StatementStatus::Draft | StatementStatus::Cancelled => {
                Err(BillingError::InvalidTransition {
                    from: statement.status,
                    event: "mark paid",
                })
            }
        }
    }

    async fn apply_cancelled(&self, id: StatementId) -> Result<Statement, BillingError> {
        let mut statements = self.statements.lock().expect("store lock");
        let statement = statements.get_mut(&id).ok_or(BillingError::NotFound(id))?;
        match statement.status {
            StatementStatus::Finalized | StatementStatus::Paid => {
                statement.status = StatementStatus::Cancelled;
                statement.updated_at = Utc::now();
                Ok(statement.clone())
            }
            StatementStatus::Draft | StatementStatus::Cancelled => {
                Err(BillingError::InvalidTransition {
                    from: statement.status,
                    event: "cancel",
                })
            }
        }
    }
}

/// Mutex-guarded per-(kind, year) counters
///
/// Issued values are strictly increasing and never handed out twice; a
/// value the caller fails to use is simply gone.
#[derive(Default)]
pub struct MemorySequenceAllocator {
    counters: Mutex<HashMap<(SequenceKind, i32), u32>>,
}

impl MemorySequenceAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last value issued for (kind, year), if any; test helper
    pub fn last_issued(&self, kind: SequenceKind, year: i32) -> Option<u32> {
        self.counters
            .lock()
            .expect("counter lock")
            .get(&(kind, year))
            .copied()
    }
}

#[async_trait]
impl SequenceAllocator for MemorySequenceAllocator {
    async fn next(&self, kind: SequenceKind, year: i32) -> Result<u32, BillingError> {
        let mut counters = self.counters.lock().expect("counter lock");
        let value = counters.entry((kind, year)).or_insert(0);
        *value += 1;
        Ok(*value)
    }
}

/// Charge source over fixed in-memory stay and charge records
///
/// Companies can be marked slow or failing to drive the batch generator's
/// isolation and timeout paths in tests.
#[derive(Default)]
pub struct MemoryChargeSource {
    stays: Mutex<Vec<ContainerStay>>,
    charges: Mutex<Vec<ServiceCharge>>,
    failing: Mutex<HashSet<CompanyId>>,
    slow: Mutex<HashMap<CompanyId, Duration>>,
}

impl MemoryChargeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(stays: Vec<ContainerStay>, charges: Vec<ServiceCharge>) -> Self {
        Self {
            stays: Mutex::new(stays),
            charges: Mutex::new(charges),
            ..Self::default()
        }
    }

    pub fn push_stay(&self, stay: ContainerStay) {
        self.stays.lock().expect("stay lock").push(stay);
    }

    pub fn push_charge(&self, charge: ServiceCharge) {
        self.charges.lock().expect("charge lock").push(charge);
    }

    /// Makes aggregation fail for the given company
    pub fn fail_company(&self, company_id: CompanyId) {
        self.failing.lock().expect("fail lock").insert(company_id);
    }

    /// Makes aggregation stall for the given company
    pub fn slow_company(&self, company_id: CompanyId, delay: Duration) {
        self.slow.lock().expect("slow lock").insert(company_id, delay);
    }
}

#[async_trait]
impl ChargeSource for MemoryChargeSource {
    async fn companies_with_activity(
        &self,
        period: BillingPeriod,
    ) -> Result<Vec<CompanyId>, AggregationError> {
        let stays = self.stays.lock().expect("stay lock").clone();
        let charges = self.charges.lock().expect("charge lock").clone();
        Ok(aggregator::companies_with_activity(period, &stays, &charges))
    }

    async fn bundle_for(
        &self,
        company_id: CompanyId,
        period: BillingPeriod,
        as_of: NaiveDate,
    ) -> Result<ChargeBundle, AggregationError> {
        let delay = self
            .slow
            .lock()
            .expect("slow lock")
            .get(&company_id)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().expect("fail lock").contains(&company_id) {
            return Err(AggregationError::InvalidStay {
                container: "unknown".to_string(),
                reason: "injected failure".to_string(),
            });
        }

        let stays: Vec<ContainerStay> = self
            .stays
            .lock()
            .expect("stay lock")
            .iter()
            .filter(|s| s.company_id == company_id)
            .cloned()
            .collect();
        let charges: Vec<ServiceCharge> = self
            .charges
            .lock()
            .expect("charge lock")
            .iter()
            .filter(|c| c.company_id == company_id)
            .cloned()
            .collect();

        aggregator::aggregate(company_id, period, as_of, &stays, &charges)
    }
}
