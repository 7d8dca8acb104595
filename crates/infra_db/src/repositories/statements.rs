//! Statement store on PostgreSQL
//!
//! Statements persist as one row per document with the owned collections
//! (line items, adjustments, pending snapshot, totals) as JSONB columns, so
//! every write that touches line items and totals is a single atomic row
//! update. Lifecycle transitions are compare-and-set updates guarded on the
//! current status; the partial unique indexes in the schema enforce the
//! one-invoice-per-period and unique-number constraints.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use core_kernel::{BillingPeriod, CompanyId, StatementId};
use domain_billing::{
    BillingError, DocumentNumber, Statement, StatementKind, StatementStatus, StatementStore,
    StatementTotals,
};
use domain_charges::ChargeBundle;

use crate::error::DatabaseError;

const STATEMENT_COLUMNS: &str = "\
    id, company_id, period_year, period_month, kind, original_id, status, \
    invoice_number, finalized_at, finalized_by, paid_at, paid_by, \
    storage_items, service_items, adjustments, pending_snapshot, totals, \
    created_at, updated_at";

/// Repository implementing the statement store port on PostgreSQL
#[derive(Debug, Clone)]
pub struct PgStatementStore {
    pool: PgPool,
}

impl PgStatementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_row(&self, id: StatementId) -> Result<Statement, BillingError> {
        let sql = format!("SELECT {STATEMENT_COLUMNS} FROM statements WHERE id = $1");
        let row = sqlx::query_as::<_, StatementRow>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.ok_or(BillingError::NotFound(id))?.into_statement()
    }
}

#[async_trait]
impl StatementStore for PgStatementStore {
    async fn insert(&self, statement: &Statement) -> Result<(), BillingError> {
        let row = StatementRow::from_statement(statement)?;
        let result = sqlx::query(
            r#"
            INSERT INTO statements (
                id, company_id, period_year, period_month, kind, original_id,
                status, invoice_number, finalized_at, finalized_by, paid_at,
                paid_by, storage_items, service_items, adjustments,
                pending_snapshot, totals, created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, $19
            )
            "#,
        )
        .bind(row.id)
        .bind(row.company_id)
        .bind(row.period_year)
        .bind(row.period_month)
        .bind(row.kind)
        .bind(row.original_id)
        .bind(row.status)
        .bind(row.invoice_number)
        .bind(row.finalized_at)
        .bind(row.finalized_by)
        .bind(row.paid_at)
        .bind(row.paid_by)
        .bind(row.storage_items)
        .bind(row.service_items)
        .bind(row.adjustments)
        .bind(row.pending_snapshot)
        .bind(row.totals)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                debug!(statement = %statement.id, "statement inserted");
                Ok(())
            }
            Err(e) => {
                let db_error = DatabaseError::from(e);
                if db_error.is_constraint_violation()
                    && matches!(statement.kind, StatementKind::Invoice)
                {
                    Err(BillingError::DraftAlreadyExists {
                        company: statement.company_id,
                        period: statement.period,
                    })
                } else {
                    Err(BillingError::Backend(db_error.to_string()))
                }
            }
        }
    }

    async fn fetch(&self, id: StatementId) -> Result<Statement, BillingError> {
        self.fetch_row(id).await
    }

    async fn find_invoice(
        &self,
        company_id: CompanyId,
        period: BillingPeriod,
    ) -> Result<Option<Statement>, BillingError> {
        let sql = format!(
            "SELECT {STATEMENT_COLUMNS} FROM statements \
             WHERE company_id = $1 AND period_year = $2 AND period_month = $3 \
               AND kind = 'invoice'"
        );
        let row = sqlx::query_as::<_, StatementRow>(&sql)
            .bind(*company_id.as_uuid())
            .bind(period.year())
            .bind(period.month() as i32)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.map(StatementRow::into_statement).transpose()
    }

    async fn list_by_status(
        &self,
        status: StatementStatus,
    ) -> Result<Vec<Statement>, BillingError> {
        let sql = format!(
            "SELECT {STATEMENT_COLUMNS} FROM statements \
             WHERE status = $1 ORDER BY created_at, id"
        );
        let rows = sqlx::query_as::<_, StatementRow>(&sql)
            .bind(status_to_str(status))
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter().map(StatementRow::into_statement).collect()
    }

    async fn list_credit_notes(
        &self,
        original: StatementId,
    ) -> Result<Vec<Statement>, BillingError> {
        let sql = format!(
            "SELECT {STATEMENT_COLUMNS} FROM statements \
             WHERE original_id = $1 ORDER BY created_at, id"
        );
        let rows = sqlx::query_as::<_, StatementRow>(&sql)
            .bind(*original.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter().map(StatementRow::into_statement).collect()
    }

    async fn replace_line_items(
        &self,
        id: StatementId,
        bundle: ChargeBundle,
        totals: StatementTotals,
    ) -> Result<Statement, BillingError> {
        let storage_items = to_json(&bundle.storage_items)?;
        let service_items = to_json(&bundle.service_items)?;
        let pending_snapshot = to_json(&bundle.pending)?;
        let totals = to_json(&totals)?;

        let sql = format!(
            "UPDATE statements \
             SET storage_items = $2, service_items = $3, pending_snapshot = $4, \
                 totals = $5, updated_at = now() \
             WHERE id = $1 AND status = 'draft' \
             RETURNING {STATEMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, StatementRow>(&sql)
            .bind(*id.as_uuid())
            .bind(storage_items)
            .bind(service_items)
            .bind(pending_snapshot)
            .bind(totals)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        match row {
            Some(row) => row.into_statement(),
            // The guarded update hit nothing: tell the caller why.
            None => {
                let current = self.fetch_row(id).await?;
                Err(BillingError::ImmutableStatement {
                    id,
                    status: current.status,
                })
            }
        }
    }

    async fn apply_finalize(
        &self,
        id: StatementId,
        number: DocumentNumber,
        by: &str,
        at: DateTime<Utc>,
    ) -> Result<Statement, BillingError> {
        let sql = format!(
            "UPDATE statements \
             SET status = 'finalized', invoice_number = $2, finalized_at = $3, \
                 finalized_by = $4, updated_at = $3 \
             WHERE id = $1 AND status = 'draft' \
             RETURNING {STATEMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, StatementRow>(&sql)
            .bind(*id.as_uuid())
            .bind(number.to_string())
            .bind(at)
            .bind(by)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        match row {
            Some(row) => row.into_statement(),
            None => {
                let current = self.fetch_row(id).await?;
                match (current.status, current.invoice_number) {
                    (StatementStatus::Finalized | StatementStatus::Paid, Some(number)) => {
                        Err(BillingError::AlreadyFinalized { id, number })
                    }
                    _ => Err(BillingError::InvalidTransition {
                        from: current.status,
                        event: "finalize",
                    }),
                }
            }
        }
    }

    async fn apply_paid(
        &self,
        id: StatementId,
        by: &str,
        at: DateTime<Utc>,
    ) -> Result<Statement, BillingError> {
        let sql = format!(
            "UPDATE statements \
             SET status = 'paid', paid_at = $2, paid_by = $3, updated_at = $2 \
             WHERE id = $1 AND status = 'finalized' \
             RETURNING {STATEMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, StatementRow>(&sql)
            .bind(*id.as_uuid())
            .bind(at)
            .bind(by)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        match row {
            Some(row) => row.into_statement(),
            None => {
                let current = self.fetch_row(id).await?;
                match current.status {
                    StatementStatus::Paid => Ok(current),
                    status => Err(BillingError::InvalidTransition {
                        from: status,
                        event: "mark paid",
                    }),
                }
            }
        }
    }

    async fn apply_cancelled(&self, id: StatementId) -> Result<Statement, BillingError> {
        let sql = format!(
            "UPDATE statements \
             SET status = 'cancelled', updated_at = now() \
             WHERE id = $1 AND status IN ('finalized', 'paid') \
             RETURNING {STATEMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, StatementRow>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        match row {
            Some(row) => row.into_statement(),
            None => {
                let current = self.fetch_row(id).await?;
                Err(BillingError::InvalidTransition {
                    from: current.status,
                    event: "cancel",
                })
            }
        }
    }
}

fn backend(e: sqlx::Error) -> BillingError {
    BillingError::Backend(DatabaseError::from(e).to_string())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, BillingError> {
    serde_json::to_value(value)
        .map_err(|e| BillingError::Backend(DatabaseError::SerializationError(e.to_string()).to_string()))
}

fn from_json<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T, BillingError> {
    serde_json::from_value(value)
        .map_err(|e| BillingError::Backend(DatabaseError::SerializationError(e.to_string()).to_string()))
}

fn status_to_str(status: StatementStatus) -> &'static str {
    match status {
        StatementStatus::Draft => "draft",
        StatementStatus::Finalized => "finalized",
        StatementStatus::Paid => "paid",
        StatementStatus::Cancelled => "cancelled",
    }
}

fn status_from_str(s: &str) -> Result<StatementStatus, BillingError> {
    match s {
        "draft" => Ok(StatementStatus::Draft),
        "finalized" => Ok(StatementStatus::Finalized),
        "paid" => Ok(StatementStatus::Paid),
        "cancelled" => Ok(StatementStatus::Cancelled),
        other => Err(BillingError::Backend(format!("unknown status '{other}'"))),
    }
}

/// Row shape of the `statements` table
#[derive(sqlx::FromRow)]
struct StatementRow {
    id: Uuid,
    company_id: Uuid,
    period_year: i32,
    period_month: i32,
    kind: String,
    original_id: Option<Uuid>,
    status: String,
    invoice_number: Option<String>,
    finalized_at: Option<DateTime<Utc>>,
    finalized_by: Option<String>,
    paid_at: Option<DateTime<Utc>>,
    paid_by: Option<String>,
    storage_items: serde_json::Value,
    service_items: serde_json::Value,
    adjustments: serde_json::Value,
    pending_snapshot: serde_json::Value,
    totals: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StatementRow {
    fn from_statement(statement: &Statement) -> Result<Self, BillingError> {
        let (kind, original_id) = match statement.kind {
            StatementKind::Invoice => ("invoice".to_string(), None),
            StatementKind::CreditNote { original } => {
                ("credit_note".to_string(), Some(*original.as_uuid()))
            }
        };
        Ok(Self {
            id: *statement.id.as_uuid(),
            company_id: *statement.company_id.as_uuid(),
            period_year: statement.period.year(),
            period_month: statement.period.month() as i32,
            kind,
            original_id,
            status: status_to_str(statement.status).to_string(),
            invoice_number: statement.invoice_number.map(|n| n.to_string()),
            finalized_at: statement.finalized_at,
            finalized_by: statement.finalized_by.clone(),
            paid_at: statement.paid_at,
            paid_by: statement.paid_by.clone(),
            storage_items: to_json(&statement.storage_items)?,
            service_items: to_json(&statement.service_items)?,
            adjustments: to_json(&statement.adjustments)?,
            pending_snapshot: to_json(&statement.pending_snapshot)?,
            totals: to_json(&statement.totals)?,
            created_at: statement.created_at,
            updated_at: statement.updated_at,
        })
    }

    fn into_statement(self) -> Result<Statement, BillingError> {
        let kind = match (self.kind.as_str(), self.original_id) {
            ("invoice", None) => StatementKind::Invoice,
            ("credit_note", Some(original)) => StatementKind::CreditNote {
                original: StatementId::from_uuid(original),
            },
            (kind, _) => {
                return Err(BillingError::Backend(format!(
                    "inconsistent kind/original for statement {}: {kind}",
                    self.id
                )))
            }
        };
        let period = BillingPeriod::new(self.period_year, self.period_month as u32)
            .map_err(|e| BillingError::Backend(e.to_string()))?;
        let invoice_number = self
            .invoice_number
            .as_deref()
            .map(str::parse::<DocumentNumber>)
            .transpose()
            .map_err(|e| BillingError::Backend(e.to_string()))?;

        Ok(Statement {
            id: StatementId::from_uuid(self.id),
            company_id: CompanyId::from_uuid(self.company_id),
            period,
            kind,
            status: status_from_str(&self.status)?,
            invoice_number,
            finalized_at: self.finalized_at,
            finalized_by: self.finalized_by,
            paid_at: self.paid_at,
            paid_by: self.paid_by,
            storage_items: from_json(self.storage_items)?,
            service_items: from_json(self.service_items)?,
            adjustments: from_json(self.adjustments)?,
            pending_snapshot: from_json(self.pending_snapshot)?,
            totals: from_json(self.totals)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
