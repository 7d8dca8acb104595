//! Sequence allocator on PostgreSQL
//!
//! The entire allocation is one atomic upsert-increment statement, so two
//! concurrent callers can never observe the same value; the row lock taken
//! by `ON CONFLICT .. DO UPDATE` is the serialization point. A value issued
//! here but never attached to a statement stays burned, which is exactly
//! the gap the numbering contract allows.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use domain_billing::{BillingError, SequenceAllocator, SequenceKind};

/// Repository implementing the sequence allocator port on PostgreSQL
#[derive(Debug, Clone)]
pub struct PgSequenceAllocator {
    pool: PgPool,
}

impl PgSequenceAllocator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn kind_to_str(kind: SequenceKind) -> &'static str {
    match kind {
        SequenceKind::Invoice => "invoice",
        SequenceKind::CreditNote => "credit_note",
    }
}

#[async_trait]
impl SequenceAllocator for PgSequenceAllocator {
    async fn next(&self, kind: SequenceKind, year: i32) -> Result<u32, BillingError> {
        let value: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO sequence_counters (kind, year, value)
            VALUES ($1, $2, 1)
            ON CONFLICT (kind, year)
            DO UPDATE SET value = sequence_counters.value + 1
            RETURNING value
            "#,
        )
        .bind(kind_to_str(kind))
        .bind(year)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| BillingError::SequenceExhausted {
            kind,
            year,
            reason: e.to_string(),
        })?;

        debug!(?kind, year, value, "sequence value issued");
        Ok(value as u32)
    }
}
