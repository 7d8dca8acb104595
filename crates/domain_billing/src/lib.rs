//! Billing Domain - Statement Lifecycle Engine
//!
//! This crate implements the monthly statement lifecycle for terminal
//! customers: draft generation, finalization with gap-free year-scoped
//! numbering, payment marking, and credit-note corrections.
//!
//! # State machine
//!
//! ```text
//!             regenerate (draft only)
//!                  ┌─────┐
//!                  ▼     │
//!   draft ────► finalized ────► paid
//!                  │              │
//!                  │ credit note  │ credit note
//!                  ▼              ▼
//!              cancelled (exact cumulative reversal only)
//! ```
//!
//! `draft` is the only mutable state. Finalization allocates the invoice
//! number and locks the document; corrections never touch a finalized
//! record, they append a linked credit-note statement carrying only the
//! adjustment.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{LifecycleEngine, BatchGenerator};
//!
//! let engine = LifecycleEngine::new(store, allocator, charges, config);
//! let draft = engine.create_draft(company_id, period).await?;
//! let invoice = engine.finalize(draft.id, "admin").await?;
//! ```

pub mod statement;
pub mod numbering;
pub mod lifecycle;
pub mod batch;
pub mod ports;
pub mod config;
pub mod error;

pub use statement::{
    AdjustmentLine, ChargeCategory, Statement, StatementKind, StatementStatus, StatementTotals,
};
pub use numbering::{DocumentNumber, SequenceKind};
pub use lifecycle::{CreditNoteOutcome, LifecycleEngine};
pub use batch::{BatchGenerator, BatchOutcome, CreatedDraft, SkipReason, SkippedCompany};
pub use ports::{ChargeSource, SequenceAllocator, StatementStore};
pub use config::EngineConfig;
pub use error::BillingError;
