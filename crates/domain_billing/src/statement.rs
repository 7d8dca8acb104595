//! Statement aggregate
//!
//! A statement is one company's monthly billing document: either an invoice
//! assembled from storage and service line items, or a credit note carrying
//! only the adjustment against an earlier invoice. Once finalized a
//! statement is immutable; every mutation path below guards on `Draft`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use core_kernel::{
    BillingPeriod, CompanyId, CurrencyPair, DualAmount, LineItemId, StatementId,
};
use domain_charges::{ChargeBundle, ContainerNumber, PendingContainer, ServiceLineItem, StorageLineItem};

use crate::error::BillingError;
use crate::numbering::DocumentNumber;

/// Statement lifecycle status - the single source of truth
///
/// Flags like "is locked" or "can take a credit note" are derived from
/// this, never stored alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementStatus {
    /// Being assembled; the only mutable state
    Draft,
    /// Numbered and locked
    Finalized,
    /// Payment received
    Paid,
    /// Fully reversed by credit notes; terminal
    Cancelled,
}

/// What kind of document this statement is
///
/// The original reference lives inside the `CreditNote` variant, so an
/// invoice pointing at an "original" cannot be expressed at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatementKind {
    Invoice,
    CreditNote { original: StatementId },
}

/// Which side of the statement a correction applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeCategory {
    Storage,
    Service,
}

/// One correction line on a credit note
///
/// Stored with the sign it contributes to the credit note's totals, i.e.
/// negative for a reversal of an overcharge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentLine {
    pub id: LineItemId,
    pub category: ChargeCategory,
    pub container: Option<ContainerNumber>,
    pub description: String,
    pub amount: DualAmount,
}

impl AdjustmentLine {
    /// A correction as requested by the operator: a positive amount that
    /// will be negated onto the credit note
    pub fn correction(
        category: ChargeCategory,
        container: Option<ContainerNumber>,
        description: impl Into<String>,
        amount: DualAmount,
    ) -> Self {
        Self {
            id: LineItemId::new(),
            category,
            container,
            description: description.into(),
            amount,
        }
    }
}

/// Financial rollups of one statement
///
/// The pending snapshot never contributes here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementTotals {
    pub storage: DualAmount,
    pub services: DualAmount,
    pub total: DualAmount,
    /// Distinct containers billed for storage
    pub containers: u32,
    pub billable_days: i64,
}

impl StatementTotals {
    pub fn zero(pair: CurrencyPair) -> Self {
        Self {
            storage: DualAmount::zero(pair),
            services: DualAmount::zero(pair),
            total: DualAmount::zero(pair),
            containers: 0,
            billable_days: 0,
        }
    }

    /// Rolls up an aggregated charge bundle
    pub fn from_bundle(bundle: &ChargeBundle, pair: CurrencyPair) -> Self {
        let storage = bundle
            .storage_items
            .iter()
            .fold(DualAmount::zero(pair), |acc, item| acc + item.amount);
        let services = bundle
            .service_items
            .iter()
            .fold(DualAmount::zero(pair), |acc, item| acc + item.amount);

        let containers = bundle
            .storage_items
            .iter()
            .map(|item| &item.container)
            .collect::<HashSet<_>>()
            .len() as u32;
        let billable_days = bundle.storage_items.iter().map(|i| i.billable_days).sum();

        Self {
            storage,
            services,
            total: storage + services,
            containers,
            billable_days,
        }
    }

    /// Rolls up credit-note adjustment lines (already signed)
    pub fn from_adjustments(lines: &[AdjustmentLine], pair: CurrencyPair) -> Self {
        let mut storage = DualAmount::zero(pair);
        let mut services = DualAmount::zero(pair);
        for line in lines {
            match line.category {
                ChargeCategory::Storage => storage = storage + line.amount,
                ChargeCategory::Service => services = services + line.amount,
            }
        }
        Self {
            storage,
            services,
            total: storage + services,
            containers: 0,
            billable_days: 0,
        }
    }
}

/// A monthly billing statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub id: StatementId,
    pub company_id: CompanyId,
    pub period: BillingPeriod,
    pub kind: StatementKind,
    pub status: StatementStatus,
    /// Assigned at finalization; unique and immutable from then on
    pub invoice_number: Option<DocumentNumber>,
    pub finalized_at: Option<DateTime<Utc>>,
    pub finalized_by: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub paid_by: Option<String>,
    /// Storage line items (invoices only)
    pub storage_items: Vec<StorageLineItem>,
    /// Service line items (invoices only)
    pub service_items: Vec<ServiceLineItem>,
    /// Correction lines (credit notes only)
    pub adjustments: Vec<AdjustmentLine>,
    /// Containers still on terminal at generation time; informational
    pub pending_snapshot: Vec<PendingContainer>,
    pub totals: StatementTotals,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Statement {
    /// Creates a draft invoice from an aggregated charge bundle
    pub fn draft_invoice(
        company_id: CompanyId,
        period: BillingPeriod,
        bundle: ChargeBundle,
        pair: CurrencyPair,
    ) -> Self {
        let now = Utc::now();
        let totals = StatementTotals::from_bundle(&bundle, pair);

        Self {
            id: StatementId::new_v7(),
            company_id,
            period,
            kind: StatementKind::Invoice,
            status: StatementStatus::Draft,
            invoice_number: None,
            finalized_at: None,
            finalized_by: None,
            paid_at: None,
            paid_by: None,
            storage_items: bundle.storage_items,
            service_items: bundle.service_items,
            adjustments: Vec::new(),
            pending_snapshot: bundle.pending,
            totals,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a credit note against a finalized or paid invoice
    ///
    /// `corrections` carry the positive amounts being reversed; they are
    /// negated onto the credit note. The credit note is born finalized:
    /// it gets its number at creation and is never mutable.
    pub fn credit_note(
        original: &Statement,
        number: DocumentNumber,
        corrections: Vec<AdjustmentLine>,
        issued_by: impl Into<String>,
    ) -> Result<Self, BillingError> {
        if !matches!(original.kind, StatementKind::Invoice) {
            return Err(BillingError::InvalidOriginalState {
                id: original.id,
                status: original.status,
            });
        }
        if !matches!(
            original.status,
            StatementStatus::Finalized | StatementStatus::Paid
        ) {
            return Err(BillingError::InvalidOriginalState {
                id: original.id,
                status: original.status,
            });
        }

        let now = Utc::now();
        let pair = original.totals.total.pair();
        let adjustments: Vec<AdjustmentLine> = corrections
            .into_iter()
            .map(|line| AdjustmentLine {
                amount: -line.amount,
                ..line
            })
            .collect();
        let totals = StatementTotals::from_adjustments(&adjustments, pair);

        Ok(Self {
            id: StatementId::new_v7(),
            company_id: original.company_id,
            period: original.period,
            kind: StatementKind::CreditNote {
                original: original.id,
            },
            status: StatementStatus::Finalized,
            invoice_number: Some(number),
            finalized_at: Some(now),
            finalized_by: Some(issued_by.into()),
            paid_at: None,
            paid_by: None,
            storage_items: Vec::new(),
            service_items: Vec::new(),
            adjustments,
            pending_snapshot: Vec::new(),
            totals,
            created_at: now,
            updated_at: now,
        })
    }

    /// The invoice this credit note corrects, if any
    pub fn original_id(&self) -> Option<StatementId> {
        match self.kind {
            StatementKind::Invoice => None,
            StatementKind::CreditNote { original } => Some(original),
        }
    }

    /// True once the statement can no longer be modified
    pub fn is_locked(&self) -> bool {
        self.status != StatementStatus::Draft
    }

    /// Replaces the line items of a draft with a freshly aggregated bundle
    ///
    /// Totals are recomputed in the same step so the two can never be
    /// observed out of sync.
    pub fn replace_line_items(&mut self, bundle: ChargeBundle) -> Result<(), BillingError> {
        if self.status != StatementStatus::Draft {
            return Err(BillingError::ImmutableStatement {
                id: self.id,
                status: self.status,
            });
        }
        let pair = self.totals.total.pair();
        self.totals = StatementTotals::from_bundle(&bundle, pair);
        self.storage_items = bundle.storage_items;
        self.service_items = bundle.service_items;
        self.pending_snapshot = bundle.pending;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Locks the draft and assigns its number
    pub fn finalize(
        &mut self,
        number: DocumentNumber,
        by: impl Into<String>,
    ) -> Result<(), BillingError> {
        match self.status {
            StatementStatus::Draft => {
                self.status = StatementStatus::Finalized;
                self.invoice_number = Some(number);
                let now = Utc::now();
                self.finalized_at = Some(now);
                self.finalized_by = Some(by.into());
                self.updated_at = now;
                Ok(())
            }
            StatementStatus::Finalized | StatementStatus::Paid => {
                Err(BillingError::AlreadyFinalized {
                    id: self.id,
                    number: self.invoice_number.expect("finalized statements are numbered"),
                })
            }
            StatementStatus::Cancelled => Err(BillingError::InvalidTransition {
                from: self.status,
                event: "finalize",
            }),
        }
    }

    /// Records payment; repeat calls are no-ops
    pub fn mark_paid(&mut self, by: impl Into<String>) -> Result<(), BillingError> {
        match self.status {
            StatementStatus::Finalized => {
                self.status = StatementStatus::Paid;
                let now = Utc::now();
                self.paid_at = Some(now);
                self.paid_by = Some(by.into());
                self.updated_at = now;
                Ok(())
            }
            StatementStatus::Paid => Ok(()),
            StatementStatus::Draft | StatementStatus::Cancelled => {
                Err(BillingError::InvalidTransition {
                    from: self.status,
                    event: "mark paid",
                })
            }
        }
    }

    /// Flips a fully reversed statement to cancelled
    ///
    /// Only the status changes; the document itself stays untouched.
    pub fn cancel(&mut self) -> Result<(), BillingError> {
        match self.status {
            StatementStatus::Finalized | StatementStatus::Paid => {
                self.status = StatementStatus::Cancelled;
                self.updated_at = Utc::now();
                Ok(())
            }
            StatementStatus::Draft | StatementStatus::Cancelled => {
                Err(BillingError::InvalidTransition {
                    from: self.status,
                    event: "cancel",
                })
            }
        }
    }
}
