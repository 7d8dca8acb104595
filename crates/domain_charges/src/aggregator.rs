//! Monthly charge aggregation
//!
//! Turns a company's stay and charge records into the line items of one
//! statement period. Aggregation is a pure function: given the same records
//! and the same `as_of` date it produces the same bundle, which is what
//! makes draft regeneration a safe discard-and-rebuild.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{BillingPeriod, CompanyId, LineItemId};

use crate::error::AggregationError;
use crate::line_item::{PendingContainer, ServiceLineItem, StorageLineItem};
use crate::service_charge::ServiceCharge;
use crate::stay::{ContainerNumber, ContainerStay};

/// Everything aggregation produces for one company and period
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeBundle {
    pub storage_items: Vec<StorageLineItem>,
    pub service_items: Vec<ServiceLineItem>,
    pub pending: Vec<PendingContainer>,
}

impl ChargeBundle {
    /// True if the bundle carries anything billable
    pub fn is_empty(&self) -> bool {
        self.storage_items.is_empty() && self.service_items.is_empty()
    }
}

/// Aggregates a company's charges for one statement period
///
/// Storage follows exit-month billing: only stays whose departure date
/// falls inside `period` are billed, split into one line item per calendar
/// month of the stay. Stays still open as of `as_of` feed the pending
/// snapshot instead. Service charges match on `charge_date` alone, half-open
/// on the period.
///
/// The whole run fails on inconsistent input; there is no partial output.
pub fn aggregate(
    company_id: CompanyId,
    period: BillingPeriod,
    as_of: NaiveDate,
    stays: &[ContainerStay],
    charges: &[ServiceCharge],
) -> Result<ChargeBundle, AggregationError> {
    for stay in stays {
        if stay.company_id != company_id {
            return Err(AggregationError::ForeignStay {
                stay: stay.id,
                expected: company_id,
            });
        }
        if let Some(departed) = stay.departed_on {
            if departed < stay.arrived_on {
                return Err(AggregationError::InvalidStay {
                    container: stay.container.to_string(),
                    reason: format!(
                        "departure {} precedes arrival {}",
                        departed, stay.arrived_on
                    ),
                });
            }
        }
    }
    detect_overlaps(stays)?;

    let mut storage_items = Vec::new();
    let mut pending = Vec::new();

    for stay in stays {
        if stay.is_open() {
            if let Some(entry) = pending_entry(stay, as_of) {
                pending.push(entry);
            }
            continue;
        }
        let departed = stay.departed_on.expect("closed stay");
        if !period.contains(departed) {
            continue;
        }
        let Some(span) = stay.span() else {
            // Same-day gate-in/gate-out: nothing to bill.
            continue;
        };
        for segment in span.split_by_month() {
            storage_items.push(StorageLineItem::for_segment(stay, segment));
        }
    }

    let mut service_items: Vec<ServiceLineItem> = charges
        .iter()
        .filter(|c| c.company_id == company_id && c.belongs_to(period))
        .map(|c| ServiceLineItem {
            id: LineItemId::new(),
            container: c.container.clone(),
            description: c.description.clone(),
            charge_date: c.charge_date,
            amount: c.amount,
        })
        .collect();

    storage_items.sort_by(|a, b| {
        (&a.container, a.period_start).cmp(&(&b.container, b.period_start))
    });
    service_items.sort_by(|a, b| {
        (a.charge_date, &a.description).cmp(&(b.charge_date, &b.description))
    });
    pending.sort_by(|a, b| a.container.cmp(&b.container));

    debug!(
        %company_id,
        %period,
        storage = storage_items.len(),
        services = service_items.len(),
        pending = pending.len(),
        "aggregated charges"
    );

    Ok(ChargeBundle {
        storage_items,
        service_items,
        pending,
    })
}

/// Rejects stays of the same container that overlap in time
fn detect_overlaps(stays: &[ContainerStay]) -> Result<(), AggregationError> {
    let mut by_container: HashMap<&ContainerNumber, Vec<&ContainerStay>> = HashMap::new();
    for stay in stays {
        by_container.entry(&stay.container).or_default().push(stay);
    }

    for (container, mut group) in by_container {
        group.sort_by_key(|s| s.arrived_on);
        for pair in group.windows(2) {
            if pair[1].arrived_on < pair[0].occupied_until() {
                return Err(AggregationError::OverlappingStays {
                    container: container.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Builds the pending-snapshot entry for an open stay
fn pending_entry(stay: &ContainerStay, as_of: NaiveDate) -> Option<PendingContainer> {
    if stay.arrived_on > as_of {
        return None;
    }
    let days_on_terminal = (as_of - stay.arrived_on).num_days();
    let accrued_billable =
        (days_on_terminal - i64::from(stay.free_days)).max(0);
    let estimated = stay
        .daily_rate
        .multiply(Decimal::from(accrued_billable))
        .round_to_currency();

    Some(PendingContainer {
        container: stay.container.clone(),
        size: stay.size,
        occupancy: stay.occupancy,
        arrived_on: stay.arrived_on,
        days_on_terminal,
        estimated_to_date: estimated,
    })
}

/// Companies that have any billable activity in the period
///
/// A company qualifies when it has a stay departing inside the period or a
/// service charge dated inside it. Used by the batch generator to build its
/// work list; the per-company aggregation then recomputes from scratch.
pub fn companies_with_activity(
    period: BillingPeriod,
    stays: &[ContainerStay],
    charges: &[ServiceCharge],
) -> Vec<CompanyId> {
    let mut companies: Vec<CompanyId> = stays
        .iter()
        .filter(|s| s.departed_on.map(|d| period.contains(d)).unwrap_or(false))
        .map(|s| s.company_id)
        .chain(
            charges
                .iter()
                .filter(|c| c.belongs_to(period))
                .map(|c| c.company_id),
        )
        .collect();
    companies.sort();
    companies.dedup();
    companies
}
