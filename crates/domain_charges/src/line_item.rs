//! Statement line items produced by aggregation
//!
//! Line items are owned exclusively by one statement. They are created at
//! draft generation and never mutated once the statement is finalized.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{DateSpan, DualAmount, LineItemId};

use crate::stay::{ContainerNumber, ContainerSize, ContainerStay, Occupancy};

/// One month-segment of a billed container stay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageLineItem {
    pub id: LineItemId,
    pub container: ContainerNumber,
    pub size: ContainerSize,
    pub occupancy: Occupancy,
    /// Segment start (inclusive)
    pub period_start: NaiveDate,
    /// Segment end (exclusive)
    pub period_end: NaiveDate,
    /// Free-day allowance consumed inside this segment
    pub free_days: u32,
    /// `max(0, days in segment - free days)`
    pub billable_days: i64,
    pub daily_rate: DualAmount,
    pub amount: DualAmount,
}

impl StorageLineItem {
    /// Builds the line item for one month-segment of a stay
    ///
    /// `segment` must lie within the stay's span; the billable part is the
    /// overlap of the segment with the stay's billable span.
    pub(crate) fn for_segment(stay: &ContainerStay, segment: DateSpan) -> Self {
        let billable_days = stay
            .billable_span()
            .and_then(|b| b.intersect(&segment))
            .map(|s| s.days())
            .unwrap_or(0);
        let free_days = (segment.days() - billable_days) as u32;
        let amount = stay
            .daily_rate
            .multiply(Decimal::from(billable_days))
            .round_to_currency();

        Self {
            id: LineItemId::new(),
            container: stay.container.clone(),
            size: stay.size,
            occupancy: stay.occupancy,
            period_start: segment.start,
            period_end: segment.end,
            free_days,
            billable_days,
            daily_rate: stay.daily_rate,
            amount,
        }
    }

    /// Days covered by this segment, billable or not
    pub fn days_in_period(&self) -> i64 {
        (self.period_end - self.period_start).num_days()
    }
}

/// One ad-hoc service charge on a statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLineItem {
    pub id: LineItemId,
    pub container: Option<ContainerNumber>,
    pub description: String,
    pub charge_date: NaiveDate,
    pub amount: DualAmount,
}

/// A container still on terminal at aggregation time
///
/// Informational only: pending containers are shown on the statement but
/// excluded from every total. The estimate uses the stay's current rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingContainer {
    pub container: ContainerNumber,
    pub size: ContainerSize,
    pub occupancy: Occupancy,
    pub arrived_on: NaiveDate,
    /// Days accumulated from arrival to the aggregation date
    pub days_on_terminal: i64,
    /// Accrued storage estimate at current rates
    pub estimated_to_date: DualAmount,
}
