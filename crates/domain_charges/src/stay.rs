//! Container stay records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{CompanyId, DateSpan, DualAmount, StayId};

use crate::error::AggregationError;

/// An ISO 6346 container number: four letters followed by seven digits
///
/// Only the shape is validated; the check digit is owned by the gate-in
/// system that produced the record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ContainerNumber(String);

impl ContainerNumber {
    pub fn new(raw: impl Into<String>) -> Result<Self, AggregationError> {
        let raw = raw.into().trim().to_ascii_uppercase();
        let valid = raw.len() == 11
            && raw[..4].chars().all(|c| c.is_ascii_uppercase())
            && raw[4..].chars().all(|c| c.is_ascii_digit());
        if !valid {
            return Err(AggregationError::InvalidContainerNumber(raw));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContainerNumber {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Container size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerSize {
    /// 20-foot
    Twenty,
    /// 40-foot
    Forty,
    /// 45-foot high cube
    FortyFive,
}

impl ContainerSize {
    pub fn feet(&self) -> u8 {
        match self {
            ContainerSize::Twenty => 20,
            ContainerSize::Forty => 40,
            ContainerSize::FortyFive => 45,
        }
    }
}

/// Whether the container is carrying cargo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occupancy {
    Laden,
    Empty,
}

/// One container's stay on the terminal
///
/// A stay runs from gate-in to gate-out. While `departed_on` is `None` the
/// container is still on site; such stays are never billed, they only feed
/// the pending snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerStay {
    pub id: StayId,
    pub company_id: CompanyId,
    pub container: ContainerNumber,
    pub size: ContainerSize,
    pub occupancy: Occupancy,
    /// Gate-in date (inclusive)
    pub arrived_on: NaiveDate,
    /// Gate-out date (exclusive), `None` while still on terminal
    pub departed_on: Option<NaiveDate>,
    /// Free storage days granted at the start of the stay
    pub free_days: u32,
    /// Storage rate per billable day
    pub daily_rate: DualAmount,
}

impl ContainerStay {
    /// The stay's occupied span, if it has closed with at least one day
    pub fn span(&self) -> Option<DateSpan> {
        let departed = self.departed_on?;
        DateSpan::new(self.arrived_on, departed).ok()
    }

    /// The span that remains billable once the free-day allowance is
    /// consumed from the start of the stay
    pub fn billable_span(&self) -> Option<DateSpan> {
        let span = self.span()?;
        let billable_from = self.arrived_on + chrono::Days::new(u64::from(self.free_days));
        DateSpan::new(billable_from.max(span.start), span.end).ok()
    }

    /// True if the container is still on terminal
    pub fn is_open(&self) -> bool {
        self.departed_on.is_none()
    }

    /// The span this stay occupies for overlap checks; open stays extend
    /// past any recorded date
    pub(crate) fn occupied_until(&self) -> NaiveDate {
        self.departed_on.unwrap_or(NaiveDate::MAX)
    }
}
