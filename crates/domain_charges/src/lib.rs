//! Charges Domain - storage stays, service charges, and monthly aggregation
//!
//! This crate owns the charge side of the billing system: the container
//! stay records and ad-hoc service charges a terminal accumulates, and the
//! aggregator that turns them into the line items of one company's monthly
//! statement.
//!
//! # Billing model
//!
//! Storage follows exit-month billing: a stay is billed on the statement of
//! the month the container leaves the terminal. The billed span is split at
//! calendar-month boundaries into one line item per month, with the
//! free-day allowance consumed from the earliest days of the stay.
//! Containers still on terminal are reported in an informational pending
//! snapshot and are never part of statement totals.
//!
//! Aggregation is a pure function of its inputs; the "as of" date is an
//! explicit parameter, so regenerating a draft over unchanged data yields
//! an identical result.

pub mod stay;
pub mod service_charge;
pub mod line_item;
pub mod aggregator;
pub mod error;

pub use stay::{ContainerNumber, ContainerSize, Occupancy, ContainerStay};
pub use service_charge::ServiceCharge;
pub use line_item::{StorageLineItem, ServiceLineItem, PendingContainer};
pub use aggregator::{aggregate, ChargeBundle};
pub use error::AggregationError;
