//! Core Kernel - Foundational types for the terminal billing system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic, carried in two denominations
//! - Billing periods and half-open date spans
//! - Common identifiers and value objects

pub mod money;
pub mod period;
pub mod identifiers;
pub mod error;

pub use money::{Money, Currency, CurrencyPair, DualAmount, MoneyError};
pub use period::{BillingPeriod, DateSpan, PeriodError};
pub use identifiers::{
    StatementId, CompanyId, LineItemId, StayId, ServiceChargeId, BatchRunId,
};
pub use error::CoreError;
