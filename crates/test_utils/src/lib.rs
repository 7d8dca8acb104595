//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! billing engine test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data for common entities
//! - `builders`: Builder patterns for stays, charges, and a wired engine
//! - `generators`: Fake-data generators for names and container numbers
//! - `database`: Postgres testcontainer management for repository tests
//! - `telemetry`: Tracing initialization for tests

pub mod fixtures;
pub mod builders;
pub mod generators;
pub mod database;
pub mod telemetry;

pub use fixtures::*;
pub use builders::*;
pub use generators::*;
pub use database::*;
