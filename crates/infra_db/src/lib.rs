//! Infrastructure Database Layer
//!
//! Persistence adapters for the billing engine. Each of the three domain
//! ports (statement store, sequence allocator, charge source) has two
//! implementations:
//!
//! - PostgreSQL adapters under [`repositories`], built on SQLx with
//!   transactional writes and row-level compare-and-set transitions;
//! - in-memory adapters under [`memory`], used by the test suite and local
//!   tooling.
//!
//! The statement store enforces the immutability invariant centrally: a
//! non-draft statement only changes through the specific lifecycle
//! transitions, and line items are always written atomically with their
//! recomputed totals.

pub mod pool;
pub mod error;
pub mod memory;
pub mod repositories;

pub use pool::{DatabasePool, create_pool, run_migrations, DatabaseConfig};
pub use error::DatabaseError;
pub use memory::{MemoryChargeSource, MemorySequenceAllocator, MemoryStatementStore};
pub use repositories::{PgChargeSource, PgSequenceAllocator, PgStatementStore};
