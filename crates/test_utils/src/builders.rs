//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults, plus
//! a fully wired lifecycle engine over the in-memory adapters.

use std::sync::Arc;

use chrono::NaiveDate;

use core_kernel::{CompanyId, DualAmount, ServiceChargeId, StayId};
use domain_billing::{BatchGenerator, EngineConfig, LifecycleEngine};
use domain_charges::{ContainerNumber, ContainerSize, ContainerStay, Occupancy, ServiceCharge};
use infra_db::{MemoryChargeSource, MemorySequenceAllocator, MemoryStatementStore};

use crate::fixtures::{MoneyFixtures, PeriodFixtures};

/// Builder for container stay records
pub struct StayBuilder {
    company_id: CompanyId,
    container: ContainerNumber,
    size: ContainerSize,
    occupancy: Occupancy,
    arrived_on: NaiveDate,
    departed_on: Option<NaiveDate>,
    free_days: u32,
    daily_rate: DualAmount,
}

impl StayBuilder {
    pub fn new(company_id: CompanyId) -> Self {
        Self {
            company_id,
            container: ContainerNumber::new("MSKU1234567").expect("valid container"),
            size: ContainerSize::Forty,
            occupancy: Occupancy::Laden,
            arrived_on: PeriodFixtures::date(2026, 3, 1),
            departed_on: Some(PeriodFixtures::date(2026, 3, 11)),
            free_days: 0,
            daily_rate: MoneyFixtures::daily_rate(),
        }
    }

    pub fn container(mut self, number: &str) -> Self {
        self.container = ContainerNumber::new(number).expect("valid container");
        self
    }

    pub fn size(mut self, size: ContainerSize) -> Self {
        self.size = size;
        self
    }

    pub fn occupancy(mut self, occupancy: Occupancy) -> Self {
        self.occupancy = occupancy;
        self
    }

    pub fn arrived(mut self, date: NaiveDate) -> Self {
        self.arrived_on = date;
        self
    }

    pub fn departed(mut self, date: NaiveDate) -> Self {
        self.departed_on = Some(date);
        self
    }

    pub fn still_on_terminal(mut self) -> Self {
        self.departed_on = None;
        self
    }

    pub fn free_days(mut self, days: u32) -> Self {
        self.free_days = days;
        self
    }

    pub fn daily_rate(mut self, rate: DualAmount) -> Self {
        self.daily_rate = rate;
        self
    }

    pub fn build(self) -> ContainerStay {
        ContainerStay {
            id: StayId::new(),
            company_id: self.company_id,
            container: self.container,
            size: self.size,
            occupancy: self.occupancy,
            arrived_on: self.arrived_on,
            departed_on: self.departed_on,
            free_days: self.free_days,
            daily_rate: self.daily_rate,
        }
    }
}

/// Builder for service charge records
pub struct ServiceChargeBuilder {
    company_id: CompanyId,
    container: Option<ContainerNumber>,
    description: String,
    charge_date: NaiveDate,
    amount: DualAmount,
}

impl ServiceChargeBuilder {
    pub fn new(company_id: CompanyId) -> Self {
        Self {
            company_id,
            container: None,
            description: "Crane lift".to_string(),
            charge_date: PeriodFixtures::date(2026, 3, 10),
            amount: MoneyFixtures::dual(
                rust_decimal_macros::dec!(100000),
                rust_decimal_macros::dec!(8.00),
            ),
        }
    }

    pub fn container(mut self, number: &str) -> Self {
        self.container = Some(ContainerNumber::new(number).expect("valid container"));
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.charge_date = date;
        self
    }

    pub fn amount(mut self, amount: DualAmount) -> Self {
        self.amount = amount;
        self
    }

    pub fn build(self) -> ServiceCharge {
        ServiceCharge {
            id: ServiceChargeId::new(),
            company_id: self.company_id,
            container: self.container,
            description: self.description,
            charge_date: self.charge_date,
            amount: self.amount,
            recorded_at: PeriodFixtures::recorded_at(),
        }
    }
}

/// A lifecycle engine wired over the in-memory adapters
///
/// Keeps the adapters reachable so tests can seed data and inspect state
/// next to driving the engine.
pub struct TestEngine {
    pub engine: LifecycleEngine,
    pub store: Arc<MemoryStatementStore>,
    pub allocator: Arc<MemorySequenceAllocator>,
    pub charges: Arc<MemoryChargeSource>,
}

impl TestEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig {
            settlement_currency: core_kernel::Currency::UZS,
            reporting_currency: core_kernel::Currency::USD,
            batch_company_timeout_secs: 5,
        })
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let store = Arc::new(MemoryStatementStore::new());
        let allocator = Arc::new(MemorySequenceAllocator::new());
        let charges = Arc::new(MemoryChargeSource::new());
        let engine = LifecycleEngine::new(
            store.clone(),
            allocator.clone(),
            charges.clone(),
            config,
        );
        Self {
            engine,
            store,
            allocator,
            charges,
        }
    }

    /// A batch generator over the same engine
    pub fn batch(&self) -> BatchGenerator {
        BatchGenerator::new(self.engine.clone())
    }
}

impl Default for TestEngine {
    fn default() -> Self {
        Self::new()
    }
}
