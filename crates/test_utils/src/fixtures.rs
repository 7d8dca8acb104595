//! Pre-built Test Fixtures
//!
//! Ready-to-use test data, consistent and predictable across the suite.

use chrono::{NaiveDate, TimeZone, Utc};
use core_kernel::{BillingPeriod, Currency, CurrencyPair, DualAmount, Money};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fixture for monetary test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// The statement currency pair used throughout the suite
    pub fn pair() -> CurrencyPair {
        CurrencyPair::new(Currency::UZS, Currency::USD)
    }

    /// A dual amount with the given components
    pub fn dual(settlement: Decimal, reporting: Decimal) -> DualAmount {
        DualAmount::new(
            Money::new(settlement, Currency::UZS),
            Money::new(reporting, Currency::USD),
        )
    }

    /// A dual amount where both components carry the same figure in USD;
    /// convenient when a test only cares about one number
    pub fn flat_usd(amount: Decimal) -> DualAmount {
        DualAmount::new(
            Money::new(amount, Currency::USD),
            Money::new(amount, Currency::USD),
        )
    }

    /// Standard storage rate: 60 000 soʻm / 5.00 USD per day
    pub fn daily_rate() -> DualAmount {
        Self::dual(dec!(60000), dec!(5.00))
    }
}

/// Fixture for period test data
pub struct PeriodFixtures;

impl PeriodFixtures {
    /// The statement period most tests bill: March 2026
    pub fn march() -> BillingPeriod {
        BillingPeriod::new(2026, 3).expect("valid month")
    }

    pub fn april() -> BillingPeriod {
        BillingPeriod::new(2026, 4).expect("valid month")
    }

    /// Generation date for March statements: April 1st
    pub fn march_generation_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 1).expect("valid date")
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    /// A fixed recording timestamp for charge records
    pub fn recorded_at() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single().expect("valid timestamp")
    }
}
