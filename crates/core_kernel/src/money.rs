//! Money types with precise decimal arithmetic
//!
//! This module provides a type-safe representation of monetary values
//! using rust_decimal for precise calculations without floating-point errors.
//! Statement figures are carried in two denominations at once (settlement
//! and reporting currency); exchange rates are applied upstream by the
//! pricing collaborator, never here.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub, Mul, Neg};
use thiserror::Error;

/// Currency codes following ISO 4217
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    CHF,
    UZS,
}

impl Currency {
    /// Returns the number of decimal places for this currency
    pub fn decimal_places(&self) -> u32 {
        2
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::CHF => "CHF",
            Currency::UZS => "UZS",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: cannot operate on {0} and {1}")]
    CurrencyMismatch(String, String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

/// A monetary amount with associated currency
///
/// Money uses rust_decimal for precise arithmetic without floating-point
/// errors. Amounts are stored with 4 decimal places internally so that
/// per-day rate multiplications survive rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: amount.round_dp(4),
            currency,
        }
    }

    /// Creates Money from an integer amount in minor units (e.g., cents)
    pub fn from_minor(minor_units: i64, currency: Currency) -> Self {
        let divisor = Decimal::new(10_i64.pow(currency.decimal_places()), 0);
        Self::new(Decimal::new(minor_units, 0) / divisor, currency)
    }

    /// Creates a zero amount in the specified currency
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: dec!(0),
            currency,
        }
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is positive
    pub fn is_positive(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Returns the absolute value
    pub fn abs(&self) -> Self {
        Self {
            amount: self.amount.abs(),
            currency: self.currency,
        }
    }

    /// Rounds to the currency's standard decimal places
    pub fn round_to_currency(&self) -> Self {
        Self {
            amount: self.amount.round_dp(self.currency.decimal_places()),
            currency: self.currency,
        }
    }

    /// Rounds using banker's rounding (round half to even)
    pub fn round_bankers(&self, dp: u32) -> Self {
        Self {
            amount: self.amount.round_dp_with_strategy(
                dp,
                rust_decimal::RoundingStrategy::MidpointNearestEven,
            ),
            currency: self.currency,
        }
    }

    /// Checked addition that returns an error on currency mismatch
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        Ok(Self::new(self.amount + other.amount, self.currency))
    }

    /// Checked subtraction that returns an error on currency mismatch
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        Ok(Self::new(self.amount - other.amount, self.currency))
    }

    /// Multiplies by a scalar (e.g., billable days)
    pub fn multiply(&self, factor: Decimal) -> Self {
        Self::new(self.amount * factor, self.currency)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dp = self.currency.decimal_places();
        write!(
            f,
            "{} {:.dp$}",
            self.currency.code(),
            self.amount,
            dp = dp as usize
        )
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.checked_add(&other)
            .expect("Currency mismatch in Money::add")
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.checked_sub(&other)
            .expect("Currency mismatch in Money::sub")
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.amount, self.currency)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, factor: Decimal) -> Self {
        self.multiply(factor)
    }
}

/// The two denominations a statement is carried in
///
/// Settlement is the currency the customer is invoiced in; reporting is the
/// denomination used for management reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub settlement: Currency,
    pub reporting: Currency,
}

impl CurrencyPair {
    pub fn new(settlement: Currency, reporting: Currency) -> Self {
        Self { settlement, reporting }
    }
}

impl Default for CurrencyPair {
    fn default() -> Self {
        Self {
            settlement: Currency::UZS,
            reporting: Currency::USD,
        }
    }
}

/// A monetary figure carried simultaneously in the settlement and the
/// reporting denomination
///
/// Arithmetic is component-wise and currency-checked. The two components
/// are independent figures supplied by the pricing collaborator; no
/// conversion between them ever happens inside this system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualAmount {
    pub settlement: Money,
    pub reporting: Money,
}

impl DualAmount {
    pub fn new(settlement: Money, reporting: Money) -> Self {
        Self { settlement, reporting }
    }

    /// Creates a zero amount for the given currency pair
    pub fn zero(pair: CurrencyPair) -> Self {
        Self {
            settlement: Money::zero(pair.settlement),
            reporting: Money::zero(pair.reporting),
        }
    }

    /// Returns the currency pair of this amount
    pub fn pair(&self) -> CurrencyPair {
        CurrencyPair {
            settlement: self.settlement.currency(),
            reporting: self.reporting.currency(),
        }
    }

    /// Returns true if both components are zero
    pub fn is_zero(&self) -> bool {
        self.settlement.is_zero() && self.reporting.is_zero()
    }

    /// Component-wise checked addition
    pub fn checked_add(&self, other: &DualAmount) -> Result<DualAmount, MoneyError> {
        Ok(Self {
            settlement: self.settlement.checked_add(&other.settlement)?,
            reporting: self.reporting.checked_add(&other.reporting)?,
        })
    }

    /// Component-wise checked subtraction
    pub fn checked_sub(&self, other: &DualAmount) -> Result<DualAmount, MoneyError> {
        Ok(Self {
            settlement: self.settlement.checked_sub(&other.settlement)?,
            reporting: self.reporting.checked_sub(&other.reporting)?,
        })
    }

    /// Multiplies both components by a scalar
    pub fn multiply(&self, factor: Decimal) -> Self {
        Self {
            settlement: self.settlement.multiply(factor),
            reporting: self.reporting.multiply(factor),
        }
    }

    /// Rounds both components to their currency's standard decimal places
    pub fn round_to_currency(&self) -> Self {
        Self {
            settlement: self.settlement.round_to_currency(),
            reporting: self.reporting.round_to_currency(),
        }
    }
}

impl Add for DualAmount {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.checked_add(&other)
            .expect("Currency mismatch in DualAmount::add")
    }
}

impl Sub for DualAmount {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.checked_sub(&other)
            .expect("Currency mismatch in DualAmount::sub")
    }
}

impl Neg for DualAmount {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            settlement: -self.settlement,
            reporting: -self.reporting,
        }
    }
}

impl fmt::Display for DualAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.settlement, self.reporting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(amount: Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    #[test]
    fn test_money_arithmetic() {
        let a = usd(dec!(100.00));
        let b = usd(dec!(50.00));

        assert_eq!((a + b).amount(), dec!(150.00));
        assert_eq!((a - b).amount(), dec!(50.00));
        assert_eq!((-a).amount(), dec!(-100.00));
    }

    #[test]
    fn test_currency_mismatch() {
        let usd = Money::new(dec!(100.00), Currency::USD);
        let uzs = Money::new(dec!(100.00), Currency::UZS);

        let result = usd.checked_add(&uzs);
        assert!(matches!(result, Err(MoneyError::CurrencyMismatch(_, _))));
    }

    #[test]
    fn test_dual_amount_negation() {
        let amount = DualAmount::new(
            Money::new(dec!(575.00), Currency::UZS),
            Money::new(dec!(47.50), Currency::USD),
        );
        let negated = -amount;

        assert_eq!(negated.settlement.amount(), dec!(-575.00));
        assert_eq!(negated.reporting.amount(), dec!(-47.50));
        assert!(amount.checked_add(&negated).unwrap().is_zero());
    }

    #[test]
    fn test_dual_amount_zero() {
        let zero = DualAmount::zero(CurrencyPair::default());
        assert!(zero.is_zero());
        assert_eq!(zero.settlement.currency(), Currency::UZS);
        assert_eq!(zero.reporting.currency(), Currency::USD);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn money_addition_is_commutative(
            a in -1_000_000i64..1_000_000i64,
            b in -1_000_000i64..1_000_000i64
        ) {
            let ma = Money::from_minor(a, Currency::USD);
            let mb = Money::from_minor(b, Currency::USD);

            prop_assert_eq!(ma + mb, mb + ma);
        }

        #[test]
        fn money_negation_round_trips(a in -1_000_000i64..1_000_000i64) {
            let m = Money::from_minor(a, Currency::UZS);
            prop_assert_eq!(-(-m), m);
        }
    }
}
