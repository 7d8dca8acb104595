//! Tests for Money, Currency, and DualAmount

use core_kernel::{Currency, CurrencyPair, DualAmount, Money, MoneyError};
use rust_decimal_macros::dec;

mod money {
    use super::*;

    #[test]
    fn test_creation_rounds_to_four_places() {
        let m = Money::new(dec!(10.123456), Currency::USD);
        assert_eq!(m.amount(), dec!(10.1235));
    }

    #[test]
    fn test_from_minor_units() {
        let m = Money::from_minor(57500, Currency::USD);
        assert_eq!(m.amount(), dec!(575.00));
    }

    #[test]
    fn test_round_to_currency() {
        let m = Money::new(dec!(33.3333), Currency::UZS).round_to_currency();
        assert_eq!(m.amount(), dec!(33.33));
    }

    #[test]
    fn test_bankers_rounding() {
        let m = Money::new(dec!(2.125), Currency::USD).round_bankers(2);
        assert_eq!(m.amount(), dec!(2.12));

        let m = Money::new(dec!(2.135), Currency::USD).round_bankers(2);
        assert_eq!(m.amount(), dec!(2.14));
    }

    #[test]
    fn test_sign_predicates() {
        assert!(Money::new(dec!(1), Currency::USD).is_positive());
        assert!(Money::new(dec!(-1), Currency::USD).is_negative());
        assert!(Money::zero(Currency::USD).is_zero());
        assert!(!Money::zero(Currency::USD).is_negative());
    }

    #[test]
    fn test_checked_sub_currency_mismatch() {
        let a = Money::new(dec!(10), Currency::USD);
        let b = Money::new(dec!(10), Currency::EUR);
        assert!(matches!(
            a.checked_sub(&b),
            Err(MoneyError::CurrencyMismatch(_, _))
        ));
    }

    #[test]
    fn test_multiply_by_days() {
        let daily = Money::new(dec!(4.50), Currency::USD);
        assert_eq!(daily.multiply(dec!(9)).amount(), dec!(40.50));
    }

    #[test]
    fn test_display() {
        let m = Money::new(dec!(575), Currency::USD);
        assert_eq!(m.to_string(), "USD 575.00");
    }
}

mod dual_amount {
    use super::*;

    fn dual(settlement: rust_decimal::Decimal, reporting: rust_decimal::Decimal) -> DualAmount {
        DualAmount::new(
            Money::new(settlement, Currency::UZS),
            Money::new(reporting, Currency::USD),
        )
    }

    #[test]
    fn test_component_wise_addition() {
        let total = dual(dec!(500.00), dec!(41.00)) + dual(dec!(75.00), dec!(6.50));
        assert_eq!(total.settlement.amount(), dec!(575.00));
        assert_eq!(total.reporting.amount(), dec!(47.50));
    }

    #[test]
    fn test_mixed_pair_addition_fails() {
        let a = dual(dec!(1), dec!(1));
        let b = DualAmount::new(
            Money::new(dec!(1), Currency::EUR),
            Money::new(dec!(1), Currency::USD),
        );
        assert!(a.checked_add(&b).is_err());
    }

    #[test]
    fn test_exact_reversal_sums_to_zero() {
        let original = dual(dec!(575.00), dec!(47.50));
        let reversal = -original;
        assert!(original.checked_add(&reversal).unwrap().is_zero());
    }

    #[test]
    fn test_pair_round_trips() {
        let pair = CurrencyPair::new(Currency::UZS, Currency::USD);
        let zero = DualAmount::zero(pair);
        assert_eq!(zero.pair(), pair);
    }

    #[test]
    fn test_serde_round_trip() {
        let amount = dual(dec!(123.45), dec!(9.87));
        let json = serde_json::to_string(&amount).unwrap();
        let back: DualAmount = serde_json::from_str(&json).unwrap();
        assert_eq!(amount, back);
    }
}
