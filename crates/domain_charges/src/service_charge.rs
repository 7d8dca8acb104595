//! Ad-hoc service charge records

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BillingPeriod, CompanyId, DualAmount, ServiceChargeId};

use crate::stay::ContainerNumber;

/// A one-off service charge (crane lift, weighing, repair, customs handling)
///
/// A charge belongs to the statement of the period containing its
/// `charge_date`, regardless of when the record itself was entered. The
/// comparison is date-only and half-open on the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCharge {
    pub id: ServiceChargeId,
    pub company_id: CompanyId,
    /// Container the service was performed on, if any
    pub container: Option<ContainerNumber>,
    pub description: String,
    /// The date the service was rendered
    pub charge_date: NaiveDate,
    pub amount: DualAmount,
    /// When the record was entered; informational, never used for matching
    pub recorded_at: DateTime<Utc>,
}

impl ServiceCharge {
    /// True if this charge belongs to the given statement period
    pub fn belongs_to(&self, period: BillingPeriod) -> bool {
        period.contains(self.charge_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_kernel::{Currency, DualAmount, Money};
    use rust_decimal_macros::dec;

    fn charge_on(date: NaiveDate) -> ServiceCharge {
        ServiceCharge {
            id: ServiceChargeId::new(),
            company_id: CompanyId::new(),
            container: None,
            description: "Crane lift".to_string(),
            charge_date: date,
            amount: DualAmount::new(
                Money::new(dec!(100000), Currency::UZS),
                Money::new(dec!(8.00), Currency::USD),
            ),
            // Entered months later; must not affect matching.
            recorded_at: Utc.with_ymd_and_hms(2026, 6, 1, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_matching_ignores_recording_time() {
        let march = BillingPeriod::new(2026, 3).unwrap();
        let charge = charge_on(NaiveDate::from_ymd_opt(2026, 3, 15).unwrap());
        assert!(charge.belongs_to(march));
        assert!(!charge.belongs_to(BillingPeriod::new(2026, 6).unwrap()));
    }

    #[test]
    fn test_last_day_of_month_belongs_to_that_month() {
        let march = BillingPeriod::new(2026, 3).unwrap();
        let april = BillingPeriod::new(2026, 4).unwrap();
        let charge = charge_on(NaiveDate::from_ymd_opt(2026, 3, 31).unwrap());
        assert!(charge.belongs_to(march));
        assert!(!charge.belongs_to(april));
    }
}
