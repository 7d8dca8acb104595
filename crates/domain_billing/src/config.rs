//! Engine configuration

use core_kernel::{Currency, CurrencyPair};
use serde::Deserialize;

/// Lifecycle engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Currency the customer is invoiced in
    pub settlement_currency: Currency,
    /// Currency used for management reporting
    pub reporting_currency: Currency,
    /// Maximum seconds the batch generator spends on one company
    pub batch_company_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            settlement_currency: Currency::UZS,
            reporting_currency: Currency::USD,
            batch_company_timeout_secs: 30,
        }
    }
}

impl EngineConfig {
    /// Loads configuration from `BILLING_`-prefixed environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("BILLING"))
            .build()?
            .try_deserialize()
    }

    /// The statement currency pair
    pub fn currency_pair(&self) -> CurrencyPair {
        CurrencyPair::new(self.settlement_currency, self.reporting_currency)
    }

    pub fn batch_company_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.batch_company_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pair() {
        let config = EngineConfig::default();
        let pair = config.currency_pair();
        assert_eq!(pair.settlement, Currency::UZS);
        assert_eq!(pair.reporting, Currency::USD);
    }
}
