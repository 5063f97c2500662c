//! Runtime configuration, resolved once at startup.

use std::collections::HashMap;

use chrono::Duration;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::constants::{DEFAULT_FREE_QUOTA, DEFAULT_MAX_DIMENSION, REQUIRED_AD_WATCH_MS};
use crate::models::Currency;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("price table has no entry for its base currency {0}")]
    MissingBasePrice(Currency),
}

/// Price table keyed by settlement currency.
///
/// A supported currency missing an entry falls back to the base currency's
/// price; unknown currency codes are rejected earlier, at parse time.
#[derive(Debug, Clone)]
pub struct PriceTable {
    base: Currency,
    prices: HashMap<Currency, Decimal>,
}

impl PriceTable {
    pub fn new(base: Currency, prices: HashMap<Currency, Decimal>) -> Result<Self, ConfigError> {
        if !prices.contains_key(&base) {
            return Err(ConfigError::MissingBasePrice(base));
        }
        Ok(Self { base, prices })
    }

    pub fn base(&self) -> Currency {
        self.base
    }

    pub fn price_for(&self, currency: Currency) -> Decimal {
        self.prices
            .get(&currency)
            .copied()
            .unwrap_or_else(|| self.prices[&self.base])
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        let mut prices = HashMap::new();
        prices.insert(Currency::Usd, Decimal::new(199, 2)); // 1.99
        prices.insert(Currency::Cny, Decimal::new(1400, 2)); // 14.00
        Self {
            base: Currency::Usd,
            prices,
        }
    }
}

/// Knobs for the gate and the removal pipeline.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Free removals granted to a fresh identity.
    pub free_quota: u32,
    /// Wall-clock watch time required before an ad view verifies.
    pub required_ad_watch: Duration,
    /// Largest dimension fed to the matte model.
    pub max_dimension: u32,
    pub prices: PriceTable,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            free_quota: DEFAULT_FREE_QUOTA,
            required_ad_watch: Duration::milliseconds(REQUIRED_AD_WATCH_MS),
            max_dimension: DEFAULT_MAX_DIMENSION,
            prices: PriceTable::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the environment, falling back to defaults.
    ///
    /// Reads `CLEARBG_FREE_QUOTA`, `CLEARBG_AD_WATCH_SECS` and
    /// `CLEARBG_MAX_DIMENSION`. Unparsable values are ignored with a warning.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        Self {
            free_quota: env_u32("CLEARBG_FREE_QUOTA").unwrap_or(defaults.free_quota),
            required_ad_watch: env_u32("CLEARBG_AD_WATCH_SECS")
                .map(|secs| Duration::seconds(secs as i64))
                .unwrap_or(defaults.required_ad_watch),
            max_dimension: env_u32("CLEARBG_MAX_DIMENSION").unwrap_or(defaults.max_dimension),
            prices: defaults.prices,
        }
    }
}

fn env_u32(name: &str) -> Option<u32> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "Ignoring unparsable environment override");
            None
        }
    }
}
