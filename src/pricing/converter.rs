//! Spot price table and native-to-USD conversion
//!
//! Prices are scalars held constant across the whole projection horizon.

use super::Currency;
use crate::error::PricingError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default ETH spot price used by the base case (USD)
pub const DEFAULT_ETH_PRICE: f64 = 3000.0;

/// Default BTC spot price used by the base case (USD)
pub const DEFAULT_BTC_PRICE: f64 = 90000.0;

/// USD prices for the non-USD currencies
///
/// Every stored price is finite and strictly positive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Currency, f64>", into = "BTreeMap<Currency, f64>")]
pub struct PriceTable {
    prices: BTreeMap<Currency, f64>,
}

impl PriceTable {
    /// Empty table: only USD amounts can be converted
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with both crypto prices set
    pub fn from_spot(eth_price: f64, btc_price: f64) -> Result<Self, PricingError> {
        Self::new()
            .with_price(Currency::Eth, eth_price)?
            .with_price(Currency::Btc, btc_price)
    }

    /// Base-case prices (ETH 3,000 / BTC 90,000)
    pub fn base_case() -> Self {
        let mut prices = BTreeMap::new();
        prices.insert(Currency::Eth, DEFAULT_ETH_PRICE);
        prices.insert(Currency::Btc, DEFAULT_BTC_PRICE);
        Self { prices }
    }

    pub fn with_price(mut self, currency: Currency, price: f64) -> Result<Self, PricingError> {
        self.set(currency, price)?;
        Ok(self)
    }

    /// Set or replace the USD price of `currency`
    pub fn set(&mut self, currency: Currency, price: f64) -> Result<(), PricingError> {
        if currency.is_quote() {
            return Err(PricingError::QuoteCurrencyPrice);
        }
        if !price.is_finite() || price <= 0.0 {
            return Err(PricingError::InvalidPrice { currency, price });
        }
        self.prices.insert(currency, price);
        Ok(())
    }

    pub fn get(&self, currency: Currency) -> Option<f64> {
        self.prices.get(&currency).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl TryFrom<BTreeMap<Currency, f64>> for PriceTable {
    type Error = PricingError;

    fn try_from(map: BTreeMap<Currency, f64>) -> Result<Self, Self::Error> {
        let mut table = PriceTable::new();
        for (currency, price) in map {
            table.set(currency, price)?;
        }
        Ok(table)
    }
}

impl From<PriceTable> for BTreeMap<Currency, f64> {
    fn from(table: PriceTable) -> Self {
        table.prices
    }
}

/// Converts native-currency amounts to USD at fixed spot prices
#[derive(Debug, Clone)]
pub struct CurrencyConverter {
    prices: PriceTable,
}

impl CurrencyConverter {
    pub fn new(prices: PriceTable) -> Self {
        Self { prices }
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    /// USD value of one unit of `currency`
    pub fn rate(&self, currency: Currency) -> Result<f64, PricingError> {
        if currency.is_quote() {
            return Ok(1.0);
        }
        self.prices
            .get(currency)
            .ok_or(PricingError::MissingPrice(currency))
    }

    /// Convert `amount` denominated in `currency` to USD
    pub fn to_usd(&self, amount: f64, currency: Currency) -> Result<f64, PricingError> {
        Ok(amount * self.rate(currency)?)
    }

    /// Convert an amount whose currency is given as a raw code
    pub fn to_usd_code(&self, amount: f64, code: &str) -> Result<f64, PricingError> {
        self.to_usd(amount, code.parse()?)
    }
}
