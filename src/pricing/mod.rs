//! Currencies, spot prices and USD conversion

mod currency;
mod converter;

pub use currency::Currency;
pub use converter::{CurrencyConverter, PriceTable, DEFAULT_BTC_PRICE, DEFAULT_ETH_PRICE};
