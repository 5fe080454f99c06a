//! Currencies a machine can be denominated in

use crate::error::PricingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Native denomination of a machine
///
/// Serialized as its upper-case code; any case is accepted when reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Currency {
    Usd,
    Eth,
    Btc,
}

impl Currency {
    /// All supported currencies, in reporting order
    pub const ALL: [Currency; 3] = [Currency::Usd, Currency::Eth, Currency::Btc];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eth => "ETH",
            Currency::Btc => "BTC",
        }
    }

    /// USD is the quote currency and never needs a price
    pub fn is_quote(&self) -> bool {
        matches!(self, Currency::Usd)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "ETH" => Ok(Currency::Eth),
            "BTC" => Ok(Currency::Btc),
            _ => Err(PricingError::UnknownCurrency(s.to_string())),
        }
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.code().to_string()
    }
}

impl TryFrom<String> for Currency {
    type Error = PricingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
