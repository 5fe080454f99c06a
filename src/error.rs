//! Error types for machine validation, pricing, aggregation and loading

use crate::pricing::Currency;
use thiserror::Error;

/// A machine definition failed its range checks
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("machine name must not be empty")]
    EmptyName,

    #[error("{field} must be within [0, 1], got {value}")]
    RateOutOfRange { field: &'static str, value: f64 },

    #[error("monthly_growth_rate must be >= -1, got {0}")]
    GrowthRateOutOfRange(f64),

    #[error("initial_aum must be >= 0, got {0}")]
    NegativeAum(f64),

    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },

    #[error("machine '{0}' already exists")]
    DuplicateName(String),

    #[error("machine '{0}' not found")]
    UnknownMachine(String),
}

/// Currency parsing and USD conversion failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    #[error("unknown currency code '{0}'")]
    UnknownCurrency(String),

    #[error("no USD price supplied for {0}")]
    MissingPrice(Currency),

    #[error("price for {currency} must be a positive finite number, got {price}")]
    InvalidPrice { currency: Currency, price: f64 },

    #[error("USD is the quote currency and cannot carry a price")]
    QuoteCurrencyPrice,
}

/// Per-machine series could not be combined
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregationError {
    #[error("machine '{machine}' has {found} months, expected {expected}")]
    HorizonMismatch {
        machine: String,
        expected: usize,
        found: usize,
    },

    #[error("machine '{machine}' starts at {found}, expected {expected}")]
    StartMonthMismatch {
        machine: String,
        expected: String,
        found: String,
    },

    #[error("machine '{machine}' record {index} is for {found}, expected {expected}")]
    MisalignedMonth {
        machine: String,
        index: usize,
        expected: String,
        found: String,
    },

    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Reading machine definitions or writing reports failed
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("row {row}: {source}")]
    InvalidRow {
        row: usize,
        #[source]
        source: ValidationError,
    },

    #[error("row {row}: {source}")]
    InvalidCurrency {
        row: usize,
        #[source]
        source: PricingError,
    },

    #[error("row {row}: invalid launch date '{value}' (expected YYYY-MM-DD or YYYY-MM)")]
    InvalidLaunchDate { row: usize, value: String },

    #[error("unsupported file extension for '{0}' (expected .csv or .json)")]
    UnsupportedFormat(String),
}

/// Any failure surfaced by the library
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error(transparent)]
    Load(#[from] LoadError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
