//! Portfolio consolidation: monthly USD totals, yearly rollup, headline metrics

mod aggregator;
mod rollup;
mod summary;

pub use aggregator::{CurrencyBreakdown, MachineUsdRecord, PortfolioAggregator, PortfolioMonthlyRecord};
pub use rollup::{YearlyRecord, YearlyRollup};
pub use summary::PortfolioSummary;
