//! Makina Revenue - projection engine for multi-currency asset-management strategies
//!
//! This library provides:
//! - Validated machine definitions, loaded from CSV/JSON or the built-in base case
//! - Per-machine monthly AUM and fee projections (linear growth, launch gating)
//! - USD consolidation at fixed spot prices with per-currency breakdowns
//! - Calendar-year rollups and headline dashboard metrics
//! - Scenarios with portfolio-wide overrides and parallel price-grid runs

pub mod calendar;
pub mod error;
pub mod machine;
pub mod output;
pub mod pipeline;
pub mod portfolio;
pub mod pricing;
pub mod projection;
pub mod request;
pub mod scenario;

// Re-export commonly used types
pub use calendar::CalendarMonth;
pub use error::{Error, Result};
pub use machine::{MachineDefinition, MachineParams};
pub use pipeline::{run_pipeline, PipelineOutput};
pub use portfolio::{PortfolioAggregator, PortfolioMonthlyRecord, YearlyRecord, YearlyRollup};
pub use pricing::{Currency, CurrencyConverter, PriceTable};
pub use projection::{MachineProjection, MonthlyRecord, ProjectionConfig, ProjectionEngine};
pub use scenario::{AssumptionOverrides, Scenario, ScenarioRunner};
