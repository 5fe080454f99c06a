//! Projection engine for per-machine monthly series

mod state;
mod engine;
mod records;

pub use state::ProjectionState;
pub use engine::{ProjectionEngine, ProjectionConfig, DEFAULT_HORIZON_MONTHS};
pub use records::{MachineProjection, MachineSummary, MonthlyRecord};
