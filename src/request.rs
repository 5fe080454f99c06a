//! JSON request/response surface for a single projection run
//!
//! A request carries everything the pipeline needs with sensible defaults;
//! the response is the serializable result, or an error message when the run
//! was rejected.

use crate::calendar::CalendarMonth;
use crate::error::Error;
use crate::machine::{base_case_machines, MachineDefinition, MachineParams};
use crate::pipeline::run_pipeline;
use crate::portfolio::{PortfolioMonthlyRecord, PortfolioSummary, YearlyRecord};
use crate::pricing::{PriceTable, DEFAULT_BTC_PRICE, DEFAULT_ETH_PRICE};
use crate::projection::{MachineProjection, ProjectionConfig, DEFAULT_HORIZON_MONTHS};
use crate::scenario::AssumptionOverrides;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Input configuration for a projection
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectionRequest {
    /// Number of months to project (default: 36)
    #[serde(default = "default_horizon_months")]
    pub horizon_months: u32,

    /// First projected month, `YYYY-MM` (default: current month)
    #[serde(default)]
    pub start_month: Option<CalendarMonth>,

    /// ETH spot price in USD (default: 3,000)
    #[serde(default = "default_eth_price")]
    pub eth_price: f64,

    /// BTC spot price in USD (default: 90,000)
    #[serde(default = "default_btc_price")]
    pub btc_price: f64,

    /// Machines to project; the base-case set when omitted. Rate fields are
    /// required. Range checks run during handling, so an out-of-range machine
    /// becomes an error response
    #[serde(default)]
    pub machines: Option<Vec<MachineParams>>,

    /// Portfolio-wide yield/growth overrides
    #[serde(default)]
    pub overrides: AssumptionOverrides,

    /// Include each machine's native series in the response
    #[serde(default)]
    pub include_machines: bool,
}

fn default_horizon_months() -> u32 { DEFAULT_HORIZON_MONTHS }
fn default_eth_price() -> f64 { DEFAULT_ETH_PRICE }
fn default_btc_price() -> f64 { DEFAULT_BTC_PRICE }

/// Output from a projection
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_month: Option<CalendarMonth>,
    pub horizon_months: u32,
    pub machine_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<PortfolioSummary>,
    pub monthly: Vec<PortfolioMonthlyRecord>,
    pub yearly: Vec<YearlyRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machines: Option<Vec<MachineProjection>>,
    pub execution_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProjectionRequest {
    /// Parse a request from JSON text
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn resolve_machines(&self) -> Result<Vec<MachineDefinition>, Error> {
        let machines = match &self.machines {
            Some(params) => params
                .iter()
                .cloned()
                .map(MachineParams::build)
                .collect::<Result<Vec<_>, _>>()?,
            None => base_case_machines()?,
        };
        Ok(self.overrides.apply(&machines)?)
    }
}

/// Run a request, folding any failure into the response's `error` field
pub fn handle_request(request: &ProjectionRequest) -> ProjectionResponse {
    let start = Instant::now();

    match execute(request) {
        Ok(mut response) => {
            response.execution_time_ms = start.elapsed().as_millis() as u64;
            response
        }
        Err(e) => {
            log::warn!("Projection request rejected: {}", e);
            ProjectionResponse {
                horizon_months: request.horizon_months,
                execution_time_ms: start.elapsed().as_millis() as u64,
                error: Some(e.to_string()),
                ..Default::default()
            }
        }
    }
}

fn execute(request: &ProjectionRequest) -> Result<ProjectionResponse, Error> {
    let machines = request.resolve_machines()?;
    let prices = PriceTable::from_spot(request.eth_price, request.btc_price)?;
    let config = ProjectionConfig::new(
        request.horizon_months,
        request.start_month.unwrap_or_else(CalendarMonth::current),
    );

    let output = run_pipeline(&machines, &config, &prices)?;

    Ok(ProjectionResponse {
        start_month: Some(output.start_month),
        horizon_months: output.horizon_months,
        machine_count: output.machines.len(),
        summary: Some(output.summary),
        monthly: output.monthly,
        yearly: output.yearly,
        machines: request.include_machines.then_some(output.machines),
        execution_time_ms: 0,
        error: None,
    })
}
