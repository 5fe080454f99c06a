//! Scenarios and the runner for repeated projections
//!
//! A scenario is a named price table plus the machines it projects. The
//! runner holds the projection config once and reruns the full pipeline for
//! whatever scenario, override set or price grid it is handed.

use crate::error::{Error, ValidationError};
use crate::machine::{base_case_machines, MachineDefinition, MachineParams};
use crate::pipeline::{run_pipeline, PipelineOutput};
use crate::pricing::{Currency, PriceTable};
use crate::projection::ProjectionConfig;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Default yield APR applied to ETH machines by the base-case overrides
pub const DEFAULT_YIELD_ETH: f64 = 0.05;
/// Default yield APR applied to USD machines by the base-case overrides
pub const DEFAULT_YIELD_USD: f64 = 0.08;
/// Default yield APR applied to BTC machines by the base-case overrides
pub const DEFAULT_YIELD_BTC: f64 = 0.03;
/// Default monthly subscription growth applied to every machine
pub const DEFAULT_SUBSCRIPTION_GROWTH: f64 = 0.10;

/// Portfolio-wide assumptions that replace per-machine values
///
/// Unset fields leave the machine's own value alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssumptionOverrides {
    pub yield_eth: Option<f64>,
    pub yield_usd: Option<f64>,
    pub yield_btc: Option<f64>,
    pub monthly_growth_rate: Option<f64>,
}

impl AssumptionOverrides {
    /// The base-case yield and growth assumptions
    pub fn base_case() -> Self {
        Self {
            yield_eth: Some(DEFAULT_YIELD_ETH),
            yield_usd: Some(DEFAULT_YIELD_USD),
            yield_btc: Some(DEFAULT_YIELD_BTC),
            monthly_growth_rate: Some(DEFAULT_SUBSCRIPTION_GROWTH),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    fn yield_for(&self, currency: Currency) -> Option<f64> {
        match currency {
            Currency::Usd => self.yield_usd,
            Currency::Eth => self.yield_eth,
            Currency::Btc => self.yield_btc,
        }
    }

    /// Rebuild every machine with the overrides applied
    ///
    /// Results are revalidated, so an out-of-range override is rejected.
    pub fn apply(&self, machines: &[MachineDefinition]) -> Result<Vec<MachineDefinition>, ValidationError> {
        machines
            .iter()
            .map(|machine| {
                let mut params: MachineParams = machine.to_params();
                if let Some(apr) = self.yield_for(params.currency) {
                    params.yield_apr = apr;
                }
                if let Some(growth) = self.monthly_growth_rate {
                    params.monthly_growth_rate = growth;
                }
                params.build()
            })
            .collect()
    }
}

/// Prices and machines captured for a later restore
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSnapshot {
    pub prices: PriceTable,
    pub machines: Vec<MachineDefinition>,
}

/// A named price table and its machine collection
///
/// Machine names are unique within a scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    pub name: String,
    prices: PriceTable,
    machines: Vec<MachineDefinition>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, prices: PriceTable) -> Self {
        Self {
            name: name.into(),
            prices,
            machines: Vec::new(),
        }
    }

    /// Build a scenario from an existing machine list, rejecting duplicate names
    pub fn with_machines(
        name: impl Into<String>,
        prices: PriceTable,
        machines: Vec<MachineDefinition>,
    ) -> Result<Self, ValidationError> {
        let mut scenario = Self::new(name, prices);
        for machine in machines {
            scenario.add_machine(machine)?;
        }
        Ok(scenario)
    }

    /// "Base Case": base-case machines at ETH 3,000 / BTC 90,000
    pub fn base_case() -> Result<Self, ValidationError> {
        Self::with_machines("Base Case", PriceTable::base_case(), base_case_machines()?)
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    pub fn set_prices(&mut self, prices: PriceTable) {
        self.prices = prices;
    }

    pub fn machines(&self) -> &[MachineDefinition] {
        &self.machines
    }

    pub fn machine(&self, name: &str) -> Option<&MachineDefinition> {
        self.machines.iter().find(|m| m.name() == name)
    }

    pub fn add_machine(&mut self, machine: MachineDefinition) -> Result<(), ValidationError> {
        if self.machine(machine.name()).is_some() {
            return Err(ValidationError::DuplicateName(machine.name().to_string()));
        }
        self.machines.push(machine);
        Ok(())
    }

    /// Replace the machine called `name`, keeping its position
    pub fn replace_machine(&mut self, name: &str, machine: MachineDefinition) -> Result<(), ValidationError> {
        if machine.name() != name && self.machine(machine.name()).is_some() {
            return Err(ValidationError::DuplicateName(machine.name().to_string()));
        }
        let slot = self
            .machines
            .iter_mut()
            .find(|m| m.name() == name)
            .ok_or_else(|| ValidationError::UnknownMachine(name.to_string()))?;
        *slot = machine;
        Ok(())
    }

    pub fn remove_machine(&mut self, name: &str) -> Result<MachineDefinition, ValidationError> {
        let idx = self
            .machines
            .iter()
            .position(|m| m.name() == name)
            .ok_or_else(|| ValidationError::UnknownMachine(name.to_string()))?;
        Ok(self.machines.remove(idx))
    }

    /// Add a copy of `source` under `new_name`
    pub fn clone_machine(&mut self, source: &str, new_name: &str) -> Result<(), ValidationError> {
        let copy = self
            .machine(source)
            .ok_or_else(|| ValidationError::UnknownMachine(source.to_string()))?
            .clone_as(new_name)?;
        self.add_machine(copy)
    }

    /// Apply portfolio-wide overrides to every machine in place
    pub fn apply_overrides(&mut self, overrides: &AssumptionOverrides) -> Result<(), ValidationError> {
        self.machines = overrides.apply(&self.machines)?;
        Ok(())
    }

    pub fn snapshot(&self) -> ScenarioSnapshot {
        ScenarioSnapshot {
            prices: self.prices.clone(),
            machines: self.machines.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: ScenarioSnapshot) {
        self.prices = snapshot.prices;
        self.machines = snapshot.machines;
    }
}

/// Runs full projections under one projection config
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    config: ProjectionConfig,
}

impl ScenarioRunner {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Project a scenario at its own prices
    pub fn run(&self, scenario: &Scenario) -> Result<PipelineOutput, Error> {
        log::debug!("Running scenario '{}'", scenario.name);
        Ok(run_pipeline(scenario.machines(), &self.config, scenario.prices())?)
    }

    /// Project a scenario with portfolio-wide overrides, leaving it untouched
    pub fn run_with_overrides(
        &self,
        scenario: &Scenario,
        overrides: &AssumptionOverrides,
    ) -> Result<PipelineOutput, Error> {
        let machines = overrides.apply(scenario.machines())?;
        Ok(run_pipeline(&machines, &self.config, scenario.prices())?)
    }

    /// Project the same machines under each price table
    ///
    /// Grid points are independent full runs and execute in parallel; results
    /// keep the order of `grid`.
    pub fn run_price_grid(
        &self,
        machines: &[MachineDefinition],
        grid: &[PriceTable],
    ) -> Vec<Result<PipelineOutput, Error>> {
        grid.par_iter()
            .map(|prices| run_pipeline(machines, &self.config, prices).map_err(Error::from))
            .collect()
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new(ProjectionConfig::default())
    }
}
