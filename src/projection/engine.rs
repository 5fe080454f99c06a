//! Core projection engine for monthly AUM and fee projections

use crate::calendar::CalendarMonth;
use crate::machine::MachineDefinition;
use super::state::ProjectionState;
use super::records::{MachineProjection, MonthlyRecord};

/// Default projection horizon (3 years)
pub const DEFAULT_HORIZON_MONTHS: u32 = 36;

/// Configuration for a projection run
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionConfig {
    /// Number of months to project
    pub horizon_months: u32,

    /// Calendar month of projection month 0
    pub start_month: CalendarMonth,
}

impl ProjectionConfig {
    pub fn new(horizon_months: u32, start_month: CalendarMonth) -> Self {
        Self { horizon_months, start_month }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            horizon_months: DEFAULT_HORIZON_MONTHS,
            start_month: CalendarMonth::current(),
        }
    }
}

/// Main projection engine
///
/// Performs no validation: every [`MachineDefinition`] is already range-checked.
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Run projection for a single machine
    ///
    /// Always returns exactly `horizon_months` records.
    pub fn project(&self, machine: &MachineDefinition) -> MachineProjection {
        let mut result = MachineProjection::new(
            machine.name(),
            machine.currency(),
            self.config.start_month,
        );
        if self.config.horizon_months == 0 {
            return result;
        }

        if let Some(launch) = machine.launch_date() {
            let last = self.config.start_month.add_months(self.config.horizon_months - 1);
            if launch > last {
                log::warn!(
                    "Machine '{}' launches {} after the horizon ends ({}); it contributes nothing",
                    machine.name(),
                    launch,
                    last
                );
            }
        }

        let mut state = ProjectionState::from_machine(machine, self.config.start_month);
        for month in 0..self.config.horizon_months {
            if month > 0 {
                state.advance_month();
            }
            result.add_record(self.calculate_month(machine, &state));
        }

        log::debug!(
            "Projected '{}' ({}) over {} months from {}",
            machine.name(),
            machine.currency(),
            result.len(),
            self.config.start_month
        );
        result
    }

    /// Project every machine independently, preserving input order
    pub fn project_all(&self, machines: &[MachineDefinition]) -> Vec<MachineProjection> {
        machines.iter().map(|m| self.project(m)).collect()
    }

    /// Calculate AUM and fees for a single month
    fn calculate_month(&self, machine: &MachineDefinition, state: &ProjectionState) -> MonthlyRecord {
        let Some(active_months) = state.active_months else {
            return MonthlyRecord::zero(state.projection_month, state.calendar_month);
        };

        // Linear growth: each elapsed month adds the same slice of initial AUM
        let initial = machine.initial_aum();
        let aum = initial + active_months as f64 * initial * machine.monthly_growth_rate();

        let management_fee = aum * machine.management_fee_rate() / 12.0;
        let monthly_yield = aum * machine.yield_apr() / 12.0;
        let performance_fee = machine.performance_fee_rate()
            * monthly_yield
            * machine.net_return_margin()
            * (1.0 - machine.employee_capital_share());

        MonthlyRecord {
            month_index: state.projection_month,
            month: state.calendar_month,
            active: true,
            aum,
            monthly_yield,
            management_fee,
            management_fee_makina: management_fee * machine.management_fee_makina_share(),
            performance_fee,
            performance_fee_makina: performance_fee * machine.performance_fee_makina_share(),
        }
    }
}
