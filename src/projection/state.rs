//! Projection state tracking for a single machine

use crate::calendar::CalendarMonth;
use crate::machine::MachineDefinition;

/// Position of a machine on the projection timeline
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Current projection month (0-indexed from the start month)
    pub projection_month: u32,

    /// Calendar month of `projection_month`
    pub calendar_month: CalendarMonth,

    /// Month the growth clock counts from: the launch month, or the start
    /// month for machines without a launch date
    pub growth_origin: CalendarMonth,

    /// Months elapsed since `growth_origin`; `None` while not yet launched
    pub active_months: Option<u32>,
}

impl ProjectionState {
    /// State at the first projection month
    pub fn from_machine(machine: &MachineDefinition, start_month: CalendarMonth) -> Self {
        let growth_origin = machine.launch_date().unwrap_or(start_month);
        let mut state = Self {
            projection_month: 0,
            calendar_month: start_month,
            growth_origin,
            active_months: None,
        };
        state.refresh_activity();
        state
    }

    /// Advance to next month
    pub fn advance_month(&mut self) {
        self.projection_month += 1;
        self.calendar_month = self.calendar_month.add_months(1);
        self.refresh_activity();
    }

    pub fn is_active(&self) -> bool {
        self.active_months.is_some()
    }

    fn refresh_activity(&mut self) {
        let elapsed = self.calendar_month.months_since(&self.growth_origin);
        self.active_months = u32::try_from(elapsed).ok();
    }
}
