//! Per-machine monthly output structures

use crate::calendar::CalendarMonth;
use crate::pricing::Currency;
use serde::{Deserialize, Serialize};

/// One month of a single machine, in its native currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    // Timing
    pub month_index: u32,
    pub month: CalendarMonth,
    pub active: bool,

    // Balances
    pub aum: f64,
    pub monthly_yield: f64,

    // Fees (total charged, and the Makina portion of it)
    pub management_fee: f64,
    pub management_fee_makina: f64,
    pub performance_fee: f64,
    pub performance_fee_makina: f64,
}

impl MonthlyRecord {
    /// All-zero record for a month the machine is not live
    pub fn zero(month_index: u32, month: CalendarMonth) -> Self {
        Self {
            month_index,
            month,
            active: false,
            aum: 0.0,
            monthly_yield: 0.0,
            management_fee: 0.0,
            management_fee_makina: 0.0,
            performance_fee: 0.0,
            performance_fee_makina: 0.0,
        }
    }

    pub fn total_fee(&self) -> f64 {
        self.management_fee + self.performance_fee
    }

    pub fn makina_fee(&self) -> f64 {
        self.management_fee_makina + self.performance_fee_makina
    }
}

/// Complete projection of one machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineProjection {
    pub machine_name: String,
    pub currency: Currency,
    pub start_month: CalendarMonth,
    pub records: Vec<MonthlyRecord>,
}

impl MachineProjection {
    pub fn new(machine_name: impl Into<String>, currency: Currency, start_month: CalendarMonth) -> Self {
        Self {
            machine_name: machine_name.into(),
            currency,
            start_month,
            records: Vec::new(),
        }
    }

    pub fn add_record(&mut self, record: MonthlyRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Native-currency totals over the horizon
    pub fn summary(&self) -> MachineSummary {
        let total_management_fee = self.records.iter().map(|r| r.management_fee).sum();
        let total_performance_fee = self.records.iter().map(|r| r.performance_fee).sum();
        let total_makina_fee = self.records.iter().map(|r| r.makina_fee()).sum();

        MachineSummary {
            total_months: self.records.len() as u32,
            active_months: self.records.iter().filter(|r| r.active).count() as u32,
            final_aum: self.records.last().map(|r| r.aum).unwrap_or(0.0),
            total_management_fee,
            total_performance_fee,
            total_makina_fee,
        }
    }
}

/// Summary statistics for one machine's projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineSummary {
    pub total_months: u32,
    pub active_months: u32,
    pub final_aum: f64,
    pub total_management_fee: f64,
    pub total_performance_fee: f64,
    pub total_makina_fee: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(m: u32) -> CalendarMonth {
        CalendarMonth::new(2026, m).unwrap()
    }

    #[test]
    fn test_summary_totals() {
        let mut projection = MachineProjection::new("DETH", Currency::Eth, month(1));
        projection.add_record(MonthlyRecord::zero(0, month(1)));
        projection.add_record(MonthlyRecord {
            month_index: 1,
            month: month(2),
            active: true,
            aum: 9300.0,
            monthly_yield: 38.75,
            management_fee: 5.8125,
            management_fee_makina: 2.325,
            performance_fee: 3.5,
            performance_fee_makina: 1.4,
        });

        let summary = projection.summary();
        assert_eq!(summary.total_months, 2);
        assert_eq!(summary.active_months, 1);
        assert_eq!(summary.final_aum, 9300.0);
        assert_eq!(summary.total_management_fee, 5.8125);
        assert_eq!(summary.total_performance_fee, 3.5);
        assert_eq!(summary.total_makina_fee, 2.325 + 1.4);
    }

    #[test]
    fn test_empty_projection_summary() {
        let projection = MachineProjection::new("DUSD", Currency::Usd, month(1));
        assert!(projection.is_empty());
        assert_eq!(projection.summary().final_aum, 0.0);
    }
}
