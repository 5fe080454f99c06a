//! Calendar-year rollup of the portfolio series

use super::aggregator::PortfolioMonthlyRecord;
use crate::calendar::CalendarMonth;
use serde::{Deserialize, Serialize};

/// Portfolio figures for one calendar year (USD)
///
/// Partial years at either end of the horizon cover only the months present,
/// and `months` says how many that is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyRecord {
    pub year: i32,
    pub months: u32,

    pub average_aum_usd: f64,
    /// AUM in the last month of the year present in the series
    pub end_of_year_aum_usd: f64,

    pub management_fees_usd: f64,
    pub management_fees_makina_usd: f64,
    pub performance_fees_usd: f64,
    pub performance_fees_makina_usd: f64,

    /// Makina fees / average AUM (0 when average AUM is 0)
    pub fee_to_aum_ratio: f64,
    /// All fees / average AUM (0 when average AUM is 0)
    pub gross_fee_to_aum_ratio: f64,
}

impl YearlyRecord {
    pub fn total_fees_usd(&self) -> f64 {
        self.management_fees_usd + self.performance_fees_usd
    }

    pub fn makina_fees_usd(&self) -> f64 {
        self.management_fees_makina_usd + self.performance_fees_makina_usd
    }

    /// `fee_to_aum_ratio` as a percentage
    pub fn fee_pct(&self) -> f64 {
        self.fee_to_aum_ratio * 100.0
    }
}

/// Running sums for the year being built
#[derive(Debug, Default)]
struct YearAccumulator {
    months: u32,
    aum_sum: f64,
    last_aum: f64,
    management: f64,
    management_makina: f64,
    performance: f64,
    performance_makina: f64,
}

impl YearAccumulator {
    fn add(&mut self, record: &PortfolioMonthlyRecord) {
        self.months += 1;
        self.aum_sum += record.total_aum_usd;
        self.last_aum = record.total_aum_usd;
        self.management += record.management_fee_usd;
        self.management_makina += record.management_fee_makina_usd;
        self.performance += record.performance_fee_usd;
        self.performance_makina += record.performance_fee_makina_usd;
    }

    fn finish(self, year: i32) -> YearlyRecord {
        let average_aum_usd = if self.months > 0 {
            self.aum_sum / self.months as f64
        } else {
            0.0
        };
        let ratio = |fees: f64| if average_aum_usd != 0.0 { fees / average_aum_usd } else { 0.0 };

        YearlyRecord {
            year,
            months: self.months,
            average_aum_usd,
            end_of_year_aum_usd: self.last_aum,
            management_fees_usd: self.management,
            management_fees_makina_usd: self.management_makina,
            performance_fees_usd: self.performance,
            performance_fees_makina_usd: self.performance_makina,
            fee_to_aum_ratio: ratio(self.management_makina + self.performance_makina),
            gross_fee_to_aum_ratio: ratio(self.management + self.performance),
        }
    }
}

/// Groups a monthly portfolio series into calendar years
pub struct YearlyRollup;

impl YearlyRollup {
    /// Roll up `monthly`, whose first element falls in `start_month`
    ///
    /// Month `i` belongs to the calendar year of `start_month + i`.
    pub fn rollup(monthly: &[PortfolioMonthlyRecord], start_month: CalendarMonth) -> Vec<YearlyRecord> {
        let mut years = Vec::new();
        let mut current: Option<(i32, YearAccumulator)> = None;

        for (idx, record) in monthly.iter().enumerate() {
            let year = start_month.add_months(idx as u32).year();

            if !matches!(&current, Some((y, _)) if *y == year) {
                if let Some((y, acc)) = current.take() {
                    years.push(acc.finish(y));
                }
                current = Some((year, YearAccumulator::default()));
            }
            if let Some((_, acc)) = current.as_mut() {
                acc.add(record);
            }
        }

        if let Some((y, acc)) = current {
            years.push(acc.finish(y));
        }
        years
    }
}
