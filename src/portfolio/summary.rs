//! Headline figures for a portfolio projection

use super::aggregator::PortfolioMonthlyRecord;
use serde::{Deserialize, Serialize};

/// Dashboard metrics taken from the monthly series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_months: u32,

    /// Total AUM in the final month
    pub final_aum_usd: f64,

    /// Makina fees earned in the final month
    pub final_monthly_fees_usd: f64,

    /// Final month's fees run-rated over a year
    pub annualized_fees_usd: f64,

    /// Mean of the monthly annualized fee percentages
    pub average_fee_pct: f64,

    /// Makina fees summed over the whole horizon
    pub cumulative_fees_usd: f64,
}

impl PortfolioSummary {
    pub fn from_monthly(monthly: &[PortfolioMonthlyRecord]) -> Self {
        let final_aum_usd = monthly.last().map(|r| r.total_aum_usd).unwrap_or(0.0);
        let final_monthly_fees_usd = monthly.last().map(|r| r.makina_fee_usd()).unwrap_or(0.0);

        let average_fee_pct = if monthly.is_empty() {
            0.0
        } else {
            monthly.iter().map(|r| r.annualized_fee_pct()).sum::<f64>() / monthly.len() as f64
        };

        Self {
            total_months: monthly.len() as u32,
            final_aum_usd,
            final_monthly_fees_usd,
            annualized_fees_usd: final_monthly_fees_usd * 12.0,
            average_fee_pct,
            cumulative_fees_usd: monthly.iter().map(|r| r.makina_fee_usd()).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarMonth;
    use crate::machine::MachineParams;
    use crate::portfolio::PortfolioAggregator;
    use crate::pricing::{CurrencyConverter, PriceTable};
    use crate::projection::{ProjectionConfig, ProjectionEngine};
    use approx::assert_relative_eq;

    #[test]
    fn test_summary_uses_final_month() {
        let machine = MachineParams {
            name: "DNEW".to_string(),
            initial_aum: 55_000_000.0,
            launch_date: CalendarMonth::new(2026, 7),
            ..Default::default()
        }
        .build()
        .unwrap();
        let start = CalendarMonth::new(2026, 1).unwrap();
        let projection = ProjectionEngine::new(ProjectionConfig::new(12, start)).project(&machine);
        let monthly = PortfolioAggregator::new(CurrencyConverter::new(PriceTable::new()))
            .aggregate(&[projection])
            .unwrap();

        let summary = PortfolioSummary::from_monthly(&monthly);
        let last = &monthly[11];

        assert_eq!(summary.total_months, 12);
        assert_eq!(summary.final_aum_usd, last.total_aum_usd);
        assert_relative_eq!(summary.annualized_fees_usd, last.makina_fee_usd() * 12.0);

        // Six pre-launch months contribute 0% to the average
        let live_pct: f64 = monthly[6..].iter().map(|r| r.annualized_fee_pct()).sum();
        assert_relative_eq!(summary.average_fee_pct, live_pct / 12.0, max_relative = 1e-12);
    }

    #[test]
    fn test_empty_summary() {
        let summary = PortfolioSummary::from_monthly(&[]);
        assert_eq!(summary.total_months, 0);
        assert_eq!(summary.final_aum_usd, 0.0);
        assert_eq!(summary.average_fee_pct, 0.0);
    }
}
