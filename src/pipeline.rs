//! End-to-end revenue projection
//!
//! machines + horizon + prices -> per-machine series -> portfolio series ->
//! yearly rollup. Every call recomputes everything from its inputs.

use crate::calendar::CalendarMonth;
use crate::error::AggregationError;
use crate::machine::MachineDefinition;
use crate::portfolio::{PortfolioAggregator, PortfolioMonthlyRecord, PortfolioSummary, YearlyRecord, YearlyRollup};
use crate::pricing::{CurrencyConverter, PriceTable};
use crate::projection::{MachineProjection, ProjectionConfig, ProjectionEngine};
use serde::{Deserialize, Serialize};

/// Everything one projection run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub start_month: CalendarMonth,
    pub horizon_months: u32,
    pub prices: PriceTable,
    pub machines: Vec<MachineProjection>,
    pub monthly: Vec<PortfolioMonthlyRecord>,
    pub yearly: Vec<YearlyRecord>,
    pub summary: PortfolioSummary,
}

/// Run the full projection for `machines` under `config` and `prices`
pub fn run_pipeline(
    machines: &[MachineDefinition],
    config: &ProjectionConfig,
    prices: &PriceTable,
) -> Result<PipelineOutput, AggregationError> {
    log::info!(
        "Projecting {} machines over {} months from {}",
        machines.len(),
        config.horizon_months,
        config.start_month
    );

    let engine = ProjectionEngine::new(config.clone());
    let projections = engine.project_all(machines);

    let aggregator = PortfolioAggregator::new(CurrencyConverter::new(prices.clone()));
    let monthly = aggregator.aggregate(&projections)?;
    let yearly = YearlyRollup::rollup(&monthly, config.start_month);
    let summary = PortfolioSummary::from_monthly(&monthly);

    log::info!(
        "Final month AUM ${:.0}, annualized Makina fees ${:.0}",
        summary.final_aum_usd,
        summary.annualized_fees_usd
    );

    Ok(PipelineOutput {
        start_month: config.start_month,
        horizon_months: config.horizon_months,
        prices: prices.clone(),
        machines: projections,
        monthly,
        yearly,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::base_case_machines;
    use crate::pricing::Currency;

    fn config(months: u32) -> ProjectionConfig {
        ProjectionConfig::new(months, CalendarMonth::new(2026, 1).unwrap())
    }

    #[test]
    fn test_base_case_pipeline() {
        let machines = base_case_machines().unwrap();
        let output = run_pipeline(&machines, &config(36), &PriceTable::base_case()).unwrap();

        assert_eq!(output.machines.len(), 7);
        assert_eq!(output.monthly.len(), 36);
        assert_eq!(output.yearly.len(), 3);
        assert!(output.machines.iter().all(|m| m.len() == 36));

        // Lido launches Feb 2026 with $400M and no growth
        let jan = &output.monthly[0];
        let feb = &output.monthly[1];
        assert!(feb.aum_usd_by_currency.usd - jan.aum_usd_by_currency.usd > 400_000_000.0);
        assert!(jan.aum_usd_by_currency.get(Currency::Btc) > 0.0);
    }

    #[test]
    fn test_recompute_with_new_prices() {
        let machines = base_case_machines().unwrap();
        let low = run_pipeline(&machines, &config(12), &PriceTable::from_spot(2000.0, 60000.0).unwrap()).unwrap();
        let high = run_pipeline(&machines, &config(12), &PriceTable::from_spot(4000.0, 120000.0).unwrap()).unwrap();

        // Native series are price-independent
        assert_eq!(low.machines, high.machines);
        assert!(high.summary.final_aum_usd > low.summary.final_aum_usd);
        assert_eq!(low.monthly[5].aum_usd_by_currency.usd, high.monthly[5].aum_usd_by_currency.usd);
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let machines = base_case_machines().unwrap();
        let a = run_pipeline(&machines, &config(24), &PriceTable::base_case()).unwrap();
        let b = run_pipeline(&machines, &config(24), &PriceTable::base_case()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_btc_price_fails_run() {
        let machines = base_case_machines().unwrap();
        let eth_only = PriceTable::new().with_price(Currency::Eth, 3000.0).unwrap();
        assert!(run_pipeline(&machines, &config(12), &eth_only).is_err());
    }
}
