//! Consolidation of per-machine series into USD portfolio totals

use crate::calendar::CalendarMonth;
use crate::error::AggregationError;
use crate::pricing::{Currency, CurrencyConverter};
use crate::projection::MachineProjection;
use serde::{Deserialize, Serialize};

/// One amount per supported currency
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrencyBreakdown {
    pub usd: f64,
    pub eth: f64,
    pub btc: f64,
}

impl CurrencyBreakdown {
    pub fn get(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Usd => self.usd,
            Currency::Eth => self.eth,
            Currency::Btc => self.btc,
        }
    }

    pub fn add(&mut self, currency: Currency, amount: f64) {
        match currency {
            Currency::Usd => self.usd += amount,
            Currency::Eth => self.eth += amount,
            Currency::Btc => self.btc += amount,
        }
    }

    pub fn total(&self) -> f64 {
        self.usd + self.eth + self.btc
    }
}

/// Portfolio totals for one month, in USD unless noted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMonthlyRecord {
    pub month_index: u32,
    pub month: CalendarMonth,

    pub total_aum_usd: f64,
    /// AUM per currency, USD-converted
    pub aum_usd_by_currency: CurrencyBreakdown,
    /// AUM per currency, in each currency's own units
    pub aum_native_by_currency: CurrencyBreakdown,

    pub management_fee_usd: f64,
    pub management_fee_makina_usd: f64,
    pub performance_fee_usd: f64,
    pub performance_fee_makina_usd: f64,
}

impl PortfolioMonthlyRecord {
    fn empty(month_index: u32, month: CalendarMonth) -> Self {
        Self {
            month_index,
            month,
            total_aum_usd: 0.0,
            aum_usd_by_currency: CurrencyBreakdown::default(),
            aum_native_by_currency: CurrencyBreakdown::default(),
            management_fee_usd: 0.0,
            management_fee_makina_usd: 0.0,
            performance_fee_usd: 0.0,
            performance_fee_makina_usd: 0.0,
        }
    }

    pub fn total_fee_usd(&self) -> f64 {
        self.management_fee_usd + self.performance_fee_usd
    }

    pub fn makina_fee_usd(&self) -> f64 {
        self.management_fee_makina_usd + self.performance_fee_makina_usd
    }

    /// Makina fees as an annualized percentage of AUM; 0 with no AUM
    pub fn annualized_fee_pct(&self) -> f64 {
        if self.total_aum_usd != 0.0 {
            self.makina_fee_usd() / self.total_aum_usd * 12.0 * 100.0
        } else {
            0.0
        }
    }
}

/// A machine's month converted to USD, for per-machine reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineUsdRecord {
    pub month_index: u32,
    pub month: CalendarMonth,
    pub machine_name: String,
    pub currency: Currency,
    pub aum: f64,
    pub aum_usd: f64,
    pub management_fee_makina: f64,
    pub management_fee_makina_usd: f64,
    pub performance_fee_makina: f64,
    pub performance_fee_makina_usd: f64,
    pub makina_fee_usd: f64,
}

/// Sums machine projections month by month in USD
#[derive(Debug, Clone)]
pub struct PortfolioAggregator {
    converter: CurrencyConverter,
}

impl PortfolioAggregator {
    pub fn new(converter: CurrencyConverter) -> Self {
        Self { converter }
    }

    pub fn converter(&self) -> &CurrencyConverter {
        &self.converter
    }

    /// Combine machine projections into one portfolio series
    ///
    /// Every projection must share the first one's start month and length,
    /// and every machine's currency must be priced, even if the machine
    /// never goes live within the horizon.
    pub fn aggregate(
        &self,
        projections: &[MachineProjection],
    ) -> Result<Vec<PortfolioMonthlyRecord>, AggregationError> {
        let Some(first) = projections.first() else {
            return Ok(Vec::new());
        };
        let start = first.start_month;
        let horizon = first.len();

        let mut rates = Vec::with_capacity(projections.len());
        for projection in projections {
            check_alignment(projection, start, horizon)?;
            rates.push(self.converter.rate(projection.currency)?);
        }

        let mut totals: Vec<PortfolioMonthlyRecord> = (0..horizon)
            .map(|idx| PortfolioMonthlyRecord::empty(idx as u32, start.add_months(idx as u32)))
            .collect();

        for (projection, rate) in projections.iter().zip(rates) {
            let currency = projection.currency;
            for (total, record) in totals.iter_mut().zip(&projection.records) {
                let aum_usd = record.aum * rate;
                total.total_aum_usd += aum_usd;
                total.aum_usd_by_currency.add(currency, aum_usd);
                total.aum_native_by_currency.add(currency, record.aum);
                total.management_fee_usd += record.management_fee * rate;
                total.management_fee_makina_usd += record.management_fee_makina * rate;
                total.performance_fee_usd += record.performance_fee * rate;
                total.performance_fee_makina_usd += record.performance_fee_makina * rate;
            }
        }

        log::debug!(
            "Aggregated {} machines over {} months from {}",
            projections.len(),
            horizon,
            start
        );
        Ok(totals)
    }

    /// One machine's series converted to USD
    pub fn machine_usd_records(
        &self,
        projection: &MachineProjection,
    ) -> Result<Vec<MachineUsdRecord>, AggregationError> {
        let rate = self.converter.rate(projection.currency)?;

        Ok(projection
            .records
            .iter()
            .map(|r| MachineUsdRecord {
                month_index: r.month_index,
                month: r.month,
                machine_name: projection.machine_name.clone(),
                currency: projection.currency,
                aum: r.aum,
                aum_usd: r.aum * rate,
                management_fee_makina: r.management_fee_makina,
                management_fee_makina_usd: r.management_fee_makina * rate,
                performance_fee_makina: r.performance_fee_makina,
                performance_fee_makina_usd: r.performance_fee_makina * rate,
                makina_fee_usd: r.makina_fee() * rate,
            })
            .collect())
    }
}

fn check_alignment(
    projection: &MachineProjection,
    start: CalendarMonth,
    horizon: usize,
) -> Result<(), AggregationError> {
    if projection.start_month != start {
        return Err(AggregationError::StartMonthMismatch {
            machine: projection.machine_name.clone(),
            expected: start.to_string(),
            found: projection.start_month.to_string(),
        });
    }
    if projection.len() != horizon {
        return Err(AggregationError::HorizonMismatch {
            machine: projection.machine_name.clone(),
            expected: horizon,
            found: projection.len(),
        });
    }
    for (index, record) in projection.records.iter().enumerate() {
        let expected = start.add_months(index as u32);
        if record.month != expected {
            return Err(AggregationError::MisalignedMonth {
                machine: projection.machine_name.clone(),
                index,
                expected: expected.to_string(),
                found: record.month.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PricingError;
    use crate::machine::{MachineDefinition, MachineParams};
    use crate::pricing::PriceTable;
    use crate::projection::{ProjectionConfig, ProjectionEngine};
    use approx::assert_relative_eq;

    fn jan_2026() -> CalendarMonth {
        CalendarMonth::new(2026, 1).unwrap()
    }

    fn machine(name: &str, currency: Currency, aum: f64) -> MachineDefinition {
        MachineParams {
            name: name.to_string(),
            currency,
            initial_aum: aum,
            ..Default::default()
        }
        .build()
        .unwrap()
    }

    fn project(machines: &[MachineDefinition], months: u32) -> Vec<MachineProjection> {
        ProjectionEngine::new(ProjectionConfig::new(months, jan_2026())).project_all(machines)
    }

    fn aggregator(prices: PriceTable) -> PortfolioAggregator {
        PortfolioAggregator::new(CurrencyConverter::new(prices))
    }

    #[test]
    fn test_single_usd_machine_is_identity() {
        let projections = project(&[machine("DUSD", Currency::Usd, 55_000_000.0)], 24);
        let totals = aggregator(PriceTable::new()).aggregate(&projections).unwrap();

        assert_eq!(totals.len(), 24);
        for (total, record) in totals.iter().zip(&projections[0].records) {
            assert_eq!(total.month, record.month);
            assert_eq!(total.total_aum_usd, record.aum);
            assert_eq!(total.aum_usd_by_currency.usd, record.aum);
            assert_eq!(total.management_fee_usd, record.management_fee);
            assert_eq!(total.management_fee_makina_usd, record.management_fee_makina);
            assert_eq!(total.performance_fee_usd, record.performance_fee);
            assert_eq!(total.performance_fee_makina_usd, record.performance_fee_makina);
        }
    }

    #[test]
    fn test_multi_currency_buckets() {
        let machines = [
            machine("DUSD", Currency::Usd, 1_000_000.0),
            machine("DETH", Currency::Eth, 100.0),
            machine("DBIT", Currency::Btc, 10.0),
        ];
        let projections = project(&machines, 3);
        let prices = PriceTable::from_spot(3000.0, 90000.0).unwrap();
        let totals = aggregator(prices).aggregate(&projections).unwrap();

        let m0 = &totals[0];
        assert_relative_eq!(m0.aum_usd_by_currency.usd, 1_000_000.0);
        assert_relative_eq!(m0.aum_usd_by_currency.eth, 300_000.0);
        assert_relative_eq!(m0.aum_usd_by_currency.btc, 900_000.0);
        assert_relative_eq!(m0.aum_native_by_currency.eth, 100.0);
        assert_relative_eq!(m0.total_aum_usd, 2_200_000.0);
        assert_relative_eq!(m0.total_aum_usd, m0.aum_usd_by_currency.total());

        let eth_fee = projections[1].records[0].management_fee_makina * 3000.0;
        let btc_fee = projections[2].records[0].management_fee_makina * 90000.0;
        let usd_fee = projections[0].records[0].management_fee_makina;
        assert_relative_eq!(m0.management_fee_makina_usd, usd_fee + eth_fee + btc_fee);
    }

    #[test]
    fn test_missing_price_fails_run() {
        let projections = project(&[machine("DBIT", Currency::Btc, 200.0)], 12);
        let prices = PriceTable::new().with_price(Currency::Eth, 3000.0).unwrap();
        assert_eq!(
            aggregator(prices).aggregate(&projections),
            Err(AggregationError::Pricing(PricingError::MissingPrice(Currency::Btc)))
        );
    }

    #[test]
    fn test_horizon_mismatch_fails() {
        let mut projections = project(&[machine("A", Currency::Usd, 1.0)], 12);
        projections.extend(project(&[machine("B", Currency::Usd, 1.0)], 6));

        assert_eq!(
            aggregator(PriceTable::new()).aggregate(&projections),
            Err(AggregationError::HorizonMismatch {
                machine: "B".to_string(),
                expected: 12,
                found: 6
            })
        );
    }

    #[test]
    fn test_start_month_mismatch_fails() {
        let mut projections = project(&[machine("A", Currency::Usd, 1.0)], 12);
        let later = ProjectionEngine::new(ProjectionConfig::new(12, CalendarMonth::new(2026, 2).unwrap()));
        projections.push(later.project(&machine("B", Currency::Usd, 1.0)));

        assert!(matches!(
            aggregator(PriceTable::new()).aggregate(&projections),
            Err(AggregationError::StartMonthMismatch { .. })
        ));
    }

    #[test]
    fn test_misaligned_records_fail() {
        let mut projections = project(&[machine("A", Currency::Usd, 1.0)], 3);
        projections[0].records.swap(0, 2);

        assert!(matches!(
            aggregator(PriceTable::new()).aggregate(&projections),
            Err(AggregationError::MisalignedMonth { index: 0, .. })
        ));
    }

    #[test]
    fn test_no_machines_is_empty() {
        let totals = aggregator(PriceTable::new()).aggregate(&[]).unwrap();
        assert!(totals.is_empty());
    }

    #[test]
    fn test_annualized_fee_pct() {
        let projections = project(&[machine("DUSD", Currency::Usd, 55_000_000.0)], 1);
        let totals = aggregator(PriceTable::new()).aggregate(&projections).unwrap();
        let record = &totals[0];

        let expected = record.makina_fee_usd() / record.total_aum_usd * 1200.0;
        assert_relative_eq!(record.annualized_fee_pct(), expected);
        assert_eq!(PortfolioMonthlyRecord::empty(0, jan_2026()).annualized_fee_pct(), 0.0);
    }

    #[test]
    fn test_annualized_fee_pct_with_negative_aum() {
        let wind_down = MachineParams {
            name: "Wind-down".to_string(),
            initial_aum: 1_000.0,
            monthly_growth_rate: -1.0,
            ..Default::default()
        }
        .build()
        .unwrap();
        let projections = project(&[wind_down], 24);
        let totals = aggregator(PriceTable::new()).aggregate(&projections).unwrap();

        let record = &totals[13];
        assert_relative_eq!(record.total_aum_usd, -12_000.0);
        assert!(record.annualized_fee_pct() > 0.0);
        assert_relative_eq!(
            record.annualized_fee_pct(),
            record.makina_fee_usd() / record.total_aum_usd * 1200.0
        );
    }

    #[test]
    fn test_machine_usd_records() {
        let projections = project(&[machine("DETH", Currency::Eth, 9300.0)], 2);
        let prices = PriceTable::base_case();
        let rows = aggregator(prices).machine_usd_records(&projections[0]).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].machine_name, "DETH");
        assert_relative_eq!(rows[0].aum_usd, 9300.0 * 3000.0);
        assert_relative_eq!(
            rows[1].makina_fee_usd,
            rows[1].management_fee_makina_usd + rows[1].performance_fee_makina_usd,
            max_relative = 1e-12
        );
    }
}
