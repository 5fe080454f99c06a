//! CSV and JSON report writers for projection output

use crate::error::{Error, LoadError};
use crate::pipeline::PipelineOutput;
use crate::portfolio::{PortfolioAggregator, PortfolioMonthlyRecord, YearlyRecord};
use crate::pricing::CurrencyConverter;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Flat CSV row for one portfolio month
#[derive(Debug, Serialize)]
struct MonthlyCsvRow {
    month_index: u32,
    month: String,
    total_aum_usd: f64,
    aum_usd_usd: f64,
    aum_eth_usd: f64,
    aum_btc_usd: f64,
    aum_eth_native: f64,
    aum_btc_native: f64,
    management_fee_usd: f64,
    management_fee_makina_usd: f64,
    performance_fee_usd: f64,
    performance_fee_makina_usd: f64,
    makina_fee_usd: f64,
    annualized_fee_pct: f64,
}

impl From<&PortfolioMonthlyRecord> for MonthlyCsvRow {
    fn from(r: &PortfolioMonthlyRecord) -> Self {
        Self {
            month_index: r.month_index,
            month: r.month.to_string(),
            total_aum_usd: r.total_aum_usd,
            aum_usd_usd: r.aum_usd_by_currency.usd,
            aum_eth_usd: r.aum_usd_by_currency.eth,
            aum_btc_usd: r.aum_usd_by_currency.btc,
            aum_eth_native: r.aum_native_by_currency.eth,
            aum_btc_native: r.aum_native_by_currency.btc,
            management_fee_usd: r.management_fee_usd,
            management_fee_makina_usd: r.management_fee_makina_usd,
            performance_fee_usd: r.performance_fee_usd,
            performance_fee_makina_usd: r.performance_fee_makina_usd,
            makina_fee_usd: r.makina_fee_usd(),
            annualized_fee_pct: r.annualized_fee_pct(),
        }
    }
}

/// Flat CSV row for one calendar year
#[derive(Debug, Serialize)]
struct YearlyCsvRow {
    year: i32,
    months: u32,
    average_aum_usd: f64,
    end_of_year_aum_usd: f64,
    management_fees_usd: f64,
    management_fees_makina_usd: f64,
    performance_fees_usd: f64,
    performance_fees_makina_usd: f64,
    total_fees_usd: f64,
    makina_fees_usd: f64,
    fee_pct: f64,
}

impl From<&YearlyRecord> for YearlyCsvRow {
    fn from(y: &YearlyRecord) -> Self {
        Self {
            year: y.year,
            months: y.months,
            average_aum_usd: y.average_aum_usd,
            end_of_year_aum_usd: y.end_of_year_aum_usd,
            management_fees_usd: y.management_fees_usd,
            management_fees_makina_usd: y.management_fees_makina_usd,
            performance_fees_usd: y.performance_fees_usd,
            performance_fees_makina_usd: y.performance_fees_makina_usd,
            total_fees_usd: y.total_fees_usd(),
            makina_fees_usd: y.makina_fees_usd(),
            fee_pct: y.fee_pct(),
        }
    }
}

pub fn write_monthly_csv<W: Write>(writer: W, monthly: &[PortfolioMonthlyRecord]) -> Result<(), LoadError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in monthly {
        csv_writer.serialize(MonthlyCsvRow::from(record))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_yearly_csv<W: Write>(writer: W, yearly: &[YearlyRecord]) -> Result<(), LoadError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in yearly {
        csv_writer.serialize(YearlyCsvRow::from(record))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Long-format per-machine rows (one row per machine per month) with USD columns
pub fn write_machine_series_csv<W: Write>(writer: W, output: &PipelineOutput) -> Result<(), Error> {
    let aggregator = PortfolioAggregator::new(CurrencyConverter::new(output.prices.clone()));
    let mut csv_writer = csv::Writer::from_writer(writer);

    for projection in &output.machines {
        for row in aggregator.machine_usd_records(projection)? {
            csv_writer.serialize(row).map_err(LoadError::from)?;
        }
    }
    csv_writer.flush().map_err(LoadError::from)?;
    Ok(())
}

/// Write `machines.csv`, `monthly.csv` and `yearly.csv` into `dir`
pub fn write_csv_reports(dir: &Path, output: &PipelineOutput) -> Result<(), Error> {
    let create = |name: &str| File::create(dir.join(name)).map_err(LoadError::from);

    std::fs::create_dir_all(dir).map_err(LoadError::from)?;
    write_machine_series_csv(create("machines.csv")?, output)?;
    write_monthly_csv(create("monthly.csv")?, &output.monthly)?;
    write_yearly_csv(create("yearly.csv")?, &output.yearly)?;
    log::info!("CSV reports written to {}", dir.display());
    Ok(())
}

/// Write the whole pipeline output as pretty JSON
pub fn write_json<W: Write>(writer: W, output: &PipelineOutput) -> Result<(), LoadError> {
    serde_json::to_writer_pretty(writer, output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarMonth;
    use crate::machine::base_case_machines;
    use crate::pipeline::run_pipeline;
    use crate::pricing::PriceTable;
    use crate::projection::ProjectionConfig;

    fn output() -> PipelineOutput {
        let config = ProjectionConfig::new(14, CalendarMonth::new(2026, 1).unwrap());
        run_pipeline(&base_case_machines().unwrap(), &config, &PriceTable::base_case()).unwrap()
    }

    #[test]
    fn test_monthly_csv_layout() {
        let mut buffer = Vec::new();
        write_monthly_csv(&mut buffer, &output().monthly).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 15);
        assert!(lines[0].starts_with("month_index,month,total_aum_usd"));
        assert!(lines[1].starts_with("0,2026-01,"));
    }

    #[test]
    fn test_yearly_csv_has_partial_year() {
        let mut buffer = Vec::new();
        write_yearly_csv(&mut buffer, &output().yearly).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("2026,12,"));
        assert!(lines[2].starts_with("2027,2,"));
    }

    #[test]
    fn test_machines_csv_rows() {
        let mut buffer = Vec::new();
        write_machine_series_csv(&mut buffer, &output()).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        // header + 7 machines x 14 months
        assert_eq!(text.lines().count(), 1 + 7 * 14);
        assert!(text.lines().nth(1).unwrap().contains("DETH,ETH"));
    }

    #[test]
    fn test_csv_reports_written_to_new_dir() {
        let dir = std::env::temp_dir()
            .join(format!("makina_revenue_reports_{}", std::process::id()))
            .join("nested");
        let _ = std::fs::remove_dir_all(&dir);

        write_csv_reports(&dir, &output()).unwrap();

        for (name, rows) in [("machines.csv", 1 + 7 * 14), ("monthly.csv", 15), ("yearly.csv", 3)] {
            let text = std::fs::read_to_string(dir.join(name)).unwrap();
            assert_eq!(text.lines().count(), rows, "{}", name);
        }
        std::fs::remove_dir_all(dir.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_json_round_trip() {
        let original = output();
        let mut buffer = Vec::new();
        write_json(&mut buffer, &original).unwrap();
        let parsed: PipelineOutput = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed.monthly.len(), original.monthly.len());
        assert_eq!(parsed.summary.total_months, 14);
    }
}
