//! Price sensitivity grid
//!
//! Projects the same machine set under every combination of ETH and BTC spot
//! prices and reports Makina's yearly fees for each grid point.
//!
//! Example:
//!   price_sensitivity --eth-prices 2000,3000,4000 --btc-prices 60000,90000 -o grid.csv

use anyhow::{Context, Result};
use clap::Parser;
use makina_revenue::machine::{base_case_machines, load_machines};
use makina_revenue::pricing::{DEFAULT_BTC_PRICE, DEFAULT_ETH_PRICE};
use makina_revenue::projection::DEFAULT_HORIZON_MONTHS;
use makina_revenue::{CalendarMonth, Currency, PriceTable, ProjectionConfig, ScenarioRunner};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "price_sensitivity")]
#[command(about = "Yearly Makina fees across a grid of ETH/BTC spot prices", long_about = None)]
struct Cli {
    /// ETH spot prices to test
    #[arg(long, value_delimiter = ',', default_values_t = vec![DEFAULT_ETH_PRICE])]
    eth_prices: Vec<f64>,

    /// BTC spot prices to test
    #[arg(long, value_delimiter = ',', default_values_t = vec![DEFAULT_BTC_PRICE])]
    btc_prices: Vec<f64>,

    /// Machine file (.csv or .json); built-in base case when omitted
    #[arg(long)]
    machines: Option<PathBuf>,

    /// Projection horizon in months
    #[arg(short, long, default_value_t = DEFAULT_HORIZON_MONTHS)]
    months: u32,

    /// First projected month (YYYY-MM); defaults to the current month
    #[arg(short, long)]
    start: Option<CalendarMonth>,

    /// CSV output path
    #[arg(short, long, default_value = "price_sensitivity.csv")]
    output: PathBuf,
}

#[derive(Debug, Serialize)]
struct GridRow {
    eth_price: f64,
    btc_price: f64,
    year: i32,
    months: u32,
    average_aum_usd: f64,
    makina_fees_usd: f64,
    fee_pct: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let start = Instant::now();

    let machines = match &cli.machines {
        Some(path) => load_machines(path)
            .with_context(|| format!("Failed to load machines from {}", path.display()))?,
        None => base_case_machines()?,
    };

    let mut grid = Vec::with_capacity(cli.eth_prices.len() * cli.btc_prices.len());
    for &eth in &cli.eth_prices {
        for &btc in &cli.btc_prices {
            grid.push(
                PriceTable::from_spot(eth, btc)
                    .with_context(|| format!("Invalid grid point ETH={} BTC={}", eth, btc))?,
            );
        }
    }

    let config = ProjectionConfig::new(cli.months, cli.start.unwrap_or_else(CalendarMonth::current));
    let runner = ScenarioRunner::new(config);

    println!("Price Sensitivity");
    println!("=================");
    println!("Machines: {}  Grid points: {}  Horizon: {} months\n", machines.len(), grid.len(), cli.months);

    let results = runner.run_price_grid(&machines, &grid);

    let mut writer = csv::Writer::from_path(&cli.output)
        .with_context(|| format!("Unable to create {}", cli.output.display()))?;

    println!("{:>10} {:>10} {:>18} {:>18} {:>8}", "ETH", "BTC", "Final AUM", "Cum. Fees", "Fee %");
    println!("{}", "-".repeat(68));

    for (prices, result) in grid.iter().zip(results) {
        let eth = prices.get(Currency::Eth).unwrap_or_default();
        let btc = prices.get(Currency::Btc).unwrap_or_default();
        let output = result.with_context(|| format!("Projection failed at ETH={} BTC={}", eth, btc))?;

        for year in &output.yearly {
            writer.serialize(GridRow {
                eth_price: eth,
                btc_price: btc,
                year: year.year,
                months: year.months,
                average_aum_usd: year.average_aum_usd,
                makina_fees_usd: year.makina_fees_usd(),
                fee_pct: year.fee_pct(),
            })?;
        }

        println!("{:>10.0} {:>10.0} {:>18.2} {:>18.2} {:>7.3}%",
            eth,
            btc,
            output.summary.final_aum_usd,
            output.summary.cumulative_fees_usd,
            output.summary.average_fee_pct,
        );
    }
    writer.flush()?;

    println!("\nResults written to: {}", cli.output.display());
    println!("Elapsed: {:.2?}", start.elapsed());
    Ok(())
}
