//! Makina Revenue CLI
//!
//! Command-line interface for running revenue projections

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use makina_revenue::machine::{base_case_machines, load_machines};
use makina_revenue::output::{write_csv_reports, write_json};
use makina_revenue::pricing::{DEFAULT_BTC_PRICE, DEFAULT_ETH_PRICE};
use makina_revenue::projection::DEFAULT_HORIZON_MONTHS;
use makina_revenue::request::{handle_request, ProjectionRequest};
use makina_revenue::{
    run_pipeline, AssumptionOverrides, CalendarMonth, MachineDefinition, PipelineOutput, PriceTable,
    ProjectionConfig,
};
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "makina_revenue")]
#[command(about = "Monthly and yearly revenue projections for Makina machines", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project AUM and fees and write reports
    Project(ProjectArgs),

    /// Run a JSON projection request file and print the JSON response
    Request {
        /// Path to the request JSON
        path: PathBuf,
    },

    /// List the machines that would be projected
    Machines {
        /// Machine file (.csv or .json); built-in base case when omitted
        #[arg(long)]
        machines: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ProjectArgs {
    /// Machine file (.csv or .json); built-in base case when omitted
    #[arg(long)]
    machines: Option<PathBuf>,

    /// ETH spot price in USD
    #[arg(long, default_value_t = DEFAULT_ETH_PRICE)]
    eth_price: f64,

    /// BTC spot price in USD
    #[arg(long, default_value_t = DEFAULT_BTC_PRICE)]
    btc_price: f64,

    /// Projection horizon in months
    #[arg(short, long, default_value_t = DEFAULT_HORIZON_MONTHS)]
    months: u32,

    /// First projected month (YYYY-MM); defaults to the current month
    #[arg(short, long)]
    start: Option<CalendarMonth>,

    /// Directory for CSV reports, or file path for JSON output
    #[arg(short, long, default_value = "projection_output")]
    output: PathBuf,

    /// Report format
    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,

    /// Override yield APR of every ETH machine
    #[arg(long)]
    yield_eth: Option<f64>,

    /// Override yield APR of every USD machine
    #[arg(long)]
    yield_usd: Option<f64>,

    /// Override yield APR of every BTC machine
    #[arg(long)]
    yield_btc: Option<f64>,

    /// Override monthly growth rate of every machine
    #[arg(long)]
    growth: Option<f64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Project(args) => project(args),
        Commands::Request { path } => request(&path),
        Commands::Machines { machines } => list_machines(machines.as_deref()),
    }
}

fn resolve_machines(path: Option<&Path>) -> Result<Vec<MachineDefinition>> {
    match path {
        Some(path) => load_machines(path)
            .with_context(|| format!("Failed to load machines from {}", path.display())),
        None => base_case_machines().context("Built-in base case is invalid"),
    }
}

fn project(args: ProjectArgs) -> Result<()> {
    let overrides = AssumptionOverrides {
        yield_eth: args.yield_eth,
        yield_usd: args.yield_usd,
        yield_btc: args.yield_btc,
        monthly_growth_rate: args.growth,
    };

    let machines = resolve_machines(args.machines.as_deref())?;
    let machines = overrides.apply(&machines).context("Invalid assumption override")?;
    let prices = PriceTable::from_spot(args.eth_price, args.btc_price).context("Invalid spot price")?;
    let config = ProjectionConfig::new(args.months, args.start.unwrap_or_else(CalendarMonth::current));

    if !(12..=60).contains(&config.horizon_months) {
        log::warn!("Horizon of {} months is outside the usual 12-60 range", config.horizon_months);
    }

    let output = run_pipeline(&machines, &config, &prices).context("Projection failed")?;
    print_report(&output);

    match args.format {
        Format::Csv => {
            write_csv_reports(&args.output, &output).context("Failed to write CSV reports")?;
            println!("\nReports written to: {}", args.output.display());
        }
        Format::Json => {
            let file = File::create(&args.output)
                .with_context(|| format!("Unable to create {}", args.output.display()))?;
            write_json(file, &output).context("Failed to write JSON output")?;
            println!("\nProjection written to: {}", args.output.display());
        }
    }
    Ok(())
}

fn request(path: &Path) -> Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Unable to read {}", path.display()))?;
    let request = ProjectionRequest::from_json(&json).context("Invalid request JSON")?;

    let response = handle_request(&request);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn list_machines(path: Option<&Path>) -> Result<()> {
    let machines = resolve_machines(path)?;

    println!("{:<12} {:>4} {:>8} {:>16} {:>7} {:>7} {:>7} {:>7}",
        "Machine", "Ccy", "Launch", "Initial AUM", "Growth", "Yield", "MgmtFee", "PerfFee");
    println!("{}", "-".repeat(78));
    for m in &machines {
        println!("{:<12} {:>4} {:>8} {:>16.2} {:>6.1}% {:>6.2}% {:>6.2}% {:>6.1}%",
            m.name(),
            m.currency(),
            m.launch_date().map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
            m.initial_aum(),
            m.monthly_growth_rate() * 100.0,
            m.yield_apr() * 100.0,
            m.management_fee_rate() * 100.0,
            m.performance_fee_rate() * 100.0,
        );
    }
    Ok(())
}

fn print_report(output: &PipelineOutput) {
    println!("Makina Revenue Projection");
    println!("=========================\n");
    println!("Start: {}  Horizon: {} months  Machines: {}",
        output.start_month, output.horizon_months, output.machines.len());
    println!();

    println!("{:>6} {:>7} {:>20} {:>20} {:>18} {:>18} {:>8}",
        "Year", "Months", "Avg AUM", "End AUM", "Mgmt Fees", "Perf Fees", "Fee %");
    println!("{}", "-".repeat(103));
    for y in &output.yearly {
        println!("{:>6} {:>7} {:>20.2} {:>20.2} {:>18.2} {:>18.2} {:>7.3}%",
            y.year,
            y.months,
            y.average_aum_usd,
            y.end_of_year_aum_usd,
            y.management_fees_makina_usd,
            y.performance_fees_makina_usd,
            y.fee_pct(),
        );
    }

    let summary = &output.summary;
    println!("\nSummary:");
    println!("  Total AUM (final month): ${:.2}", summary.final_aum_usd);
    println!("  Monthly Fees (final month): ${:.2}", summary.final_monthly_fees_usd);
    println!("  Annual Fees (projected): ${:.2}", summary.annualized_fees_usd);
    println!("  Avg Fee %: {:.3}%", summary.average_fee_pct);
    println!("  Cumulative Fees: ${:.2}", summary.cumulative_fees_usd);
}
