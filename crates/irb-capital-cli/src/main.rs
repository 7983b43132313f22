mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::portfolio::PortfolioArgs;
use commands::ratings::{PdRatingArgs, RatingPdArgs};
use commands::rwa::CalculateArgs;
use commands::ttc::TtcArgs;

/// Basel A-IRB risk-weighted asset calculations
#[derive(Parser)]
#[command(
    name = "rwa",
    version,
    about = "Basel A-IRB risk-weighted asset calculations",
    long_about = "A CLI for computing Basel A-IRB capital with decimal precision. \
                  Covers asset correlation with the AVC uplift, maturity adjustment, \
                  through-the-cycle PD normalisation, the Vasicek capital requirement, \
                  layered manual RWA adjustments and portfolio aggregation."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log calculation steps to stderr (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate RWA for a single counterparty
    Calculate(CalculateArgs),
    /// Normalise a point-in-time PD to a through-the-cycle PD
    TtcPd(TtcArgs),
    /// Calculate RWA for every counterparty in a book and aggregate
    Portfolio(PortfolioArgs),
    /// Look up the master-scale PD for a rating
    RatingPd(RatingPdArgs),
    /// Map a PD to the closest master-scale rating
    PdRating(PdRatingArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "irb_capital_core=debug,info",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calculate(args) => commands::rwa::run_calculate(args),
        Commands::TtcPd(args) => commands::ttc::run_ttc_pd(args),
        Commands::Portfolio(args) => commands::portfolio::run_portfolio(args),
        Commands::RatingPd(args) => commands::ratings::run_rating_pd(args),
        Commands::PdRating(args) => commands::ratings::run_pd_rating(args),
        Commands::Version => {
            println!("rwa {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
