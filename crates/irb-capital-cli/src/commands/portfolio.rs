use clap::Args;
use serde_json::Value;

use irb_capital_core::portfolio::{calculate_portfolio_rwa, PortfolioInput};

use super::PolicyArgs;
use crate::input;

/// Arguments for a portfolio RWA run
#[derive(Args)]
pub struct PortfolioArgs {
    /// Path to a JSON or YAML book: `{ "counterparties": [...], "policy": {...} }`
    #[arg(long)]
    pub input: Option<String>,

    /// Re-derive TTC PD from the cycle inputs even when a stored value exists
    #[arg(long)]
    pub refresh_ttc: bool,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

pub fn run_portfolio(args: PortfolioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut book: PortfolioInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input file (or piped stdin) is required for a portfolio run".into());
    };

    if let Some(policy) = args.policy.resolve()? {
        book.policy = policy;
    }

    book.refresh_ttc_pds(args.refresh_ttc);

    let result = calculate_portfolio_rwa(&book)?;
    Ok(serde_json::to_value(result)?)
}
