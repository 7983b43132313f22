use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use irb_capital_core::ratings::rating_from_pd;
use irb_capital_core::{calculate_ttc_pd, TtcPdInput};

use crate::input;

/// Arguments for through-the-cycle PD normalisation
#[derive(Args)]
pub struct TtcArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Point-in-time probability of default
    #[arg(long)]
    pub pd: Option<Decimal>,

    /// Macroeconomic index, 0 = deep recession, 1 = strong economy
    #[arg(long, alias = "macro-index")]
    pub macroeconomic_index: Option<Decimal>,

    /// Long-term average default rate
    #[arg(long)]
    pub long_term_average: Option<Decimal>,

    /// Industry cyclicality, 0 = acyclical
    #[arg(long)]
    pub cyclicality: Option<Decimal>,
}

pub fn run_ttc_pd(args: TtcArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let ttc_input: TtcPdInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        TtcPdInput {
            point_in_time_pd: args.pd.ok_or("--pd is required (or provide --input)")?,
            macroeconomic_index: args
                .macroeconomic_index
                .ok_or("--macroeconomic-index is required (or provide --input)")?,
            long_term_average: args
                .long_term_average
                .ok_or("--long-term-average is required (or provide --input)")?,
            cyclicality: args
                .cyclicality
                .ok_or("--cyclicality is required (or provide --input)")?,
        }
    };

    let ttc_pd = calculate_ttc_pd(&ttc_input)?;
    Ok(json!({
        "result": {
            "ttc_pd": ttc_pd,
            "point_in_time_pd": ttc_input.point_in_time_pd,
            "implied_rating": rating_from_pd(ttc_pd),
        }
    }))
}
