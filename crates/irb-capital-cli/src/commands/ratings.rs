use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use irb_capital_core::ratings::{lookup_rating_pd, pd_from_rating, rating_from_pd, RATING_SCALE};

/// Arguments for a rating to PD lookup
#[derive(Args)]
pub struct RatingPdArgs {
    /// Rating to look up; prints the whole master scale when omitted
    pub rating: Option<String>,
}

/// Arguments for a PD to rating lookup
#[derive(Args)]
pub struct PdRatingArgs {
    /// Probability of default
    #[arg(allow_hyphen_values = true)]
    pub pd: Decimal,
}

pub fn run_rating_pd(args: RatingPdArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let Some(rating) = args.rating else {
        let scale: Vec<Value> = RATING_SCALE
            .iter()
            .map(|(rating, pd)| json!({ "rating": rating, "pd": pd }))
            .collect();
        return Ok(json!({ "results": scale }));
    };

    let on_scale = lookup_rating_pd(&rating).is_some();
    let mut warnings = Vec::new();
    if !on_scale {
        warnings.push(format!("'{rating}' is not on the master scale; fallback PD used."));
    }

    Ok(json!({
        "result": {
            "rating": rating.trim().to_uppercase(),
            "pd": pd_from_rating(&rating),
            "on_scale": on_scale,
        },
        "warnings": warnings,
    }))
}

pub fn run_pd_rating(args: PdRatingArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if args.pd < Decimal::ZERO || args.pd > Decimal::ONE {
        return Err(format!("PD must be in [0, 1], got {}", args.pd).into());
    }
    Ok(json!({
        "result": {
            "pd": args.pd,
            "implied_rating": rating_from_pd(args.pd),
        }
    }))
}
