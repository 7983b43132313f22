use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use irb_capital_core::adjustments::{AdjustmentRecord, AdjustmentScope};
use irb_capital_core::irb::correlation::InstitutionFlags;
use irb_capital_core::{calculate_rwa, Counterparty};

use super::PolicyArgs;
use crate::input;

/// Arguments for a single-counterparty RWA calculation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CalculateArgs {
    /// Path to a JSON or YAML counterparty record (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Counterparty identifier
    #[arg(long)]
    pub id: Option<String>,

    /// Point-in-time probability of default
    #[arg(long)]
    pub pd: Option<Decimal>,

    /// Through-the-cycle PD (derived from the cycle inputs when omitted)
    #[arg(long)]
    pub ttc_pd: Option<Decimal>,

    /// Loss given default
    #[arg(long)]
    pub lgd: Option<Decimal>,

    /// Exposure at default
    #[arg(long)]
    pub ead: Option<Decimal>,

    /// Effective maturity in years
    #[arg(long)]
    pub maturity: Option<Decimal>,

    /// Macroeconomic index, 0 = deep recession, 1 = strong economy
    #[arg(long, alias = "macro-index")]
    pub macroeconomic_index: Option<Decimal>,

    /// Long-term average default rate
    #[arg(long)]
    pub long_term_average: Option<Decimal>,

    /// Industry cyclicality, 0 = acyclical
    #[arg(long)]
    pub cyclicality: Option<Decimal>,

    /// External credit rating (e.g. BBB+)
    #[arg(long)]
    pub rating: Option<String>,

    /// Feed the rating PD to the model
    #[arg(long)]
    pub use_rating_pd: bool,

    /// Counterparty is a financial institution
    #[arg(long)]
    pub financial: bool,

    /// Counterparty is a large financial institution
    #[arg(long)]
    pub large_financial: bool,

    /// Counterparty is a regulated financial institution
    #[arg(long)]
    pub regulated: bool,

    /// Counterparty-level adjustment as TYPE:VALUE
    /// (absolute, additive, multiplicative, percentage)
    #[arg(long, value_parser = parse_adjustment)]
    pub adjustment: Option<AdjustmentRecord>,

    /// Portfolio-level adjustment as TYPE:VALUE
    #[arg(long, value_parser = parse_adjustment)]
    pub portfolio_adjustment: Option<AdjustmentRecord>,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

pub fn run_calculate(args: CalculateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut counterparty: Counterparty = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        counterparty_from_flags(&args)
    };

    if counterparty.ttc_pd.is_none() {
        counterparty.refresh_ttc_pd()?;
    }

    let policy = args.policy.resolve()?.unwrap_or_default();
    let result = calculate_rwa(&counterparty, &policy)?;
    Ok(serde_json::to_value(result)?)
}

fn counterparty_from_flags(args: &CalculateArgs) -> Counterparty {
    let mut counterparty = Counterparty {
        id: args.id.clone(),
        pd: args.pd,
        ttc_pd: args.ttc_pd,
        lgd: args.lgd,
        ead: args.ead,
        maturity: args.maturity,
        macroeconomic_index: args.macroeconomic_index,
        long_term_average: args.long_term_average,
        cyclicality: args.cyclicality,
        institution: InstitutionFlags {
            is_financial: args.financial,
            is_large_financial: args.large_financial,
            is_regulated: args.regulated,
        },
        use_cred_rating_pd: args.use_rating_pd,
        ..Counterparty::default()
    };

    if let Some(ref rating) = args.rating {
        counterparty.assign_rating(rating);
    }
    if let Some(ref record) = args.adjustment {
        counterparty.attach_adjustment(AdjustmentScope::Counterparty, record.clone());
    }
    if let Some(ref record) = args.portfolio_adjustment {
        counterparty.attach_adjustment(AdjustmentScope::Portfolio, record.clone());
    }
    counterparty
}

fn parse_adjustment(s: &str) -> Result<AdjustmentRecord, String> {
    let (kind, value) = s
        .split_once(':')
        .ok_or_else(|| format!("expected TYPE:VALUE, got '{s}'"))?;
    let value: Decimal = value
        .trim()
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;

    let reason = "command line";
    match kind.trim().to_ascii_lowercase().as_str() {
        "absolute" => Ok(AdjustmentRecord::absolute(value, reason)),
        "additive" => Ok(AdjustmentRecord::additive(value, reason)),
        "multiplicative" => Ok(AdjustmentRecord::multiplicative(value, reason)),
        "percentage" => Ok(AdjustmentRecord::percentage(value, reason)),
        other => Err(format!(
            "unknown adjustment type '{other}' (absolute, additive, multiplicative, percentage)"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use irb_capital_core::adjustments::RwaTransform;
    use rust_decimal::Decimal;

    #[test]
    fn test_parse_adjustment() {
        let record = parse_adjustment("multiplicative:1.1").unwrap();
        assert_eq!(
            record.resolve().unwrap(),
            RwaTransform::Multiplicative {
                multiplier: Decimal::new(11, 1)
            }
        );
        let record = parse_adjustment("Additive: -500").unwrap();
        assert_eq!(
            record.resolve().unwrap(),
            RwaTransform::Additive {
                delta: Decimal::from(-500)
            }
        );
    }

    #[derive(clap::Parser)]
    struct Harness {
        #[command(flatten)]
        args: CalculateArgs,
    }

    fn flags(argv: &[&str]) -> Counterparty {
        use clap::Parser;
        let harness = Harness::try_parse_from(std::iter::once("rwa").chain(argv.iter().copied()))
            .unwrap();
        counterparty_from_flags(&harness.args)
    }

    #[test]
    fn test_institution_flags_pass_through_unchanged() {
        let cp = flags(&["--pd", "0.01", "--large-financial", "--regulated"]);
        assert!(!cp.institution.is_financial);
        assert!(cp.institution.is_large_financial);
        assert!(!cp.institution.requires_avc());

        let cp = flags(&["--pd", "0.01", "--financial", "--large-financial", "--regulated"]);
        assert!(cp.institution.requires_avc());
    }

    #[test]
    fn test_rating_and_adjustment_flags() {
        let cp = flags(&["--rating", "bbb", "--use-rating-pd", "--adjustment", "percentage:-10"]);
        assert_eq!(cp.credit_rating.as_deref(), Some("BBB"));
        assert_eq!(cp.credit_rating_pd, Some(Decimal::new(30, 4)));
        assert!(cp.use_cred_rating_pd);
        assert!(cp.rwa_adjustment.is_some());
        assert!(cp.portfolio_rwa_adjustment.is_none());
    }

    #[test]
    fn test_parse_adjustment_rejects_garbage() {
        assert!(parse_adjustment("1.1").is_err());
        assert!(parse_adjustment("floor:100").is_err());
        assert!(parse_adjustment("absolute:lots").is_err());
    }
}
