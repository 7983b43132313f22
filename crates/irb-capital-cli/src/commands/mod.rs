pub mod portfolio;
pub mod ratings;
pub mod rwa;
pub mod ttc;

use clap::Args;

use irb_capital_core::validation::{OutOfRangePd, ValidationPolicy};

use crate::input;

/// Validation policy flags shared by the RWA commands
#[derive(Args)]
pub struct PolicyArgs {
    /// Path to a JSON or YAML validation policy
    #[arg(long)]
    pub policy: Option<String>,

    /// Reject missing or out-of-range inputs instead of substituting defaults
    #[arg(long, conflicts_with = "clamp_pd")]
    pub strict: bool,

    /// Clamp out-of-range PDs into [0.0001, 0.9999] instead of rejecting them
    #[arg(long)]
    pub clamp_pd: bool,
}

impl PolicyArgs {
    /// Resolve the policy: file first, then flag overrides.
    /// `None` when no policy flag was given.
    pub fn resolve(&self) -> Result<Option<ValidationPolicy>, Box<dyn std::error::Error>> {
        let mut policy: Option<ValidationPolicy> = match self.policy {
            Some(ref path) => Some(input::file::read_input(path)?),
            None => None,
        };

        if self.strict {
            let defaults = policy.map(|p| p.defaults).unwrap_or_default();
            policy = Some(ValidationPolicy {
                defaults,
                ..ValidationPolicy::strict()
            });
        }
        if self.clamp_pd {
            let mut p = policy.unwrap_or_default();
            p.out_of_range_pd = OutOfRangePd::Clamp;
            policy = Some(p);
        }

        Ok(policy)
    }
}
