//! Input validation policy.
//!
//! Upstream counterparty records are frequently incomplete. Whether a missing
//! LGD becomes 45% or a rejected computation is a policy decision, so it is
//! passed explicitly to every entry point instead of being hard-coded.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::IrbError;
use crate::types::{Money, Rate, Years};
use crate::IrbResult;

/// Lowest PD produced when clamping.
pub const PD_CLAMP_FLOOR: Rate = dec!(0.0001);
/// Highest PD produced when clamping.
pub const PD_CLAMP_CEILING: Rate = dec!(0.9999);

/// What to do when a numeric input is absent or non-numeric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingInput {
    /// Use the documented default and record a warning
    #[default]
    Substitute,
    /// Reject the computation
    Reject,
}

/// What to do with a PD outside the open interval (0, 1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfRangePd {
    /// Fail with a domain error
    #[default]
    Reject,
    /// Clamp into [0.0001, 0.9999] and record a warning
    Clamp,
}

/// Substitution values for missing inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputDefaults {
    pub pd: Rate,
    pub lgd: Rate,
    pub maturity: Years,
    pub ead: Money,
}

impl Default for InputDefaults {
    fn default() -> Self {
        InputDefaults {
            pd: dec!(0.01),
            lgd: dec!(0.45),
            maturity: dec!(2.5),
            ead: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    #[serde(default)]
    pub missing_input: MissingInput,
    #[serde(default)]
    pub out_of_range_pd: OutOfRangePd,
    #[serde(default)]
    pub defaults: InputDefaults,
}

impl ValidationPolicy {
    /// Reject anything missing or out of range.
    pub fn strict() -> Self {
        ValidationPolicy {
            missing_input: MissingInput::Reject,
            out_of_range_pd: OutOfRangePd::Reject,
            defaults: InputDefaults::default(),
        }
    }

    /// Resolve an optional numeric field against its default.
    pub fn require(
        &self,
        value: Option<Decimal>,
        field: &str,
        default: Decimal,
        warnings: &mut Vec<String>,
    ) -> IrbResult<Decimal> {
        match (value, self.missing_input) {
            (Some(v), _) => Ok(v),
            (None, MissingInput::Substitute) => {
                tracing::warn!(field, %default, "missing numeric input substituted");
                warnings.push(format!(
                    "{field} missing or non-numeric; substituted default {default}."
                ));
                Ok(default)
            }
            (None, MissingInput::Reject) => Err(IrbError::InvalidInput {
                field: field.to_string(),
                reason: "Value is missing or non-numeric.".into(),
            }),
        }
    }

    /// Enforce the (0, 1) PD domain.
    pub fn check_pd(&self, pd: Rate, field: &str, warnings: &mut Vec<String>) -> IrbResult<Rate> {
        if pd > Decimal::ZERO && pd < Decimal::ONE {
            return Ok(pd);
        }
        match self.out_of_range_pd {
            OutOfRangePd::Reject => Err(IrbError::DomainError {
                function: "calculate_rwa".into(),
                reason: format!("{field} = {pd} lies outside the open interval (0, 1)"),
            }),
            OutOfRangePd::Clamp => {
                let clamped = pd.max(PD_CLAMP_FLOOR).min(PD_CLAMP_CEILING);
                warnings.push(format!("{field} = {pd} clamped to {clamped}."));
                Ok(clamped)
            }
        }
    }

    /// LGD must be a fraction in [0, 1].
    pub fn check_lgd(&self, lgd: Rate) -> IrbResult<Rate> {
        if lgd < Decimal::ZERO || lgd > Decimal::ONE {
            return Err(IrbError::InvalidInput {
                field: "lgd".into(),
                reason: format!("Loss given default must be in [0, 1], got {lgd}."),
            });
        }
        Ok(lgd)
    }

    pub fn check_ead(&self, ead: Money) -> IrbResult<Money> {
        if ead < Decimal::ZERO {
            return Err(IrbError::InvalidInput {
                field: "ead".into(),
                reason: format!("Exposure at default cannot be negative, got {ead}."),
            });
        }
        Ok(ead)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_records_warning() {
        let policy = ValidationPolicy::default();
        let mut warnings = Vec::new();
        let lgd = policy.require(None, "lgd", policy.defaults.lgd, &mut warnings).unwrap();
        assert_eq!(lgd, dec!(0.45));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_present_value_passes_through() {
        let policy = ValidationPolicy::strict();
        let mut warnings = Vec::new();
        let v = policy.require(Some(dec!(3)), "maturity", dec!(2.5), &mut warnings).unwrap();
        assert_eq!(v, dec!(3));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_strict_rejects_missing() {
        let policy = ValidationPolicy::strict();
        let mut warnings = Vec::new();
        assert!(policy.require(None, "ead", Decimal::ZERO, &mut warnings).is_err());
    }

    #[test]
    fn test_pd_reject_and_clamp() {
        let mut warnings = Vec::new();
        let reject = ValidationPolicy::default();
        assert!(reject.check_pd(Decimal::ONE, "pd", &mut warnings).unwrap_err().is_domain_error());

        let clamp = ValidationPolicy {
            out_of_range_pd: OutOfRangePd::Clamp,
            ..ValidationPolicy::default()
        };
        assert_eq!(clamp.check_pd(Decimal::ONE, "pd", &mut warnings).unwrap(), PD_CLAMP_CEILING);
        assert_eq!(clamp.check_pd(dec!(-0.2), "pd", &mut warnings).unwrap(), PD_CLAMP_FLOOR);
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_policy_deserialises_with_defaults() {
        let policy: ValidationPolicy =
            serde_json::from_str(r#"{ "missing_input": "reject" }"#).unwrap();
        assert_eq!(policy.missing_input, MissingInput::Reject);
        assert_eq!(policy.out_of_range_pd, OutOfRangePd::Reject);
        assert_eq!(policy.defaults, InputDefaults::default());
    }
}
