use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values (EAD, RWA). Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Probabilities and ratios expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Lenient numeric deserialisation for fields fed by upstream records.
///
/// Accepts JSON numbers and numeric strings. Anything else (null, empty or
/// non-numeric strings, booleans, objects) deserialises to `None` so the
/// validation policy can decide what a missing value means.
pub mod lenient {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use std::str::FromStr;

    pub fn decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(parse(&value))
    }

    pub fn parse(value: &Value) -> Option<Decimal> {
        match value {
            Value::Number(n) => parse_str(&n.to_string()),
            Value::String(s) => parse_str(s.trim()),
            _ => None,
        }
    }

    fn parse_str(s: &str) -> Option<Decimal> {
        if s.is_empty() {
            return None;
        }
        Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::lenient;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_lenient_accepts_numbers_and_strings() {
        assert_eq!(lenient::parse(&json!(0.45)), Some(dec!(0.45)));
        assert_eq!(lenient::parse(&json!("1000000")), Some(dec!(1000000)));
        assert_eq!(lenient::parse(&json!(" 2.5 ")), Some(dec!(2.5)));
        assert_eq!(lenient::parse(&json!("1e-4")), Some(dec!(0.0001)));
    }

    #[test]
    fn test_lenient_rejects_non_numeric() {
        assert_eq!(lenient::parse(&json!("n/a")), None);
        assert_eq!(lenient::parse(&json!("")), None);
        assert_eq!(lenient::parse(&json!(null)), None);
        assert_eq!(lenient::parse(&json!(true)), None);
    }
}
