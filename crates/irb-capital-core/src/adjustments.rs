//! Manual RWA overrides and the layering engine that applies them.
//!
//! An exposure moves through at most three stages:
//!
//! ```text
//! Base --(counterparty adjustment)--> CounterpartyAdjusted --(portfolio adjustment)--> PortfolioAdjusted
//! ```
//!
//! Each stage is optional and re-bases on the value produced by the stage
//! before it. The base (model) RWA is kept as `original_rwa` whatever the
//! number of stages applied.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::IrbError;
use crate::types::{lenient, Money};
use crate::IrbResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Where an adjustment is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentScope {
    Counterparty,
    Portfolio,
}

/// Adjustment kind as it arrives on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentType {
    Absolute,
    Additive,
    Multiplicative,
    Percentage,
    #[serde(other)]
    Unknown,
}

/// Stored adjustment record.
///
/// `value` carries the type-specific amount; `adjusted_rwa`, `adjustment` and
/// `multiplier` are the dedicated fields for absolute, additive and
/// multiplicative overrides and win over `value` when present. Numeric fields
/// deserialise leniently so a malformed amount degrades to "absent".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentRecord {
    #[serde(rename = "type")]
    pub adjustment_type: AdjustmentType,
    #[serde(default, deserialize_with = "lenient::decimal", skip_serializing_if = "Option::is_none")]
    pub value: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::decimal", skip_serializing_if = "Option::is_none")]
    pub adjusted_rwa: Option<Money>,
    #[serde(default, deserialize_with = "lenient::decimal", skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<Money>,
    #[serde(default, deserialize_with = "lenient::decimal", skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<Decimal>,
    #[serde(default)]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Typed RWA transform, one variant per adjustment kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RwaTransform {
    /// Replace the RWA with a target value
    Absolute { target: Money },
    /// Add a delta (may be negative)
    Additive { delta: Money },
    /// Scale by a multiplier
    Multiplicative { multiplier: Decimal },
    /// Scale by (1 + percent / 100)
    Percentage { percent: Decimal },
}

/// Stage reached by the layering engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentStage {
    Base,
    CounterpartyAdjusted,
    PortfolioAdjusted,
}

/// Outcome of layering adjustments onto a base RWA.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayeredRwa {
    pub rwa: Money,
    /// Base RWA; only populated when at least one stage ran
    pub original_rwa: Option<Money>,
    pub has_adjustment: bool,
    pub has_portfolio_adjustment: bool,
    pub stage: AdjustmentStage,
}

// ---------------------------------------------------------------------------
// Record construction / resolution
// ---------------------------------------------------------------------------

impl AdjustmentRecord {
    fn new(adjustment_type: AdjustmentType, value: Decimal, reason: impl Into<String>) -> Self {
        AdjustmentRecord {
            adjustment_type,
            value: Some(value),
            adjusted_rwa: None,
            adjustment: None,
            multiplier: None,
            reason: reason.into(),
            timestamp: Some(Utc::now()),
        }
    }

    pub fn absolute(target: Money, reason: impl Into<String>) -> Self {
        AdjustmentRecord {
            adjusted_rwa: Some(target),
            ..Self::new(AdjustmentType::Absolute, target, reason)
        }
    }

    pub fn additive(delta: Money, reason: impl Into<String>) -> Self {
        AdjustmentRecord {
            adjustment: Some(delta),
            ..Self::new(AdjustmentType::Additive, delta, reason)
        }
    }

    pub fn multiplicative(multiplier: Decimal, reason: impl Into<String>) -> Self {
        AdjustmentRecord {
            multiplier: Some(multiplier),
            ..Self::new(AdjustmentType::Multiplicative, multiplier, reason)
        }
    }

    pub fn percentage(percent: Decimal, reason: impl Into<String>) -> Self {
        Self::new(AdjustmentType::Percentage, percent, reason)
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Resolve the record into a typed transform.
    pub fn resolve(&self) -> IrbResult<RwaTransform> {
        let amount = |specific: Option<Decimal>, field: &str| {
            specific.or(self.value).ok_or_else(|| IrbError::InvalidInput {
                field: field.to_string(),
                reason: format!(
                    "{:?} adjustment has no numeric value (reason: '{}')",
                    self.adjustment_type, self.reason
                ),
            })
        };

        match self.adjustment_type {
            AdjustmentType::Absolute => Ok(RwaTransform::Absolute {
                target: amount(self.adjusted_rwa, "adjusted_rwa")?,
            }),
            AdjustmentType::Additive => Ok(RwaTransform::Additive {
                delta: amount(self.adjustment, "adjustment")?,
            }),
            AdjustmentType::Multiplicative => Ok(RwaTransform::Multiplicative {
                multiplier: amount(self.multiplier, "multiplier")?,
            }),
            AdjustmentType::Percentage => Ok(RwaTransform::Percentage {
                percent: amount(None, "value")?,
            }),
            AdjustmentType::Unknown => Err(IrbError::InvalidInput {
                field: "type".into(),
                reason: format!("unrecognised adjustment type (reason: '{}')", self.reason),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Layering engine
// ---------------------------------------------------------------------------

/// Apply one transform to the RWA entering a stage.
///
/// Overflow of the 96-bit Decimal mantissa is a domain error, not a panic.
pub fn apply_adjustment(current: Money, transform: &RwaTransform) -> IrbResult<Money> {
    let applied = match *transform {
        RwaTransform::Absolute { target } => Some(target),
        RwaTransform::Additive { delta } => current.checked_add(delta),
        RwaTransform::Multiplicative { multiplier } => current.checked_mul(multiplier),
        RwaTransform::Percentage { percent } => {
            (Decimal::ONE + percent / dec!(100)).checked_mul(current)
        }
    };
    applied.ok_or_else(|| {
        IrbError::domain(
            "apply_adjustment",
            format!("{transform:?} applied to RWA {current} overflows"),
        )
    })
}

/// Run Base -> CounterpartyAdjusted -> PortfolioAdjusted, skipping absent stages.
pub fn layer_adjustments(
    base_rwa: Money,
    counterparty: Option<&RwaTransform>,
    portfolio: Option<&RwaTransform>,
) -> IrbResult<LayeredRwa> {
    let mut layered = LayeredRwa {
        rwa: base_rwa,
        original_rwa: None,
        has_adjustment: false,
        has_portfolio_adjustment: false,
        stage: AdjustmentStage::Base,
    };

    if let Some(transform) = counterparty {
        layered.original_rwa = Some(base_rwa);
        layered.rwa = apply_adjustment(layered.rwa, transform)?;
        layered.has_adjustment = true;
        layered.stage = AdjustmentStage::CounterpartyAdjusted;
    }

    if let Some(transform) = portfolio {
        // Without a counterparty stage the entering value is still the base.
        if layered.original_rwa.is_none() {
            layered.original_rwa = Some(layered.rwa);
        }
        layered.rwa = apply_adjustment(layered.rwa, transform)?;
        layered.has_portfolio_adjustment = true;
        layered.stage = AdjustmentStage::PortfolioAdjusted;
    }

    Ok(layered)
}

/// Resolve an optional stored record, turning parse failures into a warning
/// and an absent stage.
pub(crate) fn resolve_stage(
    record: Option<&AdjustmentRecord>,
    scope: AdjustmentScope,
    warnings: &mut Vec<String>,
) -> Option<RwaTransform> {
    let record = record?;
    match record.resolve() {
        Ok(transform) => Some(transform),
        Err(e) => {
            tracing::warn!(?scope, error = %e, "ignoring unparseable adjustment");
            warnings.push(format!("{scope:?} adjustment ignored: {e}"));
            None
        }
    }
}
