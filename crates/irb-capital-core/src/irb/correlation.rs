//! Asset correlation with the systematic factor (Basel corporate curve) and the
//! asset-value-correlation multiplier for financial institutions.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{ensure_pd, math};
use crate::types::Rate;
use crate::IrbResult;

/// Correlation at PD -> 0
pub const MAX_CORRELATION: Decimal = dec!(0.24);
/// Correlation at PD -> 1
pub const MIN_CORRELATION: Decimal = dec!(0.12);
/// Basel AVC uplift for large or unregulated financial institutions
pub const AVC_MULTIPLIER: Decimal = dec!(1.25);

const DECAY: Decimal = dec!(50);

/// Financial-institution flags that drive the AVC multiplier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionFlags {
    #[serde(default)]
    pub is_financial: bool,
    #[serde(default)]
    pub is_large_financial: bool,
    #[serde(default)]
    pub is_regulated: bool,
}

impl InstitutionFlags {
    /// Large financial institutions and unregulated financial entities attract
    /// the AVC uplift. Size alone triggers it even when regulated.
    pub fn requires_avc(&self) -> bool {
        self.is_financial && (self.is_large_financial || !self.is_regulated)
    }
}

/// Correlation breakdown for a single obligor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetCorrelation {
    pub base_correlation: Rate,
    pub avc_multiplier: Decimal,
    /// base_correlation * avc_multiplier
    pub correlation: Rate,
}

/// Basel corporate asset correlation:
/// R = 0.12 * f + 0.24 * (1 - f), f = (1 - e^(-50 PD)) / (1 - e^(-50)).
///
/// Strictly decreasing in PD and bounded in [0.12, 0.24].
pub fn base_correlation(pd: Rate) -> IrbResult<Rate> {
    ensure_pd(pd, "base_correlation")?;

    let numerator = Decimal::ONE - math::exp(-DECAY * pd, "base_correlation")?;
    let denominator = Decimal::ONE - math::exp(-DECAY, "base_correlation")?;
    let weight = numerator / denominator;

    Ok(MIN_CORRELATION * weight + MAX_CORRELATION * (Decimal::ONE - weight))
}

/// 1.25 when the institution flags require the AVC uplift, otherwise 1.0.
pub fn avc_multiplier(flags: &InstitutionFlags) -> Decimal {
    if flags.requires_avc() {
        AVC_MULTIPLIER
    } else {
        Decimal::ONE
    }
}

pub fn asset_correlation(pd: Rate, flags: &InstitutionFlags) -> IrbResult<AssetCorrelation> {
    let base = base_correlation(pd)?;
    let multiplier = avc_multiplier(flags);
    Ok(AssetCorrelation {
        base_correlation: base,
        avc_multiplier: multiplier,
        correlation: base * multiplier,
    })
}
