//! Basel maturity adjustment.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{ensure_pd, math};
use crate::types::{Rate, Years};
use crate::IrbResult;

pub const MIN_MATURITY: Years = dec!(1);
pub const MAX_MATURITY: Years = dec!(5);
const REFERENCE_MATURITY: Years = dec!(2.5);

/// Maturity adjustment with the inputs that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaturityAdjustment {
    /// Maturity after clamping to [1, 5] years
    pub effective_maturity: Years,
    /// b = (0.11852 - 0.05478 ln PD)^2
    pub slope: Decimal,
    pub adjustment: Decimal,
}

pub fn effective_maturity(maturity: Years) -> Years {
    maturity.max(MIN_MATURITY).min(MAX_MATURITY)
}

/// Maturity slope b(PD). Depends on PD only.
pub fn maturity_slope(pd: Rate) -> IrbResult<Decimal> {
    ensure_pd(pd, "maturity_slope")?;
    let base = dec!(0.11852) - dec!(0.05478) * math::ln(pd, "maturity_slope")?;
    Ok(base * base)
}

/// (1 + (M - 2.5) b) / (1 - 1.5 b), with M clamped to [1, 5].
pub fn maturity_adjustment(pd: Rate, maturity: Years) -> IrbResult<MaturityAdjustment> {
    let b = maturity_slope(pd)?;
    let m = effective_maturity(maturity);

    // b < 2/3 for every PD in (0, 1); the denominator cannot reach zero.
    let adjustment = (Decimal::ONE + (m - REFERENCE_MATURITY) * b) / (Decimal::ONE - dec!(1.5) * b);

    Ok(MaturityAdjustment {
        effective_maturity: m,
        slope: b,
        adjustment,
    })
}
