//! Through-the-cycle PD normalisation.
//!
//! Scales the point-in-time PD by how far the economy sits from mid-cycle
//! (weighted by industry cyclicality) and blends the result 70/30 with the
//! long-term average default rate.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::IrbError;
use crate::types::Rate;
use crate::IrbResult;

/// Lowest TTC PD the normaliser will emit (one basis point).
pub const TTC_PD_FLOOR: Rate = dec!(0.0001);

const MID_CYCLE: Decimal = dec!(0.5);
const PIT_WEIGHT: Decimal = dec!(0.7);
const LONG_TERM_WEIGHT: Decimal = dec!(0.3);

/// Inputs to the TTC normaliser.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TtcPdInput {
    pub point_in_time_pd: Rate,
    /// 0 = deep recession, 1 = strong economy
    pub macroeconomic_index: Decimal,
    pub long_term_average: Rate,
    /// Industry sensitivity to the cycle, 0 = acyclical
    pub cyclicality: Decimal,
}

/// Derive the through-the-cycle PD.
///
/// ```text
/// adjustment = 1 + (0.5 - macro_index) * cyclicality * 2
/// ttc_pd     = clamp(pit_pd * adjustment * 0.7 + long_term_average * 0.3, 0.0001, 1)
/// ```
pub fn calculate_ttc_pd(input: &TtcPdInput) -> IrbResult<Rate> {
    validate_ttc_input(input)?;

    let economic_deviation = MID_CYCLE - input.macroeconomic_index;
    let adjustment = Decimal::ONE + economic_deviation * input.cyclicality * dec!(2);
    let ttc_raw = input.point_in_time_pd * adjustment;
    let blended = ttc_raw * PIT_WEIGHT + input.long_term_average * LONG_TERM_WEIGHT;

    let ttc_pd = blended.max(TTC_PD_FLOOR).min(Decimal::ONE);
    tracing::debug!(
        pit_pd = %input.point_in_time_pd,
        macro_index = %input.macroeconomic_index,
        %ttc_pd,
        "normalised TTC PD"
    );
    Ok(ttc_pd)
}

fn validate_ttc_input(input: &TtcPdInput) -> IrbResult<()> {
    if input.point_in_time_pd <= Decimal::ZERO || input.point_in_time_pd >= Decimal::ONE {
        return Err(IrbError::InvalidInput {
            field: "point_in_time_pd".into(),
            reason: "Point-in-time PD must lie strictly inside (0, 1).".into(),
        });
    }
    if input.macroeconomic_index < Decimal::ZERO || input.macroeconomic_index > Decimal::ONE {
        return Err(IrbError::InvalidInput {
            field: "macroeconomic_index".into(),
            reason: "Macroeconomic index must be in [0, 1].".into(),
        });
    }
    if input.long_term_average <= Decimal::ZERO || input.long_term_average >= Decimal::ONE {
        return Err(IrbError::InvalidInput {
            field: "long_term_average".into(),
            reason: "Long-term average default rate must lie strictly inside (0, 1).".into(),
        });
    }
    if input.cyclicality < Decimal::ZERO || input.cyclicality > Decimal::ONE {
        return Err(IrbError::InvalidInput {
            field: "cyclicality".into(),
            reason: "Cyclicality must be in [0, 1].".into(),
        });
    }
    Ok(())
}
