//! Basel A-IRB formula chain.
//!
//! Leaf-first: `normal` -> `correlation`, `maturity`, `ttc` -> `capital` -> `rwa`.

pub mod capital;
pub mod correlation;
pub mod maturity;
pub(crate) mod math;
pub mod normal;
pub mod rwa;
pub mod ttc;

use rust_decimal::Decimal;

use crate::error::IrbError;
use crate::types::Rate;
use crate::IrbResult;

/// PDs feed `ln` and the inverse normal, both undefined at 0 and 1.
pub(crate) fn ensure_pd(pd: Rate, function: &str) -> IrbResult<()> {
    if pd <= Decimal::ZERO || pd >= Decimal::ONE {
        return Err(IrbError::domain(
            function,
            format!("PD must lie strictly inside (0, 1), got {pd}"),
        ));
    }
    Ok(())
}
