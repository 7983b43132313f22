//! Vasicek single-factor capital requirement K.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::normal::{normal_cdf, normal_inverse};
use super::{ensure_pd, math};
use crate::error::IrbError;
use crate::types::Rate;
use crate::IrbResult;

/// Supervisory confidence level for the systematic factor.
pub const CONFIDENCE_LEVEL: Decimal = dec!(0.999);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapitalRequirement {
    /// PD conditional on the 99.9th percentile systematic shock
    pub conditional_pd: Rate,
    /// LGD * conditional PD * maturity adjustment
    pub k: Rate,
}

/// K = LGD * N((N^-1(PD) + sqrt(R) * N^-1(0.999)) / sqrt(1 - R)) * MA
pub fn capital_requirement(
    pd: Rate,
    lgd: Rate,
    correlation: Rate,
    maturity_adjustment: Decimal,
) -> IrbResult<CapitalRequirement> {
    ensure_pd(pd, "capital_requirement")?;
    if correlation < Decimal::ZERO || correlation >= Decimal::ONE {
        return Err(IrbError::domain(
            "capital_requirement",
            format!("correlation must lie in [0, 1), got {correlation}"),
        ));
    }

    let sqrt_r = math::sqrt(correlation, "capital_requirement")?;
    let sqrt_one_minus_r = math::sqrt(Decimal::ONE - correlation, "capital_requirement")?;
    let z = (normal_inverse(pd)? + sqrt_r * normal_inverse(CONFIDENCE_LEVEL)?) / sqrt_one_minus_r;
    let conditional_pd = normal_cdf(z);

    Ok(CapitalRequirement {
        conditional_pd,
        k: lgd * conditional_pd * maturity_adjustment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Decimal, b: Decimal, eps: Decimal) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_reference_k() {
        // PD 1%, LGD 45%, R from the corporate curve, MA at 2.5 years
        let cr = capital_requirement(dec!(0.01), dec!(0.45), dec!(0.192783679165516), dec!(1.2598095009238282))
            .unwrap();
        assert!(approx_eq(cr.k, dec!(0.079522599), dec!(0.000001)), "K = {}", cr.k);
    }

    #[test]
    fn test_zero_correlation_returns_unconditional_pd() {
        let cr = capital_requirement(dec!(0.03), Decimal::ONE, Decimal::ZERO, Decimal::ONE).unwrap();
        assert!(approx_eq(cr.conditional_pd, dec!(0.03), dec!(0.000002)));
    }

    #[test]
    fn test_conditional_pd_exceeds_pd() {
        let cr = capital_requirement(dec!(0.02), dec!(0.45), dec!(0.16), Decimal::ONE).unwrap();
        assert!(cr.conditional_pd > dec!(0.02));
    }

    #[test]
    fn test_k_linear_in_lgd() {
        let a = capital_requirement(dec!(0.02), dec!(0.2), dec!(0.16), Decimal::ONE).unwrap();
        let b = capital_requirement(dec!(0.02), dec!(0.4), dec!(0.16), Decimal::ONE).unwrap();
        assert!(approx_eq(b.k, a.k * dec!(2), dec!(0.0000000001)));
    }

    #[test]
    fn test_rejects_unit_correlation() {
        let err = capital_requirement(dec!(0.02), dec!(0.45), Decimal::ONE, Decimal::ONE).unwrap_err();
        assert!(err.is_domain_error());
    }

    #[test]
    fn test_rejects_pd_of_one() {
        let err = capital_requirement(Decimal::ONE, dec!(0.45), dec!(0.12), Decimal::ONE).unwrap_err();
        assert!(err.is_domain_error());
    }
}
