//! Standard normal distribution approximations.
//!
//! * `normal_cdf` -- Abramowitz & Stegun 26.2.17 (|error| < 7.5e-8)
//! * `normal_inverse` -- Beasley & Springer rational approximation (AS 111)
//!
//! Both stay in `Decimal`. The inverse rejects p outside (0, 1) with a domain
//! error.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::math;
use crate::error::IrbError;
use crate::IrbResult;

const SQRT_2PI: Decimal = dec!(2.506628274631000502415765285);

// 26.2.17 coefficients
const P: Decimal = dec!(0.2316419);
const B1: Decimal = dec!(0.319381530);
const B2: Decimal = dec!(-0.356563782);
const B3: Decimal = dec!(1.781477937);
const B4: Decimal = dec!(-1.821255978);
const B5: Decimal = dec!(1.330274429);

// AS 111 central region, |p - 0.5| <= 0.42
const SPLIT: Decimal = dec!(0.42);
const A0: Decimal = dec!(2.50662823884);
const A1: Decimal = dec!(-18.61500062529);
const A2: Decimal = dec!(41.39119773534);
const A3: Decimal = dec!(-25.44106049637);
const BB1: Decimal = dec!(-8.47351093090);
const BB2: Decimal = dec!(23.08336743743);
const BB3: Decimal = dec!(-21.06224101826);
const BB4: Decimal = dec!(3.13082909833);

// AS 111 tails, r = sqrt(-ln(min(p, 1 - p)))
const C0: Decimal = dec!(-2.78718931138);
const C1: Decimal = dec!(-2.29796479134);
const C2: Decimal = dec!(4.85014127135);
const C3: Decimal = dec!(2.32121276858);
const D1: Decimal = dec!(3.54388924762);
const D2: Decimal = dec!(1.63706781897);

/// Beyond this many standard deviations the CDF is 0 or 1 to Decimal precision
/// for every purpose in this crate.
const CDF_CUTOFF: Decimal = dec!(10);

/// Past this |x| the density is below the smallest positive Decimal (1e-28).
const PDF_CUTOFF: Decimal = dec!(12);

/// Standard normal density.
pub fn normal_pdf(x: Decimal) -> Decimal {
    if x.abs() >= PDF_CUTOFF {
        return Decimal::ZERO;
    }
    // Non-positive exponent: exp cannot overflow.
    math::exp(-(x * x) / dec!(2), "normal_pdf").unwrap_or(Decimal::ZERO) / SQRT_2PI
}

/// Cumulative standard normal distribution.
///
/// One polynomial branch evaluated at |x|; negative arguments are mirrored
/// through `1 - N(|x|)`.
pub fn normal_cdf(x: Decimal) -> Decimal {
    if x <= -CDF_CUTOFF {
        return Decimal::ZERO;
    }
    if x >= CDF_CUTOFF {
        return Decimal::ONE;
    }

    let abs_x = x.abs();
    let t = Decimal::ONE / (Decimal::ONE + P * abs_x);
    let poly = t * (B1 + t * (B2 + t * (B3 + t * (B4 + t * B5))));
    let upper = Decimal::ONE - normal_pdf(abs_x) * poly;

    if x > Decimal::ZERO {
        upper
    } else {
        Decimal::ONE - upper
    }
}

/// Inverse cumulative standard normal, p in the open interval (0, 1).
pub fn normal_inverse(p: Decimal) -> IrbResult<Decimal> {
    if p <= Decimal::ZERO || p >= Decimal::ONE {
        return Err(IrbError::domain(
            "normal_inverse",
            format!("probability must lie strictly inside (0, 1), got {p}"),
        ));
    }

    let q = p - dec!(0.5);
    if q.abs() <= SPLIT {
        let r = q * q;
        let num = ((A3 * r + A2) * r + A1) * r + A0;
        let den = (((BB4 * r + BB3) * r + BB2) * r + BB1) * r + Decimal::ONE;
        return Ok(q * num / den);
    }

    let tail = p.min(Decimal::ONE - p);
    let r = math::sqrt(-math::ln(tail, "normal_inverse")?, "normal_inverse")?;
    let z = (((C3 * r + C2) * r + C1) * r + C0) / ((D2 * r + D1) * r + Decimal::ONE);

    Ok(if q < Decimal::ZERO { -z } else { z })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Decimal, b: Decimal, eps: Decimal) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_normal_pdf_far_tails() {
        assert!(approx_eq(normal_pdf(Decimal::ZERO), dec!(0.3989422804), dec!(0.0000000001)));
        assert_eq!(normal_pdf(dec!(12)), Decimal::ZERO);
        assert_eq!(normal_pdf(Decimal::from_scientific("-3e14").unwrap()), Decimal::ZERO);
        assert_eq!(normal_pdf(Decimal::MAX), Decimal::ZERO);
        assert_eq!(normal_pdf(Decimal::MIN), Decimal::ZERO);
        assert!(normal_pdf(dec!(11.9)) >= Decimal::ZERO);
    }

    #[test]
    fn test_normal_cdf_at_zero() {
        let v = normal_cdf(Decimal::ZERO);
        assert!(approx_eq(v, dec!(0.5), dec!(0.000001)), "N(0) = {v}");
    }

    #[test]
    fn test_normal_cdf_reference_points() {
        let cases = [
            (dec!(1.96), dec!(0.9750021048517795)),
            (dec!(-1.96), dec!(0.0249978951482205)),
            (dec!(1), dec!(0.8413447460685429)),
            (dec!(3.090232306167813), dec!(0.999)),
            (dec!(-3.090232306167813), dec!(0.001)),
        ];
        for (x, expected) in cases {
            let v = normal_cdf(x);
            assert!(
                approx_eq(v, expected, dec!(0.000001)),
                "N({x}) = {v}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_normal_cdf_symmetry() {
        for x in [dec!(0.3), dec!(1.2), dec!(2.7), dec!(4.1)] {
            let sum = normal_cdf(x) + normal_cdf(-x);
            assert!(approx_eq(sum, Decimal::ONE, dec!(0.0000000001)));
        }
    }

    #[test]
    fn test_normal_cdf_saturates() {
        assert_eq!(normal_cdf(dec!(-25)), Decimal::ZERO);
        assert_eq!(normal_cdf(dec!(25)), Decimal::ONE);
    }

    #[test]
    fn test_normal_inverse_reference_points() {
        let cases = [
            (dec!(0.999), dec!(3.090232306167813)),
            (dec!(0.975), dec!(1.959963984540054)),
            (dec!(0.01), dec!(-2.326347874040841)),
            (dec!(0.0001), dec!(-3.719016485455680)),
            (dec!(0.92), dec!(1.405071560309633)),
        ];
        for (p, expected) in cases {
            let z = normal_inverse(p).unwrap();
            assert!(
                approx_eq(z, expected, dec!(0.000002)),
                "N^-1({p}) = {z}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_normal_inverse_at_half() {
        assert_eq!(normal_inverse(dec!(0.5)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_normal_inverse_sign_follows_side_of_half() {
        assert!(normal_inverse(dec!(0.03)).unwrap() < Decimal::ZERO);
        assert!(normal_inverse(dec!(0.97)).unwrap() > Decimal::ZERO);
    }

    #[test]
    fn test_normal_inverse_rejects_bounds() {
        for p in [Decimal::ZERO, Decimal::ONE, dec!(-0.1), dec!(1.5)] {
            let err = normal_inverse(p).unwrap_err();
            assert!(err.is_domain_error(), "p = {p} gave {err}");
        }
    }

    #[test]
    fn test_cdf_inverse_roundtrip() {
        for p in [dec!(0.001), dec!(0.05), dec!(0.3), dec!(0.7), dec!(0.95)] {
            let back = normal_cdf(normal_inverse(p).unwrap());
            assert!(approx_eq(back, p, dec!(0.000002)), "N(N^-1({p})) = {back}");
        }
    }
}
