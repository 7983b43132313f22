//! Decimal math helpers (no f64).
//!
//! `exp` and `ln` use argument reduction so the Taylor/atanh series stay in
//! their fast-converging range; the inputs seen here reach `exp(-50)` in the
//! correlation formula and `ln(0.0001)` in the maturity adjustment. Failures
//! surface as `IrbError::DomainError` naming the calling formula.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::error::IrbError;
use crate::IrbResult;

const LN_2: Decimal = dec!(0.6931471805599453094172321215);
const SERIES_TERMS: u32 = 40;

pub(crate) fn exp(x: Decimal, function: &str) -> IrbResult<Decimal> {
    let overflow = || IrbError::domain(function, format!("exp({x}) overflowed"));

    // e^x = (e^(x / 2^k))^(2^k) with |x / 2^k| <= 1
    let mut reduced = x;
    let mut halvings = 0u32;
    while reduced.abs() > Decimal::ONE {
        reduced /= dec!(2);
        halvings += 1;
    }

    let mut term = Decimal::ONE;
    let mut sum = Decimal::ONE;
    for i in 1..SERIES_TERMS {
        term = term * reduced / Decimal::from(i);
        if term.is_zero() {
            break;
        }
        sum += term;
    }

    for _ in 0..halvings {
        sum = sum.checked_mul(sum).ok_or_else(overflow)?;
    }
    Ok(sum)
}

pub(crate) fn ln(x: Decimal, function: &str) -> IrbResult<Decimal> {
    if x <= Decimal::ZERO {
        return Err(IrbError::domain(
            function,
            format!("ln requires a positive argument, got {x}"),
        ));
    }

    // Reduce into [0.75, 1.5) by powers of two.
    let mut val = x;
    let mut twos = 0i64;
    while val >= dec!(1.5) {
        val /= dec!(2);
        twos += 1;
    }
    while val < dec!(0.75) {
        val *= dec!(2);
        twos -= 1;
    }

    // ln(v) = 2 * atanh((v - 1) / (v + 1))
    let z = (val - Decimal::ONE) / (val + Decimal::ONE);
    let z2 = z * z;
    let mut term = z;
    let mut sum = z;
    for k in 1..SERIES_TERMS {
        term *= z2;
        if term.is_zero() {
            break;
        }
        sum += term / Decimal::from(2 * k + 1);
    }

    Ok(dec!(2) * sum + Decimal::from(twos) * LN_2)
}

pub(crate) fn sqrt(x: Decimal, function: &str) -> IrbResult<Decimal> {
    if x < Decimal::ZERO {
        return Err(IrbError::domain(
            function,
            format!("sqrt requires a non-negative argument, got {x}"),
        ));
    }
    x.sqrt()
        .ok_or_else(|| IrbError::domain(function, format!("sqrt({x}) is undefined")))
}
