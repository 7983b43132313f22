//! External rating <-> calibrated PD master scale.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::Rate;

/// PD assigned to a rating that is not on the master scale.
pub const UNKNOWN_RATING_PD: Rate = dec!(0.01);

/// Master scale, best to worst. Order matters: `rating_from_pd` breaks ties
/// in favour of the earlier entry.
pub static RATING_SCALE: &[(&str, Rate)] = &[
    ("AAA", dec!(0.0001)),
    ("AA+", dec!(0.0002)),
    ("AA", dec!(0.0003)),
    ("AA-", dec!(0.0005)),
    ("A+", dec!(0.0007)),
    ("A", dec!(0.0009)),
    ("A-", dec!(0.0013)),
    ("BBB+", dec!(0.0019)),
    ("BBB", dec!(0.0030)),
    ("BBB-", dec!(0.0050)),
    ("BB+", dec!(0.0080)),
    ("BB", dec!(0.0120)),
    ("BB-", dec!(0.0200)),
    ("B+", dec!(0.0320)),
    ("B", dec!(0.0500)),
    ("B-", dec!(0.0800)),
    ("CCC+", dec!(0.1300)),
    ("CCC", dec!(0.2000)),
    ("CCC-", dec!(0.3000)),
    ("CC", dec!(0.4500)),
    ("C", dec!(0.6500)),
    ("D", dec!(1.0)),
];

/// Exact lookup, case-insensitive. `None` for ratings off the scale.
pub fn lookup_rating_pd(rating: &str) -> Option<Rate> {
    let wanted = rating.trim();
    RATING_SCALE
        .iter()
        .find(|(r, _)| r.eq_ignore_ascii_case(wanted))
        .map(|(_, pd)| *pd)
}

/// PD for a rating; unknown ratings fall back to 1% and are reported as a
/// data-quality event rather than an error.
pub fn pd_from_rating(rating: &str) -> Rate {
    lookup_rating_pd(rating).unwrap_or_else(|| {
        tracing::warn!(rating, fallback_pd = %UNKNOWN_RATING_PD, "unknown credit rating");
        UNKNOWN_RATING_PD
    })
}

/// Nearest rating by absolute PD distance.
pub fn rating_from_pd(pd: Rate) -> &'static str {
    RATING_SCALE
        .iter()
        .min_by(|(_, a), (_, b)| (*a - pd).abs().cmp(&(*b - pd).abs()))
        .map(|(r, _)| *r)
        .unwrap_or("D")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_is_monotonic() {
        for pair in RATING_SCALE.windows(2) {
            assert!(pair[0].1 < pair[1].1, "{} >= {}", pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn test_scale_endpoints() {
        assert_eq!(pd_from_rating("AAA"), dec!(0.0001));
        assert_eq!(pd_from_rating("D"), Decimal::ONE);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(lookup_rating_pd("bbb-"), Some(dec!(0.0050)));
        assert_eq!(lookup_rating_pd(" bb "), Some(dec!(0.0120)));
    }

    #[test]
    fn test_unknown_rating_defaults() {
        assert_eq!(lookup_rating_pd("Baa2"), None);
        assert_eq!(pd_from_rating("Baa2"), UNKNOWN_RATING_PD);
    }

    #[test]
    fn test_rating_from_pd_exact_and_nearest() {
        assert_eq!(rating_from_pd(dec!(0.0030)), "BBB");
        assert_eq!(rating_from_pd(dec!(0.95)), "D");
        assert_eq!(rating_from_pd(dec!(0.000001)), "AAA");
        assert_eq!(rating_from_pd(dec!(0.021)), "BB-");
    }

    #[test]
    fn test_rating_from_pd_tie_goes_to_better_rating() {
        // Midway between AAA (0.0001) and AA+ (0.0002)
        assert_eq!(rating_from_pd(dec!(0.00015)), "AAA");
    }

    #[test]
    fn test_roundtrip_through_scale() {
        for (rating, pd) in RATING_SCALE {
            assert_eq!(rating_from_pd(*pd), *rating);
        }
    }
}
