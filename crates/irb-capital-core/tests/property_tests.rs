use irb_capital_core::adjustments::{layer_adjustments, RwaTransform};
use irb_capital_core::irb::correlation::{
    avc_multiplier, base_correlation, InstitutionFlags, MAX_CORRELATION, MIN_CORRELATION,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// PD in basis points, (0, 1) exclusive
fn pd_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000).prop_map(|bp| Decimal::new(bp, 4))
}

fn transform_strategy() -> impl Strategy<Value = RwaTransform> {
    prop_oneof![
        (0i64..10_000_000).prop_map(|v| RwaTransform::Absolute { target: Decimal::from(v) }),
        (-1_000_000i64..1_000_000).prop_map(|v| RwaTransform::Additive { delta: Decimal::from(v) }),
        (1i64..300).prop_map(|v| RwaTransform::Multiplicative { multiplier: Decimal::new(v, 2) }),
        (-100i64..200).prop_map(|v| RwaTransform::Percentage { percent: Decimal::from(v) }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn base_correlation_bounded(pd in pd_strategy()) {
        let r = base_correlation(pd).unwrap();
        prop_assert!(r >= MIN_CORRELATION && r <= MAX_CORRELATION, "R({}) = {}", pd, r);
    }

    #[test]
    fn base_correlation_decreasing(a in 1i64..5_000, b in 1i64..5_000) {
        let (a, b) = (Decimal::new(a, 4), Decimal::new(b, 4));
        prop_assume!(a < b);
        prop_assert!(base_correlation(a).unwrap() > base_correlation(b).unwrap());
    }

    #[test]
    fn avc_is_one_or_uplift(f in any::<bool>(), l in any::<bool>(), r in any::<bool>()) {
        let flags = InstitutionFlags { is_financial: f, is_large_financial: l, is_regulated: r };
        let m = avc_multiplier(&flags);
        let uplift = f && (l || !r);
        prop_assert_eq!(m, if uplift { Decimal::new(125, 2) } else { Decimal::ONE });
    }

    #[test]
    fn original_rwa_always_base(
        base in 0i64..50_000_000,
        cp in proptest::option::of(transform_strategy()),
        pf in proptest::option::of(transform_strategy()),
    ) {
        let base = Decimal::from(base);
        let layered = layer_adjustments(base, cp.as_ref(), pf.as_ref()).unwrap();
        if cp.is_some() || pf.is_some() {
            prop_assert_eq!(layered.original_rwa, Some(base));
        } else {
            prop_assert_eq!(layered.original_rwa, None);
            prop_assert_eq!(layered.rwa, base);
        }
        prop_assert_eq!(layered.has_adjustment, cp.is_some());
        prop_assert_eq!(layered.has_portfolio_adjustment, pf.is_some());
    }
}
