use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::capital::{capital_requirement, CONFIDENCE_LEVEL};
use super::correlation::asset_correlation;
use super::maturity::maturity_adjustment;
use crate::adjustments::{layer_adjustments, resolve_stage, AdjustmentScope};
use crate::counterparty::Counterparty;
use crate::error::IrbError;
use crate::ratings::{lookup_rating_pd, UNKNOWN_RATING_PD};
use crate::types::{with_metadata, ComputationOutput, Money, Rate, Years};
use crate::validation::ValidationPolicy;
use crate::IrbResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which PD fed the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PdSource {
    CreditRating,
    ThroughTheCycle,
    PointInTime,
    /// No PD on the record; the policy default was used
    PolicyDefault,
}

/// Per-counterparty A-IRB result. Rebuilt on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RwaResult {
    /// PD actually used by the formulas
    pub pd: Rate,
    pub pd_source: PdSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttc_pd: Option<Rate>,
    pub lgd: Rate,
    pub ead: Money,
    pub base_correlation: Rate,
    pub avc_multiplier: Decimal,
    /// base_correlation * avc_multiplier
    pub correlation: Rate,
    pub effective_maturity: Years,
    pub maturity_adjustment: Decimal,
    pub k: Rate,
    /// Final RWA after adjustment layering
    pub rwa: Money,
    /// Model RWA before any adjustment; only set when one was applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_rwa: Option<Money>,
    pub has_adjustment: bool,
    pub has_portfolio_adjustment: bool,
    /// rwa / ead (0 when ead is 0)
    pub rwa_density: Decimal,
    /// PD * LGD * EAD
    pub expected_loss: Money,
    /// 8% of final RWA
    pub capital_requirement: Money,
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Reciprocal of the 8% minimum capital ratio
pub const RWA_SCALING_FACTOR: Decimal = dec!(12.5);
/// Basel minimum total capital ratio
pub const MIN_TOTAL_CAPITAL_RATIO: Decimal = dec!(0.08);

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Calculate A-IRB RWA for one counterparty and layer its adjustments.
///
/// The stored `ttc_pd` is used as-is; callers re-derive it (see
/// `Counterparty::refresh_ttc_pd`) whenever PIT PD or cycle inputs change.
pub fn calculate_rwa(
    counterparty: &Counterparty,
    policy: &ValidationPolicy,
) -> IrbResult<ComputationOutput<RwaResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let result = compute_rwa(counterparty, policy, &mut warnings)?;

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "framework": "Basel A-IRB (corporate correlation curve)",
        "confidence_level": CONFIDENCE_LEVEL.to_string(),
        "maturity_bounds_years": ["1", "5"],
        "avc_multiplier": "1.25 for large or unregulated financial institutions",
        "adjustment_order": "counterparty, then portfolio",
        "missing_input_policy": format!("{:?}", policy.missing_input),
        "out_of_range_pd_policy": format!("{:?}", policy.out_of_range_pd),
    });

    Ok(with_metadata(
        "Basel A-IRB Risk-Weighted Assets (Vasicek ASRF)",
        &assumptions,
        warnings,
        elapsed,
        result,
    ))
}

/// Envelope-free calculation, collecting warnings into the caller's buffer.
pub fn compute_rwa(
    counterparty: &Counterparty,
    policy: &ValidationPolicy,
    warnings: &mut Vec<String>,
) -> IrbResult<RwaResult> {
    let defaults = policy.defaults;

    // -- Inputs --------------------------------------------------------------
    let (selected_pd, pd_source) = select_pd(counterparty, policy, warnings)?;
    let pd = policy.check_pd(selected_pd, pd_field(pd_source), warnings)?;
    let lgd = policy.check_lgd(policy.require(counterparty.lgd, "lgd", defaults.lgd, warnings)?)?;
    let ead = policy.check_ead(policy.require(counterparty.ead, "ead", defaults.ead, warnings)?)?;
    let maturity = policy.require(counterparty.maturity, "maturity", defaults.maturity, warnings)?;

    // -- Model chain ---------------------------------------------------------
    let correlation = asset_correlation(pd, &counterparty.institution)?;
    let ma = maturity_adjustment(pd, maturity)?;
    let capital = capital_requirement(pd, lgd, correlation.correlation, ma.adjustment)?;
    let base_rwa = (capital.k * RWA_SCALING_FACTOR).checked_mul(ead).ok_or_else(|| {
        IrbError::domain("calculate_rwa", format!("base RWA for EAD {ead} overflows"))
    })?;

    tracing::debug!(
        counterparty = %counterparty.label(),
        %pd,
        ?pd_source,
        correlation = %correlation.correlation,
        maturity_adjustment = %ma.adjustment,
        k = %capital.k,
        %base_rwa,
        "computed base RWA"
    );

    // -- Adjustment layering -------------------------------------------------
    let counterparty_stage = resolve_stage(
        counterparty.rwa_adjustment.as_ref(),
        AdjustmentScope::Counterparty,
        warnings,
    );
    let portfolio_stage = resolve_stage(
        counterparty.portfolio_rwa_adjustment.as_ref(),
        AdjustmentScope::Portfolio,
        warnings,
    );
    let layered =
        layer_adjustments(base_rwa, counterparty_stage.as_ref(), portfolio_stage.as_ref())?;

    if layered.rwa < Decimal::ZERO {
        warnings.push(format!("Adjusted RWA is negative ({}).", layered.rwa));
    }

    let overflow = |what: &str| IrbError::domain("calculate_rwa", format!("{what} overflows"));
    let rwa_density = if ead.is_zero() {
        Decimal::ZERO
    } else {
        layered.rwa.checked_div(ead).ok_or_else(|| overflow("RWA density"))?
    };
    let expected_loss = (pd * lgd).checked_mul(ead).ok_or_else(|| overflow("expected loss"))?;

    Ok(RwaResult {
        pd,
        pd_source,
        ttc_pd: counterparty.ttc_pd,
        lgd,
        ead,
        base_correlation: correlation.base_correlation,
        avc_multiplier: correlation.avc_multiplier,
        correlation: correlation.correlation,
        effective_maturity: ma.effective_maturity,
        maturity_adjustment: ma.adjustment,
        k: capital.k,
        rwa: layered.rwa,
        original_rwa: layered.original_rwa,
        has_adjustment: layered.has_adjustment,
        has_portfolio_adjustment: layered.has_portfolio_adjustment,
        rwa_density,
        expected_loss,
        capital_requirement: layered.rwa * MIN_TOTAL_CAPITAL_RATIO,
    })
}

// ---------------------------------------------------------------------------
// Internal: PD source selection
// ---------------------------------------------------------------------------

/// Rating PD (when selected and available) > TTC PD > PIT PD > policy default.
fn select_pd(
    counterparty: &Counterparty,
    policy: &ValidationPolicy,
    warnings: &mut Vec<String>,
) -> IrbResult<(Rate, PdSource)> {
    if counterparty.use_cred_rating_pd {
        match rating_pd(counterparty, warnings) {
            Some(pd) => return Ok((pd, PdSource::CreditRating)),
            None => warnings.push(
                "use_cred_rating_pd is set but no rating PD is available; using TTC/PIT PD.".into(),
            ),
        }
    }

    if let Some(ttc_pd) = counterparty.ttc_pd {
        return Ok((ttc_pd, PdSource::ThroughTheCycle));
    }
    if let Some(pit_pd) = counterparty.pd {
        return Ok((pit_pd, PdSource::PointInTime));
    }

    let pd = policy.require(None, "pd", policy.defaults.pd, warnings)?;
    Ok((pd, PdSource::PolicyDefault))
}

fn rating_pd(counterparty: &Counterparty, warnings: &mut Vec<String>) -> Option<Rate> {
    if let Some(pd) = counterparty.credit_rating_pd {
        return Some(pd);
    }
    let rating = counterparty.credit_rating.as_deref()?;
    Some(lookup_rating_pd(rating).unwrap_or_else(|| {
        tracing::warn!(rating, "unknown credit rating on counterparty");
        warnings.push(format!(
            "Unknown credit rating '{rating}'; assigned PD {UNKNOWN_RATING_PD}."
        ));
        UNKNOWN_RATING_PD
    }))
}

fn pd_field(source: PdSource) -> &'static str {
    match source {
        PdSource::CreditRating => "credit_rating_pd",
        PdSource::ThroughTheCycle => "ttc_pd",
        PdSource::PointInTime | PdSource::PolicyDefault => "pd",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjustments::AdjustmentRecord;
    use crate::irb::correlation::AVC_MULTIPLIER;
    use crate::validation::{MissingInput, OutOfRangePd};

    fn approx_eq(a: Decimal, b: Decimal, eps: Decimal) -> bool {
        (a - b).abs() < eps
    }

    fn corporate() -> Counterparty {
        Counterparty {
            id: Some("CORP-1".into()),
            pd: Some(dec!(0.01)),
            lgd: Some(dec!(0.45)),
            ead: Some(dec!(1_000_000)),
            maturity: Some(dec!(2.5)),
            ..Counterparty::default()
        }
    }

    fn run(cp: &Counterparty) -> RwaResult {
        compute_rwa(cp, &ValidationPolicy::default(), &mut Vec::new()).unwrap()
    }

    #[test]
    fn test_reference_corporate() {
        let r = run(&corporate());
        assert_eq!(r.pd_source, PdSource::PointInTime);
        assert!(approx_eq(r.base_correlation, dec!(0.19278368), dec!(0.0000001)));
        assert_eq!(r.avc_multiplier, Decimal::ONE);
        assert!(approx_eq(r.maturity_adjustment, dec!(1.2598095), dec!(0.000001)));
        assert!(approx_eq(r.k, dec!(0.0795226), dec!(0.000001)), "K = {}", r.k);
        assert_eq!(r.rwa, r.k * dec!(12.5) * dec!(1_000_000));
        assert!(approx_eq(r.rwa, dec!(994_032.49), dec!(5)), "RWA = {}", r.rwa);
        assert_eq!(r.original_rwa, None);
        assert!(!r.has_adjustment && !r.has_portfolio_adjustment);
    }

    #[test]
    fn test_density_and_derived_amounts() {
        let r = run(&corporate());
        assert_eq!(r.rwa_density, r.rwa / dec!(1_000_000));
        assert_eq!(r.expected_loss, dec!(4_500));
        assert_eq!(r.capital_requirement, r.rwa * dec!(0.08));
    }

    #[test]
    fn test_zero_ead_has_zero_density() {
        let mut cp = corporate();
        cp.ead = Some(Decimal::ZERO);
        let r = run(&cp);
        assert_eq!(r.rwa, Decimal::ZERO);
        assert_eq!(r.rwa_density, Decimal::ZERO);
    }

    #[test]
    fn test_ttc_pd_preferred_over_pit() {
        let mut cp = corporate();
        cp.ttc_pd = Some(dec!(0.02));
        let r = run(&cp);
        assert_eq!(r.pd, dec!(0.02));
        assert_eq!(r.pd_source, PdSource::ThroughTheCycle);
        assert_eq!(r.ttc_pd, Some(dec!(0.02)));
    }

    #[test]
    fn test_rating_pd_overrides_ttc() {
        let mut cp = corporate();
        cp.ttc_pd = Some(dec!(0.02));
        cp.assign_rating("BB");
        cp.use_cred_rating_pd = true;
        let r = run(&cp);
        assert_eq!(r.pd, dec!(0.0120));
        assert_eq!(r.pd_source, PdSource::CreditRating);
    }

    #[test]
    fn test_rating_flag_without_rating_falls_back() {
        let mut cp = corporate();
        cp.use_cred_rating_pd = true;
        let mut warnings = Vec::new();
        let r = compute_rwa(&cp, &ValidationPolicy::default(), &mut warnings).unwrap();
        assert_eq!(r.pd_source, PdSource::PointInTime);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_unknown_rating_uses_fallback_pd() {
        let mut cp = corporate();
        cp.credit_rating = Some("Baa1".into());
        cp.use_cred_rating_pd = true;
        let mut warnings = Vec::new();
        let r = compute_rwa(&cp, &ValidationPolicy::default(), &mut warnings).unwrap();
        assert_eq!(r.pd, UNKNOWN_RATING_PD);
        assert!(warnings.iter().any(|w| w.contains("Baa1")));
    }

    #[test]
    fn test_default_rating_is_rejected() {
        let mut cp = corporate();
        cp.assign_rating("D");
        cp.use_cred_rating_pd = true;
        let err = compute_rwa(&cp, &ValidationPolicy::default(), &mut Vec::new()).unwrap_err();
        assert!(err.is_domain_error());
    }

    #[test]
    fn test_default_rating_clamped_when_policy_allows() {
        let mut cp = corporate();
        cp.assign_rating("D");
        cp.use_cred_rating_pd = true;
        let policy = ValidationPolicy {
            out_of_range_pd: OutOfRangePd::Clamp,
            ..ValidationPolicy::default()
        };
        let r = compute_rwa(&cp, &policy, &mut Vec::new()).unwrap();
        assert_eq!(r.pd, dec!(0.9999));
    }

    #[test]
    fn test_large_financial_gets_avc() {
        let mut cp = corporate();
        cp.institution.is_financial = true;
        cp.institution.is_large_financial = true;
        cp.institution.is_regulated = true;
        let r = run(&cp);
        assert_eq!(r.avc_multiplier, AVC_MULTIPLIER);
        assert_eq!(r.correlation, r.base_correlation * AVC_MULTIPLIER);
        assert!(approx_eq(r.rwa, dec!(1_250_357.96), dec!(5)), "RWA = {}", r.rwa);
    }

    #[test]
    fn test_missing_inputs_substituted() {
        let cp = Counterparty::default();
        let mut warnings = Vec::new();
        let r = compute_rwa(&cp, &ValidationPolicy::default(), &mut warnings).unwrap();
        assert_eq!(r.pd, dec!(0.01));
        assert_eq!(r.pd_source, PdSource::PolicyDefault);
        assert_eq!(r.lgd, dec!(0.45));
        assert_eq!(r.ead, Decimal::ZERO);
        assert_eq!(r.effective_maturity, dec!(2.5));
        assert_eq!(r.rwa, Decimal::ZERO);
        assert_eq!(warnings.len(), 4);
    }

    #[test]
    fn test_missing_inputs_rejected_under_strict_policy() {
        let mut cp = corporate();
        cp.lgd = None;
        let policy = ValidationPolicy {
            missing_input: MissingInput::Reject,
            ..ValidationPolicy::default()
        };
        assert!(compute_rwa(&cp, &policy, &mut Vec::new()).is_err());
    }

    #[test]
    fn test_lgd_out_of_range_rejected() {
        let mut cp = corporate();
        cp.lgd = Some(dec!(1.2));
        assert!(compute_rwa(&cp, &ValidationPolicy::default(), &mut Vec::new()).is_err());
    }

    #[test]
    fn test_layering_applied() {
        let mut cp = corporate();
        let base = run(&cp).rwa;
        cp.rwa_adjustment = Some(AdjustmentRecord::multiplicative(dec!(1.1), "model overlay"));
        cp.portfolio_rwa_adjustment = Some(AdjustmentRecord::additive(dec!(500), "sector add-on"));
        let r = run(&cp);
        assert_eq!(r.rwa, base * dec!(1.1) + dec!(500));
        assert_eq!(r.original_rwa, Some(base));
        assert_eq!(r.rwa_density, r.rwa / dec!(1_000_000));
        assert_eq!(r.capital_requirement, r.rwa * dec!(0.08));
    }

    #[test]
    fn test_overflowing_adjustment_is_rejected() {
        let mut cp = corporate();
        cp.ead = Some(dec!(1_000_000_000));
        cp.rwa_adjustment = Some(AdjustmentRecord::multiplicative(
            Decimal::from_scientific("1e20").unwrap(),
            "fat finger",
        ));
        let err = calculate_rwa(&cp, &ValidationPolicy::default()).unwrap_err();
        assert!(err.is_domain_error(), "{err}");
    }

    #[test]
    fn test_overflowing_exposure_is_rejected() {
        // K * 12.5 > 1 here, so the base RWA exceeds Decimal::MAX
        let mut cp = corporate();
        cp.pd = Some(dec!(0.3));
        cp.lgd = Some(Decimal::ONE);
        cp.ead = Some(Decimal::MAX);
        let err = compute_rwa(&cp, &ValidationPolicy::default(), &mut Vec::new()).unwrap_err();
        assert!(err.is_domain_error(), "{err}");
    }

    #[test]
    fn test_envelope_carries_warnings() {
        let mut cp = corporate();
        cp.maturity = None;
        let out = calculate_rwa(&cp, &ValidationPolicy::default()).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert!(out.methodology.contains("A-IRB"));
    }
}
