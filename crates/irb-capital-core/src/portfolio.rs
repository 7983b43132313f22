//! Portfolio-wide RWA run.
//!
//! Every counterparty is an independent, pure computation. A counterparty whose
//! inputs violate a formula's domain is listed as rejected instead of
//! contributing a partial RWA; the rest of the book is still computed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::counterparty::Counterparty;
use crate::error::IrbError;
use crate::irb::rwa::{compute_rwa, RwaResult};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::validation::ValidationPolicy;
use crate::IrbResult;

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioInput {
    pub counterparties: Vec<Counterparty>,
    #[serde(default)]
    pub policy: ValidationPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterpartyRwa {
    /// Position in the input list
    pub index: usize,
    pub label: String,
    pub result: RwaResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedCounterparty {
    pub index: usize,
    pub label: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub counterparty_count: usize,
    pub computed_count: usize,
    pub rejected_count: usize,
    /// Counterparties carrying at least one applied adjustment
    pub adjusted_count: usize,
    pub total_ead: Money,
    /// Sum of model RWA before adjustments
    pub total_base_rwa: Money,
    /// Sum of final RWA
    pub total_rwa: Money,
    /// total_rwa - total_base_rwa
    pub adjustment_impact: Money,
    pub total_expected_loss: Money,
    pub total_capital_requirement: Money,
    /// total_rwa / total_ead (0 when total_ead is 0)
    pub rwa_density: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioRwaOutput {
    pub summary: PortfolioSummary,
    pub results: Vec<CounterpartyRwa>,
    pub rejected: Vec<RejectedCounterparty>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

impl PortfolioInput {
    /// Re-derive TTC PD from the cycle inputs for every counterparty that has
    /// none stored, or for all of them when `force` is set.
    ///
    /// Invalid cycle inputs leave that counterparty's stored TTC PD in place
    /// and are reported as a warning; the book still runs. Returns the number
    /// of counterparties whose TTC PD was re-derived.
    pub fn refresh_ttc_pds(&mut self, force: bool) -> usize {
        let mut refreshed = 0;
        for counterparty in self.counterparties.iter_mut() {
            if !force && counterparty.ttc_pd.is_some() {
                continue;
            }
            match counterparty.refresh_ttc_pd() {
                Ok(Some(_)) => refreshed += 1,
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(counterparty = %counterparty.label(), error = %e, "TTC PD not refreshed");
                }
            }
        }
        refreshed
    }
}

/// Compute RWA for every counterparty and aggregate the book.
pub fn calculate_portfolio_rwa(
    input: &PortfolioInput,
) -> IrbResult<ComputationOutput<PortfolioRwaOutput>> {
    let start = Instant::now();

    if input.counterparties.is_empty() {
        return Err(IrbError::InsufficientData(
            "Portfolio must contain at least one counterparty.".into(),
        ));
    }

    let outcomes = run_all(&input.counterparties, &input.policy);

    let mut warnings: Vec<String> = Vec::new();
    let mut results: Vec<CounterpartyRwa> = Vec::new();
    let mut rejected: Vec<RejectedCounterparty> = Vec::new();

    for (index, counterparty, outcome, cp_warnings) in outcomes {
        let label = counterparty.label();
        warnings.extend(cp_warnings.into_iter().map(|w| format!("[{label}] {w}")));
        match outcome {
            Ok(result) => results.push(CounterpartyRwa {
                index,
                label,
                result,
            }),
            Err(e) => {
                tracing::warn!(counterparty = %label, error = %e, "counterparty rejected");
                rejected.push(RejectedCounterparty {
                    index,
                    label,
                    error: e.to_string(),
                });
            }
        }
    }

    if !rejected.is_empty() {
        warnings.push(format!(
            "{} of {} counterparties rejected; totals exclude them.",
            rejected.len(),
            input.counterparties.len()
        ));
    }

    let summary = summarise(input.counterparties.len(), &results, rejected.len())?;
    tracing::debug!(
        computed = summary.computed_count,
        rejected = summary.rejected_count,
        total_rwa = %summary.total_rwa,
        "portfolio RWA run complete"
    );

    let output = PortfolioRwaOutput {
        summary,
        results,
        rejected,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "framework": "Basel A-IRB (corporate correlation curve)",
        "aggregation": "simple sum of independent counterparty RWA",
        "rejected_counterparties": "excluded from totals",
        "missing_input_policy": format!("{:?}", input.policy.missing_input),
        "out_of_range_pd_policy": format!("{:?}", input.policy.out_of_range_pd),
    });

    Ok(with_metadata(
        "Basel A-IRB Portfolio Risk-Weighted Assets",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal
// ---------------------------------------------------------------------------

type Outcome<'a> = (usize, &'a Counterparty, IrbResult<RwaResult>, Vec<String>);

fn run_one<'a>(index: usize, counterparty: &'a Counterparty, policy: &ValidationPolicy) -> Outcome<'a> {
    let mut warnings = Vec::new();
    let outcome = compute_rwa(counterparty, policy, &mut warnings);
    (index, counterparty, outcome, warnings)
}

#[cfg(not(feature = "parallel"))]
fn run_all<'a>(counterparties: &'a [Counterparty], policy: &ValidationPolicy) -> Vec<Outcome<'a>> {
    counterparties
        .iter()
        .enumerate()
        .map(|(i, cp)| run_one(i, cp, policy))
        .collect()
}

#[cfg(feature = "parallel")]
fn run_all<'a>(counterparties: &'a [Counterparty], policy: &ValidationPolicy) -> Vec<Outcome<'a>> {
    counterparties
        .par_iter()
        .enumerate()
        .map(|(i, cp)| run_one(i, cp, policy))
        .collect()
}

fn summarise(
    count: usize,
    results: &[CounterpartyRwa],
    rejected_count: usize,
) -> IrbResult<PortfolioSummary> {
    let mut total_ead = Decimal::ZERO;
    let mut total_base_rwa = Decimal::ZERO;
    let mut total_rwa = Decimal::ZERO;
    let mut total_expected_loss = Decimal::ZERO;
    let mut total_capital_requirement = Decimal::ZERO;
    let mut adjusted_count = 0usize;

    for r in results.iter().map(|c| &c.result) {
        accumulate(&mut total_ead, r.ead, "total_ead")?;
        accumulate(&mut total_base_rwa, r.original_rwa.unwrap_or(r.rwa), "total_base_rwa")?;
        accumulate(&mut total_rwa, r.rwa, "total_rwa")?;
        accumulate(&mut total_expected_loss, r.expected_loss, "total_expected_loss")?;
        accumulate(
            &mut total_capital_requirement,
            r.capital_requirement,
            "total_capital_requirement",
        )?;
        if r.has_adjustment || r.has_portfolio_adjustment {
            adjusted_count += 1;
        }
    }

    let adjustment_impact = total_rwa
        .checked_sub(total_base_rwa)
        .ok_or_else(|| IrbError::domain("calculate_portfolio_rwa", "adjustment_impact overflows"))?;
    let rwa_density = if total_ead.is_zero() {
        Decimal::ZERO
    } else {
        total_rwa
            .checked_div(total_ead)
            .ok_or_else(|| IrbError::domain("calculate_portfolio_rwa", "rwa_density overflows"))?
    };

    Ok(PortfolioSummary {
        counterparty_count: count,
        computed_count: results.len(),
        rejected_count,
        adjusted_count,
        total_ead,
        total_base_rwa,
        total_rwa,
        adjustment_impact,
        total_expected_loss,
        total_capital_requirement,
        rwa_density,
    })
}

fn accumulate(total: &mut Money, value: Money, field: &str) -> IrbResult<()> {
    *total = total.checked_add(value).ok_or_else(|| {
        IrbError::domain("calculate_portfolio_rwa", format!("{field} overflows"))
    })?;
    Ok(())
}
