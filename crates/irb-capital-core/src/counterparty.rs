//! Counterparty record: the unit of analysis fed to the RWA calculator.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::adjustments::{AdjustmentRecord, AdjustmentScope};
use crate::irb::correlation::InstitutionFlags;
use crate::irb::ttc::{calculate_ttc_pd, TtcPdInput};
use crate::ratings::pd_from_rating;
use crate::types::{lenient, Money, Rate, Years};
use crate::IrbResult;

/// A credit counterparty as supplied by upstream data.
///
/// Numeric risk parameters are optional because upstream records are often
/// incomplete; the `ValidationPolicy` passed to the calculator decides how gaps
/// are handled. `ttc_pd` is derived: mutate the PIT PD or the cycle inputs
/// through the setters below so it is re-derived alongside them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Counterparty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Point-in-time PD
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub pd: Option<Rate>,
    /// Through-the-cycle PD (derived)
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub ttc_pd: Option<Rate>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub lgd: Option<Rate>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub ead: Option<Money>,
    /// Effective maturity in years (clamped to [1, 5] by the formula)
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub maturity: Option<Years>,

    /// 0 = deep recession, 1 = strong economy
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub macroeconomic_index: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub long_term_average: Option<Rate>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub cyclicality: Option<Decimal>,

    #[serde(flatten)]
    pub institution: InstitutionFlags,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_rating: Option<String>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub credit_rating_pd: Option<Rate>,
    /// Feed the rating PD to the model instead of the TTC PD
    #[serde(default)]
    pub use_cred_rating_pd: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rwa_adjustment: Option<AdjustmentRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_rwa_adjustment: Option<AdjustmentRecord>,
}

impl Counterparty {
    /// TTC inputs, when all four are present.
    pub fn ttc_inputs(&self) -> Option<TtcPdInput> {
        Some(TtcPdInput {
            point_in_time_pd: self.pd?,
            macroeconomic_index: self.macroeconomic_index?,
            long_term_average: self.long_term_average?,
            cyclicality: self.cyclicality?,
        })
    }

    /// Re-derive `ttc_pd` from the current PIT PD and cycle inputs.
    ///
    /// Leaves `ttc_pd` untouched and returns `None` when any input is missing.
    pub fn refresh_ttc_pd(&mut self) -> IrbResult<Option<Rate>> {
        let Some(inputs) = self.ttc_inputs() else {
            return Ok(None);
        };
        let ttc_pd = calculate_ttc_pd(&inputs)?;
        self.ttc_pd = Some(ttc_pd);
        Ok(Some(ttc_pd))
    }

    pub fn set_point_in_time_pd(&mut self, pd: Rate) -> IrbResult<()> {
        self.update_cycle_input(|cp| cp.pd = Some(pd))
    }

    pub fn set_macroeconomic_index(&mut self, index: Decimal) -> IrbResult<()> {
        self.update_cycle_input(|cp| cp.macroeconomic_index = Some(index))
    }

    pub fn set_long_term_average(&mut self, average: Rate) -> IrbResult<()> {
        self.update_cycle_input(|cp| cp.long_term_average = Some(average))
    }

    pub fn set_cyclicality(&mut self, cyclicality: Decimal) -> IrbResult<()> {
        self.update_cycle_input(|cp| cp.cyclicality = Some(cyclicality))
    }

    /// Apply a change to a TTC input and re-derive TTC PD; on failure the
    /// counterparty is left exactly as it was.
    fn update_cycle_input(&mut self, change: impl FnOnce(&mut Self)) -> IrbResult<()> {
        let mut next = self.clone();
        change(&mut next);
        next.refresh_ttc_pd()?;
        *self = next;
        Ok(())
    }

    /// Assign a rating and its master-scale PD.
    pub fn assign_rating(&mut self, rating: &str) {
        self.credit_rating_pd = Some(pd_from_rating(rating));
        self.credit_rating = Some(rating.trim().to_uppercase());
    }

    pub fn clear_rating(&mut self) {
        self.credit_rating = None;
        self.credit_rating_pd = None;
        self.use_cred_rating_pd = false;
    }

    pub fn adjustment(&self, scope: AdjustmentScope) -> Option<&AdjustmentRecord> {
        match scope {
            AdjustmentScope::Counterparty => self.rwa_adjustment.as_ref(),
            AdjustmentScope::Portfolio => self.portfolio_rwa_adjustment.as_ref(),
        }
    }

    /// Attach an adjustment, returning the one it replaces.
    pub fn attach_adjustment(
        &mut self,
        scope: AdjustmentScope,
        record: AdjustmentRecord,
    ) -> Option<AdjustmentRecord> {
        self.slot(scope).replace(record)
    }

    pub fn remove_adjustment(&mut self, scope: AdjustmentScope) -> Option<AdjustmentRecord> {
        self.slot(scope).take()
    }

    fn slot(&mut self, scope: AdjustmentScope) -> &mut Option<AdjustmentRecord> {
        match scope {
            AdjustmentScope::Counterparty => &mut self.rwa_adjustment,
            AdjustmentScope::Portfolio => &mut self.portfolio_rwa_adjustment,
        }
    }

    /// Label used in warnings and portfolio output.
    pub fn label(&self) -> String {
        self.id
            .clone()
            .or_else(|| self.name.clone())
            .unwrap_or_else(|| "<unnamed>".to_string())
    }
}
