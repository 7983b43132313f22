use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use irb_capital_core::portfolio::PortfolioInput;
use irb_capital_core::{Counterparty, ValidationPolicy};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// `{ "counterparty": {...}, "policy": {...} }`; policy is optional.
#[derive(Deserialize)]
struct RwaRequest {
    counterparty: Counterparty,
    #[serde(default)]
    policy: ValidationPolicy,
    /// Re-derive TTC PD from the cycle inputs before computing
    #[serde(default)]
    refresh_ttc: bool,
}

/// A portfolio book plus the same `refresh_ttc` switch as `RwaRequest`.
#[derive(Deserialize)]
struct PortfolioRequest {
    #[serde(flatten)]
    book: PortfolioInput,
    #[serde(default)]
    refresh_ttc: bool,
}

// ---------------------------------------------------------------------------
// RWA
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_rwa(input_json: String) -> NapiResult<String> {
    let mut request: RwaRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    if request.refresh_ttc || request.counterparty.ttc_pd.is_none() {
        request
            .counterparty
            .refresh_ttc_pd()
            .map_err(to_napi_error)?;
    }
    let output = irb_capital_core::calculate_rwa(&request.counterparty, &request.policy)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn calculate_portfolio_rwa(input_json: String) -> NapiResult<String> {
    let mut request: PortfolioRequest =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    request.book.refresh_ttc_pds(request.refresh_ttc);
    let output = irb_capital_core::portfolio::calculate_portfolio_rwa(&request.book)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// PD
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_ttc_pd(input_json: String) -> NapiResult<String> {
    let input: irb_capital_core::TtcPdInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let ttc_pd = irb_capital_core::calculate_ttc_pd(&input).map_err(to_napi_error)?;
    Ok(ttc_pd.to_string())
}

#[napi]
pub fn pd_from_rating(rating: String) -> String {
    irb_capital_core::ratings::pd_from_rating(&rating).to_string()
}

#[napi]
pub fn rating_from_pd(pd: String) -> NapiResult<String> {
    let pd: Decimal = pd.trim().parse().map_err(to_napi_error)?;
    Ok(irb_capital_core::ratings::rating_from_pd(pd).to_string())
}
