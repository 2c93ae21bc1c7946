use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Signal construction
// ---------------------------------------------------------------------------

#[napi]
pub fn build_signals(input_json: String) -> NapiResult<String> {
    let input: pairtrade_core::signal::SignalInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = pairtrade_core::signal::build_signals(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Backtest
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_pair(input_json: String) -> NapiResult<String> {
    let input: pairtrade_core::backtest::PairBacktestInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = pairtrade_core::backtest::analyze_pair(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
