use crate::{SolveConfig, api};
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Main WASM API: solve an Okey hand
///
/// # Arguments
/// * `request` - JSON request, e.g.
///   `{"pieces": [{"color": "red", "number": 7}, {"color": "okey", "number": null}],
///     "okey_color": "red", "okey_number": 9}`
/// * `time_limit_ms` - Maximum optimizer time in milliseconds, 0 for no limit
///
/// # Returns
/// JSON string holding either the response (melds, total_score, can_open, ...)
/// or an `{"error", "kind"}` object
#[wasm_bindgen]
pub fn solve_okey(request: &str, time_limit_ms: u64) -> String {
    let config = SolveConfig::default().with_time_limit_ms(time_limit_ms);
    api::solve_json(request, &config)
}

/// Get the git commit hash that this WASM module was built from
///
/// Returns the first 8 characters of the commit hash, or "unknown" if not available
#[wasm_bindgen]
pub fn get_build_commit() -> String {
    env!("BUILD_COMMIT").to_string()
}
