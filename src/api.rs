//! JSON request/response boundary shared by the CLI and the WASM binding.

use serde::{Deserialize, Serialize};

use crate::clock::TimeTracker;
use crate::error::Result;
use crate::{Indicator, OkeyError, RawTile, Solution, SolveConfig, ValidationError, solve_hand};

/// A hand to solve, as sent by callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OkeyRequest {
    pub pieces: Vec<RawTile>,
    #[serde(default)]
    pub okey_color: Option<String>,
    #[serde(default)]
    pub okey_number: Option<u8>,
}

impl OkeyRequest {
    /// The indicator tile, if one was given. A color without a rank (or the
    /// reverse) is rejected.
    pub fn indicator(&self) -> Result<Option<Indicator>> {
        match (&self.okey_color, self.okey_number) {
            (Some(color), Some(rank)) => Ok(Some(Indicator::from_raw(color, rank)?)),
            (None, None) => Ok(None),
            _ => Err(ValidationError::IncompleteIndicator.into()),
        }
    }
}

/// One meld as display tokens and its value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeldResponse {
    pub pieces: Vec<String>,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OkeyResponse {
    pub melds: Vec<MeldResponse>,
    pub total_score: u32,
    pub can_open: bool,
    pub number_of_triples: u32,
    pub number_of_sides: u32,
    /// Wall-clock seconds spent solving
    pub execution_time: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

impl From<&OkeyError> for ErrorResponse {
    fn from(err: &OkeyError) -> Self {
        ErrorResponse {
            error: err.to_string(),
            kind: err.kind().to_string(),
        }
    }
}

/// Opening classification derived from a hand's total score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpeningSummary {
    pub can_open: bool,
    pub triples: u32,
    pub sides: u32,
}

impl OpeningSummary {
    pub fn from_total(total: u32, threshold: u32) -> Self {
        OpeningSummary {
            can_open: total >= threshold,
            triples: total / 3,
            sides: total % 3,
        }
    }
}

/// Solve a decoded request
pub fn solve_request(request: &OkeyRequest, config: &SolveConfig) -> Result<OkeyResponse> {
    let timer = TimeTracker::unbounded();
    let indicator = request.indicator()?;
    let solution = solve_hand(&request.pieces, indicator, config)?;
    Ok(build_response(&solution, config, timer.elapsed_secs()))
}

fn build_response(solution: &Solution, config: &SolveConfig, execution_time: f64) -> OkeyResponse {
    let summary = OpeningSummary::from_total(solution.total_score, config.opening_threshold);
    OkeyResponse {
        melds: solution
            .render()
            .into_iter()
            .map(|(pieces, value)| MeldResponse { pieces, value })
            .collect(),
        total_score: solution.total_score,
        can_open: summary.can_open,
        number_of_triples: summary.triples,
        number_of_sides: summary.sides,
        execution_time,
    }
}

/// Parse a request JSON string
pub fn parse_request(input: &str) -> Result<OkeyRequest> {
    serde_json::from_str(input).map_err(|e| ValidationError::Json(e.to_string()).into())
}

/// Solve a request given as JSON, always answering with JSON: an
/// `OkeyResponse` on success, an `ErrorResponse` otherwise
pub fn solve_json(input: &str, config: &SolveConfig) -> String {
    match parse_request(input).and_then(|request| solve_request(&request, config)) {
        Ok(response) => serde_json::to_string(&response).unwrap_or_else(serialization_error),
        Err(err) => error_json(&err),
    }
}

pub fn error_json(err: &OkeyError) -> String {
    serde_json::to_string(&ErrorResponse::from(err)).unwrap_or_else(serialization_error)
}

fn serialization_error(e: serde_json::Error) -> String {
    format!(r#"{{"error":"Serialization error: {}","kind":"internal"}}"#, e)
}
