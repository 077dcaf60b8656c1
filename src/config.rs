//! Per-request solver settings.
//!
//! Settings come from defaults, an optional JSON document and the
//! environment, in that order:
//!
//! ```
//! use okey_solver::SolveConfig;
//!
//! let config = SolveConfig::from_json_str(r#"{ "time_limit_ms": 250 }"#).unwrap();
//! assert_eq!(config.time_limit_ms, Some(250));
//! assert_eq!(config.opening_threshold, 101);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::OkeyError;

/// Environment variable that overrides the optimizer time limit
pub const TIME_LIMIT_ENV: &str = "OKEY_TIME_LIMIT_MS";

/// Minimum total a hand needs before it may be opened
pub const DEFAULT_OPENING_THRESHOLD: u32 = 101;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolveConfig {
    /// Optimizer deadline; `None` lets the search run to completion.
    /// A file, flag or variable that says 0 also means no deadline.
    pub time_limit_ms: Option<u64>,
    /// Total score at which a hand counts as able to open
    pub opening_threshold: u32,
}

impl Default for SolveConfig {
    fn default() -> Self {
        SolveConfig {
            time_limit_ms: None,
            opening_threshold: DEFAULT_OPENING_THRESHOLD,
        }
    }
}

impl SolveConfig {
    pub fn from_json_str(s: &str) -> Result<Self, OkeyError> {
        let config: SolveConfig =
            serde_json::from_str(s).map_err(|e| OkeyError::Config(e.to_string()))?;
        Ok(match config.time_limit_ms {
            Some(limit) => config.with_time_limit_ms(limit),
            None => config,
        })
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OkeyError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| OkeyError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&contents)
    }

    /// Set the deadline, 0 for none
    pub fn with_time_limit_ms(mut self, limit_ms: u64) -> Self {
        self.time_limit_ms = (limit_ms > 0).then_some(limit_ms);
        self
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> Result<Self, OkeyError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> Result<Self, OkeyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(TIME_LIMIT_ENV) {
            let limit = value.trim().parse::<u64>().map_err(|_| {
                OkeyError::Config(format!(
                    "{} must be a whole number of milliseconds, got '{}'",
                    TIME_LIMIT_ENV, value
                ))
            })?;
            self = self.with_time_limit_ms(limit);
        }
        Ok(self)
    }
}
