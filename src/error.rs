use thiserror::Error;

/// Reasons a hand cannot be resolved into tiles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown color '{0}'")]
    UnknownColor(String),

    #[error("rank must be 1-13, got {0}")]
    RankOutOfRange(u8),

    #[error("tile at position {0} has no rank")]
    MissingRank(usize),

    #[error("hand contains jokers but no indicator tile was given")]
    MissingIndicator,

    #[error("indicator needs both a color and a rank")]
    IncompleteIndicator,

    #[error("invalid tile token '{0}'")]
    InvalidToken(String),

    #[error("invalid request JSON: {0}")]
    Json(String),

    #[error("could not read request: {0}")]
    Unreadable(String),
}

/// Failures raised by the set-packing optimizer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error("optimizer exceeded the time limit of {limit_ms} ms")]
    TimedOut { limit_ms: u64 },

    #[error("optimizer returned an unusable assignment: {0}")]
    Infeasible(String),
}

/// Top-level error for a solve request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OkeyError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("solver failed: {0}")]
    Solver(#[from] SolverError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl OkeyError {
    /// Short machine-readable name of the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            OkeyError::Validation(_) => "validation",
            OkeyError::Solver(_) => "solver",
            OkeyError::Config(_) => "config",
        }
    }
}

pub type Result<T> = std::result::Result<T, OkeyError>;
