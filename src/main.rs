use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use okey_solver::api::{self, OkeyRequest, OkeyResponse};
use okey_solver::{Indicator, OkeyError, RawTile, SolveConfig, ValidationError};
use tracing_subscriber::EnvFilter;

/// Find the highest-scoring melds in an Okey hand
#[derive(Parser, Debug)]
#[command(
    name = "okey-solver",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_COMMIT"), ")")
)]
struct Cli {
    /// Request JSON file. Read from stdin when neither this nor --tiles is given
    request: Option<PathBuf>,

    /// Hand as compact tokens, e.g. "r7 r8 j" (r/b/k/y + rank, j = joker, f = fake joker)
    #[arg(long, conflicts_with = "request")]
    tiles: Option<String>,

    /// Indicator tile for --tiles, e.g. "r9"
    #[arg(long, requires = "tiles")]
    indicator: Option<String>,

    /// Solver settings JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Optimizer time limit, 0 for none; wins over --config and OKEY_TIME_LIMIT_MS
    #[arg(long)]
    time_limit_ms: Option<u64>,

    /// Pretty-print the response
    #[arg(long)]
    pretty: bool,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(response) => {
            let rendered = if cli.pretty {
                serde_json::to_string_pretty(&response)
            } else {
                serde_json::to_string(&response)
            };
            match rendered {
                Ok(json) => {
                    println!("{}", json);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to serialize response");
                    ExitCode::FAILURE
                }
            }
        }
        Err(err) => {
            tracing::error!(kind = err.kind(), "{}", err);
            println!("{}", api::error_json(&err));
            match err {
                OkeyError::Validation(_) => ExitCode::from(2),
                OkeyError::Solver(_) => ExitCode::from(3),
                OkeyError::Config(_) => ExitCode::from(4),
            }
        }
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("okey_solver=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<OkeyResponse, OkeyError> {
    let mut config = match &cli.config {
        Some(path) => SolveConfig::load(path)?,
        None => SolveConfig::default(),
    }
    .with_env_overrides()?;
    if let Some(limit) = cli.time_limit_ms {
        config = config.with_time_limit_ms(limit);
    }

    let request = match (&cli.tiles, &cli.request) {
        (Some(tiles), _) => request_from_tokens(tiles, cli.indicator.as_deref())?,
        (None, Some(path)) => {
            let input = std::fs::read_to_string(path)
                .map_err(|e| ValidationError::Unreadable(format!("{}: {}", path.display(), e)))?;
            api::parse_request(&input)?
        }
        (None, None) => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .map_err(|e| ValidationError::Unreadable(format!("stdin: {}", e)))?;
            api::parse_request(&input)?
        }
    };

    api::solve_request(&request, &config)
}

/// Build a request from "r7 r8 j" style tokens
fn request_from_tokens(tiles: &str, indicator: Option<&str>) -> Result<OkeyRequest, OkeyError> {
    let pieces = tiles
        .split_whitespace()
        .map(RawTile::from_token)
        .collect::<Result<Vec<_>, _>>()?;
    let indicator = indicator.map(Indicator::from_token).transpose()?;

    Ok(OkeyRequest {
        pieces,
        okey_color: indicator.map(|i| i.color.name().to_string()),
        okey_number: indicator.map(|i| i.rank),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_time_limit_flag_is_unbounded() {
        let cli = Cli::parse_from(["okey-solver", "--tiles", "r5 b5 k5", "--time-limit-ms", "0"]);
        let response = run(&cli).unwrap();
        assert_eq!(response.total_score, 15);
    }

    #[test]
    fn test_tokens_with_half_indicator_are_rejected() {
        let mut request = request_from_tokens("r5 b5 k5", Some("r9")).unwrap();
        request.okey_number = None;
        let err = api::solve_request(&request, &SolveConfig::default()).unwrap_err();
        assert_eq!(err, OkeyError::Validation(ValidationError::IncompleteIndicator));
    }
}
