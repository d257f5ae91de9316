use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use dotenvy::dotenv;
use sp_common::api::{RecommendationRequest, RecommendationResponse, RequestError};
use sp_common::logging::{init_tracing_subscriber, install_tracing_panic_hook};
use sp_common::matching::{PairingConfig, PairingConfigError, RankingConfig};
use thiserror::Error;
use tracing::{error, info};

/// Rank therapists for a client roster exported from the practice system.
#[derive(Debug, Parser)]
#[command(name = "smart-pairing", version)]
struct Args {
    /// Request JSON (`clients`, `therapists`, ...). Reads stdin when omitted or `-`.
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Write the ranking here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Recommendations per client; overrides the request
    #[arg(long)]
    limit: Option<usize>,

    /// Drop recommendations scoring below this (0-100); overrides the request
    #[arg(long)]
    min_score: Option<f64>,

    /// Only rank these clients (repeatable)
    #[arg(long = "client-id")]
    client_ids: Vec<i64>,

    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid request json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("invalid pairing config: {0}")]
    Config(#[from] PairingConfigError),
}

fn read_input(path: Option<&PathBuf>) -> Result<String, CliError> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            fs::read_to_string(path).map_err(|source| CliError::Io {
                path: path.display().to_string(),
                source,
            })
        }
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| CliError::Io {
                    path: "<stdin>".into(),
                    source,
                })?;
            Ok(buf)
        }
    }
}

/// Flags win over what the request file says.
fn apply_overrides(request: &mut RecommendationRequest, args: &Args) {
    if args.limit.is_some() {
        request.limit = args.limit;
    }
    if args.min_score.is_some() {
        request.min_score = args.min_score;
    }
    if !args.client_ids.is_empty() {
        request.client_ids = Some(args.client_ids.clone());
    }
}

fn recommend(
    raw: &str,
    args: &Args,
    pairing: &PairingConfig,
    ranking: &RankingConfig,
) -> Result<RecommendationResponse, CliError> {
    let mut request: RecommendationRequest = serde_json::from_str(raw)?;
    apply_overrides(&mut request, args);
    Ok(RecommendationResponse::build(
        &request,
        pairing,
        ranking,
        Utc::now(),
    )?)
}

fn render(response: &RecommendationResponse, pretty: bool) -> Result<String, CliError> {
    let mut rendered = if pretty {
        serde_json::to_string_pretty(response)?
    } else {
        serde_json::to_string(response)?
    };
    rendered.push('\n');
    Ok(rendered)
}

fn write_output(path: Option<&PathBuf>, rendered: &str) -> Result<(), CliError> {
    match path {
        Some(path) => fs::write(path, rendered).map_err(|source| CliError::Io {
            path: path.display().to_string(),
            source,
        }),
        None => io::stdout()
            .lock()
            .write_all(rendered.as_bytes())
            .map_err(|source| CliError::Io {
                path: "<stdout>".into(),
                source,
            }),
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let pairing = PairingConfig::from_env()?;
    let ranking = RankingConfig::from_env();

    let raw = read_input(args.input.as_ref())?;
    let response = recommend(&raw, args, &pairing, &ranking)?;

    info!(
        run_id = %response.run_id,
        clients = response.results.len(),
        config_version = %response.config_version,
        "smart pairing batch ranked"
    );

    write_output(args.output.as_ref(), &render(&response, args.pretty)?)
}

fn main() -> ExitCode {
    dotenv().ok();
    init_tracing_subscriber(env!("CARGO_PKG_NAME"));
    install_tracing_panic_hook(env!("CARGO_PKG_NAME"));

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "smart pairing failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER: &str = r#"{
        "clients": [
            {"id": 1, "name": "A", "hulpvragen": ["angst"]},
            {"id": 2, "name": "B", "hulpvragen": ["rouw"]}
        ],
        "therapists": [
            {"id": 10, "expertise": ["anxiety"], "available_slots": 4},
            {"id": 11, "expertise": ["grief"], "available_slots": 4},
            {"id": 12, "expertise": ["trauma"], "available_slots": 4}
        ],
        "limit": 3
    }"#;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["smart-pairing"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn ranks_roster_from_json() {
        let response = recommend(
            ROSTER,
            &args(&[]),
            &PairingConfig::default(),
            &RankingConfig::default(),
        )
        .unwrap();

        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].recommendations[0].therapist_id, 10);
        assert_eq!(response.results[1].recommendations[0].therapist_id, 11);
        assert_eq!(response.results[0].recommendations.len(), 3);
    }

    #[test]
    fn flags_override_request_fields() {
        let response = recommend(
            ROSTER,
            &args(&["--limit", "1", "--client-id", "2"]),
            &PairingConfig::default(),
            &RankingConfig::default(),
        )
        .unwrap();

        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].client_id, 2);
        assert_eq!(response.results[0].recommendations.len(), 1);
    }

    #[test]
    fn unknown_client_ids_are_reported() {
        let err = recommend(
            ROSTER,
            &args(&["--client-id", "99"]),
            &PairingConfig::default(),
            &RankingConfig::default(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            CliError::Request(RequestError::UnknownClients(ref ids)) if ids == &vec![99]
        ));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = recommend(
            "{not json",
            &args(&[]),
            &PairingConfig::default(),
            &RankingConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Json(_)));
    }

    #[test]
    fn render_ends_with_newline() {
        let response = recommend(
            ROSTER,
            &args(&[]),
            &PairingConfig::default(),
            &RankingConfig::default(),
        )
        .unwrap();

        let compact = render(&response, false).unwrap();
        let pretty = render(&response, true).unwrap();
        assert!(compact.ends_with('\n'));
        assert!(pretty.lines().count() > compact.lines().count());
    }
}
