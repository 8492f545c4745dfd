//! Terraval CLI - multi-agent parcel valuation
//!
//! Reads one feature record as JSON (argument or stdin) and prints exactly
//! one JSON object on stdout. Logs go to stderr.
//!
//! # Quick Start
//!
//! ```bash
//! export GROQ_API_KEY=...            # optional: remote explanations
//! export GOOGLE_GEMINI_API_KEY=...   # optional
//!
//! terraval score '{"latitude": 40.71, "longitude": -74.0, "area_sqm": 750, "ndvi": 0.55}'
//! terraval agent groq < parcel.json
//! terraval run "$(cat analysis-package.json)" --pretty
//! terraval agents
//! ```

use std::time::Duration;

use clap::{Parser, Subcommand};
use terraval_agents::{AgentSettings, AgentShape};
use terraval_scoring::ProfileName;

mod commands;
mod exit_codes;
mod input;

use commands::{Failure, Outcome};

/// Terraval CLI - independent valuation agents over one parcel record
#[derive(Parser)]
#[command(name = "terraval")]
#[command(author = "Terraval Contributors")]
#[command(version)]
#[command(about = "Multi-agent land parcel valuation from remote-sensing features", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// How the groq and gemini agents are built (calculator or remote)
    #[arg(long, global = true)]
    shape: Option<AgentShape>,

    /// Per-agent timeout in seconds
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    agent_timeout: Option<u64>,

    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single agent by id
    Agent {
        /// Agent id (groq, asi, gemini)
        id: String,
        /// Feature record JSON; reads stdin when omitted or "-"
        input: Option<String>,
    },

    /// Run the whole roster concurrently and compute consensus
    Run {
        /// Feature record JSON; reads stdin when omitted or "-"
        input: Option<String>,
    },

    /// Score a record locally with one profile, without remote calls
    Score {
        /// Feature record JSON; reads stdin when omitted or "-"
        input: Option<String>,
        /// Scoring profile (standard or conservative)
        #[arg(long, default_value = "standard")]
        profile: ProfileName,
    },

    /// List the configured roster
    Agents,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}

fn settings(cli: &Cli) -> Result<AgentSettings, Failure> {
    let mut settings = AgentSettings::from_env().map_err(Failure::input)?;
    if let Some(shape) = cli.shape {
        settings = settings.with_shape(shape);
    }
    if let Some(secs) = cli.agent_timeout {
        settings = settings.with_agent_timeout(Duration::from_secs(secs));
    }
    Ok(settings)
}

async fn execute(cli: Cli) -> Outcome {
    let settings = settings(&cli)?;
    match cli.command {
        Commands::Agent { id, input } => commands::agent::run_one(&settings, &id, input).await,
        Commands::Run { input } => commands::run::run(&settings, input).await,
        Commands::Score { input, profile } => commands::score::run(profile, input),
        Commands::Agents => commands::agent::list(&settings),
    }
}

fn render(value: &serde_json::Value, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

/// Print the outcome as JSON and return the exit code
fn emit(outcome: Outcome, pretty: bool) -> i32 {
    let (value, code) = match outcome {
        Ok(value) => (value, exit_codes::OK),
        Err(failure) => {
            tracing::debug!(code = failure.code, error = ?failure.error, "command failed");
            (
                serde_json::json!({ "error": format!("{:#}", failure.error) }),
                failure.code,
            )
        }
    };

    match render(&value, pretty) {
        Ok(text) => {
            println!("{}", text);
            code
        }
        Err(e) => {
            eprintln!("failed to serialize output: {}", e);
            exit_codes::INTERNAL
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env if present
    dotenvy::dotenv().ok();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => {
            // --help / --version
            print!("{}", e);
            std::process::exit(exit_codes::OK);
        }
        Err(e) => {
            let rendered = e.to_string();
            eprint!("{}", rendered);
            let message = rendered
                .lines()
                .next()
                .unwrap_or_default()
                .trim_start_matches("error: ")
                .to_string();
            let code = emit(Err(Failure::input(anyhow::anyhow!(message))), false);
            std::process::exit(code);
        }
    };

    init_tracing();

    let pretty = cli.pretty;
    let code = emit(execute(cli).await, pretty);
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_options_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "terraval",
            "run",
            "{}",
            "--shape",
            "remote",
            "--agent-timeout",
            "5",
        ])
        .unwrap();
        assert_eq!(cli.shape, Some(AgentShape::Remote));
        assert_eq!(cli.agent_timeout, Some(5));
    }

    #[test]
    fn test_bad_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["terraval", "score", "--profile", "aggressive"]).is_err());
        assert!(Cli::try_parse_from(["terraval", "run", "--agent-timeout", "0"]).is_err());
        assert!(Cli::try_parse_from(["terraval", "run", "--shape", "hybrid"]).is_err());
    }

    #[test]
    fn test_failure_renders_error_object() {
        let failure = Failure::input(anyhow::anyhow!("Unknown agent: claude"));
        assert_eq!(emit(Err(failure), false), exit_codes::INVALID_INPUT);
    }
}
