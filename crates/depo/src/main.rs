use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use depo_core::compute_recording_intervals;
use depo_core::types::{DepositionEventKind, RecordingInterval};
use depo_serve::config::ServeConfig;
use depo_serve::AppState;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "depo", about = "Deposition scheduling and recording backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API.
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the OpenAPI document.
    Openapi,
    /// Compute recording intervals from a JSON array of `{kind, at}` entries.
    Intervals {
        file: PathBuf,
        /// Closes an interval left open. Defaults to the current time.
        #[arg(long)]
        now: Option<DateTime<Utc>>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] depo_serve::config::ConfigError),
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid timeline json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One timeline entry as exported by other systems, which may carry kinds
/// this crate does not model.
#[derive(Debug, serde::Deserialize)]
struct TimelineLine {
    kind: String,
    at: DateTime<Utc>,
}

impl TimelineLine {
    fn into_entry(self) -> (Option<DepositionEventKind>, DateTime<Utc>) {
        let kind = serde_json::from_value(serde_json::Value::String(self.kind)).ok();
        (kind, self.at)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Serve { port } => serve(port).await,
        Command::Openapi => {
            println!("{}", depo_serve::openapi::generate_spec());
            Ok(())
        }
        Command::Intervals { file, now } => intervals_from_file(&file, now.unwrap_or_else(Utc::now))
            .and_then(|intervals| serde_json::to_string_pretty(&intervals).map_err(CliError::from))
            .map(|json| println!("{json}")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "depo failed");
            ExitCode::FAILURE
        }
    }
}

async fn serve(port: Option<u16>) -> Result<(), CliError> {
    let config = ServeConfig::from_env()?;
    if let Some(parent) = Path::new(&config.db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port.unwrap_or(config.port));
    tracing::info!(
        min_notice_working_days = config.rules.min_notice_working_days,
        default_duration_minutes = config.rules.default_duration_minutes,
        "schedule rules loaded"
    );
    let state = AppState::new(config.db_path, config.rules);
    depo_serve::serve(state, addr).await?;
    Ok(())
}

fn intervals_from_file(path: &Path, now: DateTime<Utc>) -> Result<Vec<RecordingInterval>, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    intervals_from_json(&raw, now)
}

fn intervals_from_json(raw: &str, now: DateTime<Utc>) -> Result<Vec<RecordingInterval>, CliError> {
    let lines: Vec<TimelineLine> = serde_json::from_str(raw)?;
    let entries: Vec<_> = lines.into_iter().map(TimelineLine::into_entry).collect();
    Ok(compute_recording_intervals(&entries, now))
}
