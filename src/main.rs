//! s3curl - Signed S3 requests through curl
//!
//! Downloads, uploads and deletes S3 objects using AWS Signature Version 2,
//! with curl doing the actual HTTP work.

use anyhow::Context;
use clap::{Parser, Subcommand};
use s3curl::config::{Config, ConfigError, CredentialsConfig, RequestConfig};
use s3curl::plan::{Operation, RequestPlanner};
use s3curl::s3::{credentials, Credentials, CredentialsProvider};
use s3curl::transport::{CommandTransport, Transport, TransportError};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// s3curl - Sign S3 requests with SigV2 and run them through curl
#[derive(Parser, Debug)]
#[command(name = "s3curl")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Access key ID
    #[arg(long, env = credentials::ACCESS_KEY_ENV, hide_env_values = true)]
    access_key: Option<String>,

    /// Secret access key
    #[arg(long, env = credentials::SECRET_KEY_ENV, hide_env_values = true)]
    secret_key: Option<String>,

    /// S3 endpoint, e.g. https://s3.amazonaws.com
    #[arg(long)]
    endpoint: Option<String>,

    /// Transport binary
    #[arg(long = "curl", value_name = "BIN")]
    binary: Option<String>,

    /// Fixed HTTP date to sign instead of the current time
    #[arg(long, value_name = "HTTPDATE")]
    date: Option<String>,

    /// Transport timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Print the signed invocation instead of running it
    #[arg(long)]
    dry_run: bool,

    /// Print the dry-run plan as JSON
    #[arg(long, requires = "dry_run")]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download an object to a local file
    Get {
        /// Resource path, e.g. /bucket/key
        resource: String,
        /// Destination file
        local_file: Option<PathBuf>,
    },
    /// Upload a local file; a resource ending in '/' gets the file name appended
    Put {
        /// Resource path, e.g. /bucket/key or /bucket/dir/
        resource: String,
        /// Source file
        local_file: Option<PathBuf>,
    },
    /// Delete an object
    Delete {
        /// Resource path, e.g. /bucket/key
        resource: String,
    },
}

impl Command {
    fn into_request(self) -> (Operation, RequestConfig) {
        match self {
            Command::Get {
                resource,
                local_file,
            } => (Operation::Download, with_file(resource, local_file)),
            Command::Put {
                resource,
                local_file,
            } => (Operation::Upload, with_file(resource, local_file)),
            Command::Delete { resource } => (Operation::Delete, RequestConfig::new(resource)),
        }
    }
}

fn with_file(resource: String, local_file: Option<PathBuf>) -> RequestConfig {
    let request = RequestConfig::new(resource);
    match local_file {
        Some(path) => request.with_local_file(path),
        None => request,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(err) = init_logging(&args.log_level, args.json_logs) {
        eprintln!("s3curl: failed to initialize logging: {}", err);
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Request failed");
            eprintln!("s3curl: {:#}", err);
            exit_code_for(&err)
        }
    }
}

/// Log to stderr; stdout carries object data. `RUST_LOG` wins over `--log-level`.
fn init_logging(level: &str, json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
    .map_err(|e| anyhow::anyhow!(e))
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };
    debug!(?config, "Loaded configuration");

    if let Some(endpoint) = args.endpoint.clone() {
        config.endpoint = endpoint;
    }
    if let Some(binary) = args.binary.clone() {
        config.transport.binary = binary;
    }
    if args.timeout.is_some() {
        config.transport.timeout_seconds = args.timeout;
    }
    config.validate()?;

    let credentials = resolve_credentials(&args, &config)?;

    let (operation, mut request) = args.command.into_request();
    request = request.with_binary(config.transport.binary.clone());
    if let Some(date) = args.date {
        request = request.with_fixed_date(date);
    }

    let planner = RequestPlanner::new(credentials, config.endpoint.clone());
    let plan = planner.plan(operation, &request)?;
    info!(
        operation = %plan.operation,
        resource = %plan.resource,
        date = %plan.date,
        "Planned request"
    );

    if args.dry_run {
        let rendered = if args.json {
            serde_json::to_string_pretty(&plan)?
        } else {
            plan.to_shell_string()
        };
        println!("{}", rendered);
        return Ok(());
    }

    let mut transport = CommandTransport::new();
    if let Some(seconds) = config.transport.timeout_seconds {
        transport = transport.with_timeout(Duration::from_secs(seconds));
    }

    let output = transport.execute(&plan).await?;
    std::io::stdout().write_all(&output.stdout)?;

    Ok(())
}

/// Command-line and environment values take precedence over the config file.
fn resolve_credentials(args: &Args, config: &Config) -> Result<Credentials, ConfigError> {
    let from_args = CredentialsConfig {
        access_key: args.access_key.clone(),
        secret_key: args.secret_key.clone(),
    };
    CredentialsProvider::from_sources(&from_args, config.credentials.as_ref())
}

/// Forward curl's exit status when it ran and failed.
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<TransportError>() {
        Some(TransportError::Failed {
            code: Some(code), ..
        }) => u8::try_from(*code)
            .ok()
            .filter(|c| *c != 0)
            .map_or(ExitCode::FAILURE, ExitCode::from),
        _ => ExitCode::FAILURE,
    }
}
