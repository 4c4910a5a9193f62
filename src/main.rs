use clap::{Parser, ValueEnum};
use intune_assign::app::{self, RunOptions};
use intune_assign::config::Config;
use intune_assign::error::{CheckerError, ConnectionError, GroupResolutionError};
use intune_assign::graph::auth::TokenSource;
use intune_assign::graph::client::GraphClient;
use intune_assign::graph::http::format_graph_error;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Report Intune assignments for an Entra ID group
#[derive(Parser, Debug)]
#[command(name = "intune-assign", version, about, long_about = None)]
struct Args {
    /// Group object ID or exact display name
    #[arg(short, long)]
    group: String,

    /// CSV export destination (default: IntuneGroupAssignments_<group>_<timestamp>.csv)
    #[arg(short, long)]
    export_path: Option<PathBuf>,

    /// Print the summary only, do not write a CSV file
    #[arg(long)]
    no_export: bool,

    /// Entra ID tenant (falls back to AZURE_TENANT_ID, then the config file)
    #[arg(long)]
    tenant_id: Option<String>,

    /// App registration client ID (falls back to AZURE_CLIENT_ID, then the config file)
    #[arg(long)]
    client_id: Option<String>,

    /// Pre-acquired Graph bearer token
    #[arg(long, env = "GRAPH_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Resources processed at once within a category
    #[arg(long)]
    concurrency: Option<usize>,

    /// Log level (RUST_LOG overrides)
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn setup_logging(
    level: LogLevel,
    log_file: Option<&PathBuf>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    let file = log_file.and_then(|path| {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match std::fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("Cannot open log file {}: {}; logging to stderr", path.display(), e);
                None
            }
        }
    });

    match file {
        Some(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
            None
        }
    }
}

const NO_CREDENTIALS: &str = "no credentials: pass --access-token (or GRAPH_ACCESS_TOKEN), \
                              or set tenant, client ID and AZURE_CLIENT_SECRET";

/// Pick how to authenticate; a bearer token wins over app credentials
fn token_source(
    args: &Args,
    config: &Config,
    client_secret: Option<String>,
) -> Result<TokenSource, ConnectionError> {
    if let Some(token) = args.access_token.as_ref().filter(|t| !t.trim().is_empty()) {
        return Ok(TokenSource::Static(token.clone()));
    }

    let tenant_id = config.effective_tenant(args.tenant_id.as_deref());
    let client_id = config.effective_client_id(args.client_id.as_deref());
    let client_secret = client_secret.filter(|s| !s.is_empty());

    match (tenant_id, client_id, client_secret) {
        (Some(tenant_id), Some(client_id), Some(client_secret)) => {
            Ok(TokenSource::ClientCredentials {
                authority_host: config.effective_authority_host(),
                tenant_id,
                client_id,
                client_secret,
            })
        }
        _ => Err(ConnectionError(NO_CREDENTIALS.to_string())),
    }
}

fn report_fatal(err: &CheckerError) {
    match err {
        CheckerError::GroupResolution(GroupResolutionError::Ambiguous { candidates, .. }) => {
            eprintln!("Error: {}", err);
            for group in candidates {
                eprintln!("  {}  {}", group.id, group.display_name);
            }
        }
        CheckerError::GroupResolution(GroupResolutionError::Lookup(e)) => {
            eprintln!("Error: group lookup failed: {}", format_graph_error(e));
        }
        _ => eprintln!("Error: {}", err),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level, args.log_file.as_ref());
    tracing::info!("intune-assign {} started", env!("CARGO_PKG_VERSION"));

    let config = Config::load();

    let client_secret = std::env::var("AZURE_CLIENT_SECRET").ok();
    let client = match token_source(&args, &config, client_secret) {
        Ok(source) => GraphClient::connect(source, &config.effective_graph_base_url()).await,
        Err(e) => Err(e),
    };
    let client = match client {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("{}", e);
            report_fatal(&CheckerError::Connection(e));
            return ExitCode::FAILURE;
        }
    };

    let options = RunOptions {
        group: args.group.clone(),
        export_path: args.export_path.clone(),
        export_dir: config.export_dir.clone(),
        concurrency: config.effective_concurrency(args.concurrency),
        export: !args.no_export,
        color: !args.no_color && std::io::stdout().is_terminal(),
    };

    let mut stdout = std::io::stdout();
    let result = app::run(&client, &options, &mut stdout).await;

    client.close().await;

    match result {
        Ok(report) => {
            tracing::info!(
                "Finished: {} record(s) for '{}', export {:?}",
                report.records.len(),
                report.group.display_name,
                report.export
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("{}", err);
            report_fatal(&err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["intune-assign", "--group", "IT-Admins"];
        argv.extend_from_slice(extra);
        let mut args = Args::try_parse_from(argv).unwrap();
        if !extra.contains(&"--access-token") {
            args.access_token = None;
        }
        args
    }

    #[test]
    fn test_missing_credentials_is_a_connection_error() {
        let err = token_source(&args(&[]), &Config::default(), None).unwrap_err();
        assert!(err.to_string().contains("no credentials"));

        // A secret alone is not enough without a client ID
        let config = Config {
            tenant_id: Some("contoso".to_string()),
            ..Config::default()
        };
        let args = args(&["--client-id", ""]);
        assert!(token_source(&args, &config, Some("secret".to_string())).is_err());
    }

    #[test]
    fn test_empty_secret_is_ignored() {
        let config = Config {
            tenant_id: Some("contoso".to_string()),
            client_id: Some("app-id".to_string()),
            ..Config::default()
        };
        let args = args(&["--tenant-id", "contoso", "--client-id", "app-id"]);
        assert!(token_source(&args, &config, Some(String::new())).is_err());
    }

    #[test]
    fn test_access_token_wins() {
        let args = args(&["--access-token", "eyJ0eXAi"]);
        let source = token_source(&args, &Config::default(), Some("secret".to_string())).unwrap();
        assert!(matches!(source, TokenSource::Static(ref t) if t == "eyJ0eXAi"));
    }

    #[test]
    fn test_client_credentials_from_cli() {
        let args = args(&["--tenant-id", "contoso", "--client-id", "app-id"]);
        let source = token_source(&args, &Config::default(), Some("secret".to_string())).unwrap();
        match source {
            TokenSource::ClientCredentials {
                authority_host,
                tenant_id,
                client_id,
                ..
            } => {
                assert_eq!(authority_host, intune_assign::graph::auth::DEFAULT_AUTHORITY_HOST);
                assert_eq!(tenant_id, "contoso");
                assert_eq!(client_id, "app-id");
            }
            other => panic!("expected client credentials, got {:?}", other),
        }
    }
}
