use clap::Parser;
use sheetscan::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Fuzzy record search across every sheet of a Google spreadsheet
#[derive(Parser, Debug)]
#[command(name = "sheetscan")]
#[command(about = "Search spreadsheet rows by name or CPF/CNS", long_about = None)]
struct Args {
    /// Address to bind the HTTP API to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// HTTP API port
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Google API key with Sheets read access
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Cell range fetched from every sheet
    #[arg(long, default_value = DEFAULT_RANGE)]
    range: String,

    /// Matches kept per sheet
    #[arg(long, default_value_t = DEFAULT_MATCH_CAP)]
    match_cap: usize,

    /// Upper bound for the per-request `cap` override
    #[arg(long, default_value_t = DEFAULT_MAX_MATCH_CAP)]
    max_match_cap: usize,

    /// Identifier comparison: suffix or exact
    #[arg(long, default_value = "suffix")]
    match_policy: MatchPolicy,

    /// Per-sheet fetch timeout in seconds
    #[arg(long, default_value_t = 20)]
    fetch_timeout_secs: u64,

    /// Pause between sheet fetches in milliseconds
    #[arg(long, default_value_t = 0)]
    fetch_pause_ms: u64,

    /// Request raw cell values instead of formatted strings
    #[arg(long)]
    unformatted_values: bool,

    /// Header keywords for identifier columns (comma-separated)
    #[arg(long, value_delimiter = ',')]
    identifier_keywords: Option<Vec<String>>,

    /// Header keywords for name/category columns (comma-separated)
    #[arg(long, value_delimiter = ',')]
    subject_keywords: Option<Vec<String>>,
}

impl Args {
    fn scan_config(&self) -> ScanConfig {
        let identifier = self
            .identifier_keywords
            .clone()
            .unwrap_or_else(|| IDENTIFIER_KEYWORDS.iter().map(|k| k.to_string()).collect());
        let subject = self
            .subject_keywords
            .clone()
            .unwrap_or_else(|| SUBJECT_KEYWORDS.iter().map(|k| k.to_string()).collect());

        ScanConfig {
            match_cap: self.match_cap,
            max_match_cap: self.max_match_cap,
            policy: self.match_policy,
            keywords: KeywordSets::new(identifier, subject),
            range: self.range.clone(),
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
            fetch_pause: Duration::from_millis(self.fetch_pause_ms),
            ..ScanConfig::default()
        }
    }

    fn sheets_config(&self) -> GoogleSheetsConfig {
        let mut config = GoogleSheetsConfig::new(self.api_key.clone());
        config.unformatted_values = self.unformatted_values;
        // Transport bound sits just above the per-sheet scan bound
        config.request_timeout = Duration::from_secs(self.fetch_timeout_secs + 5);
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting sheetscan v{}", env!("CARGO_PKG_VERSION"));

    let config = args.scan_config();
    config.validate()?;
    info!(
        "Match policy: {:?}, cap {} (max {}), range {}",
        config.policy, config.match_cap, config.max_match_cap, config.range
    );

    let source: Arc<dyn SheetSource> = Arc::new(GoogleSheetsSource::new(args.sheets_config())?);
    let state = AppState::new(source, config);

    let host = args.host.clone();
    let port = args.port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on {}:{}", host, port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(state, &host, port).await {
                tracing::error!("HTTP server error: {}", e);
            }
        })
    });

    info!("HTTP API: http://{}:{}/sheets/fullscan", args.host, args.port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
