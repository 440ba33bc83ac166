//! pagebridge-mcp - MCP servers for Notion pages and browser automation
//!
//! Run `pagebridge-mcp notion` or `pagebridge-mcp browser`; both speak MCP
//! over stdio.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, fmt::writer::BoxMakeWriter, prelude::*, EnvFilter, Layer};

use pagebridge_mcp::browser::{CdpLauncher, SessionController};
use pagebridge_mcp::config::{
    BrowserConfig, NotionConfig, DEFAULT_NOTION_API_BASE, DEFAULT_NOTION_VERSION,
    DEFAULT_TIMEOUT_MS,
};
use pagebridge_mcp::notion::NotionClient;
use pagebridge_mcp::server::SERVER_VERSION;
use pagebridge_mcp::McpServer;

/// MCP servers for Notion pages and browser automation.
#[derive(Parser, Debug)]
#[command(name = "pagebridge-mcp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log output file (default: stderr).
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve `read_page` and `create_page` against the Notion API.
    Notion(NotionArgs),
    /// Serve browser automation tools backed by Chrome/Chromium.
    Browser(BrowserArgs),
}

#[derive(Args, Debug)]
struct NotionArgs {
    /// Notion integration token.
    #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
    token: String,

    /// Notion API base URL.
    #[arg(long, env = "NOTION_API_BASE", default_value = DEFAULT_NOTION_API_BASE)]
    api_base: String,

    /// Value of the Notion-Version header.
    #[arg(long, default_value = DEFAULT_NOTION_VERSION)]
    notion_version: String,
}

#[derive(Args, Debug)]
struct BrowserArgs {
    /// Show browser window (non-headless mode).
    #[arg(long)]
    visible: bool,

    /// Chrome/Chromium executable to launch instead of the detected one.
    #[arg(long, env = "CHROME_PATH")]
    chrome_path: Option<PathBuf>,

    /// Timeout in milliseconds for selector waits, clicks and fills.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS)]
    default_timeout_ms: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("failed to set up logging: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(cli.command).await {
        Ok(Shutdown::InputClosed) => {
            tracing::info!("server exited cleanly");
            ExitCode::SUCCESS
        }
        Ok(Shutdown::Signal) => {
            // The runtime cannot drop a pending blocking stdin read.
            tracing::info!("server exited on signal");
            std::process::exit(0);
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "server error");
            ExitCode::FAILURE
        }
    }
}

/// Logs always go to stderr or a file; stdout carries the protocol.
fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let writer = match &cli.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let layer = if cli.log_json {
        fmt::layer()
            .json()
            .with_writer(writer)
            .with_filter(filter)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(cli.log_file.is_none())
            .with_filter(filter)
            .boxed()
    };

    tracing_subscriber::registry().with(layer).try_init()?;
    Ok(())
}

/// Why serving stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shutdown {
    /// Input ended or the client asked to shut down.
    InputClosed,
    /// SIGINT or SIGTERM.
    Signal,
}

async fn run(command: Command) -> anyhow::Result<Shutdown> {
    match command {
        Command::Notion(args) => {
            let config = NotionConfig {
                token: args.token,
                api_base: args.api_base,
                notion_version: args.notion_version,
            };
            tracing::info!(
                version = SERVER_VERSION,
                api_base = %config.api_base,
                "starting notion server"
            );

            let client = NotionClient::new(config).context("failed to build Notion client")?;
            let server = McpServer::notion(Arc::new(client));
            serve(&server).await
        }
        Command::Browser(args) => {
            let config = BrowserConfig {
                headless: !args.visible,
                chrome_path: args.chrome_path,
                default_timeout_ms: args.default_timeout_ms,
            };
            tracing::info!(
                version = SERVER_VERSION,
                headless = config.headless,
                "starting browser server"
            );

            let timeout = Duration::from_millis(config.default_timeout_ms);
            let launcher = Arc::new(CdpLauncher::new(config));
            let server = McpServer::browser(Arc::new(SessionController::new(launcher)), timeout);

            let result = serve(&server).await;
            if let Err(e) = server.session().close_all().await {
                tracing::warn!(error = %e, "failed to close browsers on exit");
            }
            result
        }
    }
}

/// Serve stdio until input ends or a termination signal arrives.
async fn serve<C: Send + Sync + 'static>(server: &McpServer<C>) -> anyhow::Result<Shutdown> {
    tokio::select! {
        result = server.run_stdio() => {
            result.context("stdio transport failed")?;
            Ok(Shutdown::InputClosed)
        }
        () = shutdown_signal() => {
            tracing::info!("shutdown signal received");
            Ok(Shutdown::Signal)
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
