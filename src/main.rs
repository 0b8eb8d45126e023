//! PagePilot - store-coordinated browser sessions for LLM-driven web tasks.
//!
//! Main entry point for the `pagepilot` CLI: the coordination server, the
//! one-shot task runner, and the internal worker entrypoint the server
//! spawns for each session.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pagepilot_config::{Config, ConfigLoader};
use pagepilot_controller::{LlmClient, SessionClient, TaskConfig, TaskRunner};
use pagepilot_protocols::{SessionState, StateUpdate};
use pagepilot_server::Server;
use pagepilot_store::{HttpStore, SessionStore};
use pagepilot_worker::{CdpDriver, LaunchOptions, RunConfig, SessionRunner};

/// PagePilot CLI.
#[derive(Parser)]
#[command(name = "pagepilot")]
#[command(about = "Store-coordinated browser sessions for LLM-driven web tasks")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "pagepilot.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the coordination server in foreground
    Serve {
        /// Override the configured host
        #[arg(long)]
        host: Option<String>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Drive one task end-to-end against a running server
    Run {
        /// Page URL the session opens first
        #[arg(long)]
        url: String,

        /// Natural-language task for the agent
        #[arg(long)]
        task: String,

        /// Coordination server base URL
        #[arg(long, default_value = "http://127.0.0.1:8090")]
        server: String,

        /// Override the configured iteration cap
        #[arg(long)]
        max_iterations: Option<u32>,

        /// Parent directory for run artifacts (screenshots, thought log)
        #[arg(short, long, default_value = "runs")]
        output: PathBuf,
    },

    /// Internal worker entrypoint, spawned by the server per session
    #[command(hide = true)]
    Worker {
        /// Session id to claim
        #[arg(long)]
        session: String,

        /// Page URL to open
        #[arg(long)]
        url: String,

        /// Store surface base URL
        #[arg(long)]
        store: String,
    },
}

/// Initialize tracing with a compact stderr layer, plus a daily-rolling
/// file layer when `file_dir` is given (the `serve` path).
fn init_tracing(file_dir: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match file_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("pagepilot")
                .filename_suffix("log")
                .max_log_files(30)
                .build(dir)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            // The guard must outlive the process for buffered lines to flush.
            static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
                std::sync::OnceLock::new();
            let _ = GUARD.set(guard);

            Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = ConfigLoader::load(&cli.config)?;

    match cli.command {
        Commands::Serve { host, port } => {
            init_tracing(Some(&config.server.log_dir))?;
            serve(config, host, port).await
        }
        Commands::Run {
            url,
            task,
            server,
            max_iterations,
            output,
        } => {
            init_tracing(None)?;
            run_task(config, url, task, server, max_iterations, output).await
        }
        Commands::Worker {
            session,
            url,
            store,
        } => {
            init_tracing(None)?;
            run_worker(config, session, url, store).await
        }
    }
}

/// Run the coordination server in foreground until ctrl-c.
async fn serve(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    info!("starting pagepilot v{}", env!("CARGO_PKG_VERSION"));
    let server = Server::from_config(&config)?;
    info!("session surface at http://{}", server.addr());
    info!("  POST /session/create       - open a session");
    info!("  POST /session/result       - claim the latest result");
    info!("  POST /session/instruction  - submit the next action");
    info!("  POST /session/stop|delete  - wind a session down");
    info!("  GET  /healthz              - liveness and load");

    server.run().await
}

/// Drive one task end-to-end and report how it went.
async fn run_task(
    mut config: Config,
    url: String,
    task: String,
    server: String,
    max_iterations: Option<u32>,
    output: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(cap) = max_iterations {
        config.controller.max_iterations = cap;
    }
    if config.llm.api_key.is_empty() {
        return Err(r#"llm.api_key is not configured; set it in pagepilot.toml, e.g. api_key = "${OPENAI_API_KEY}""#.into());
    }

    let run_dir = output.join(format!(
        "run-{}",
        chrono::Utc::now().format("%Y%m%d-%H%M%S")
    ));
    let client = SessionClient::new(&server, &config.controller);
    let llm = LlmClient::from_config(&config.llm);
    let runner = TaskRunner::new(
        client,
        llm,
        TaskConfig {
            url,
            task,
            max_iterations: config.controller.max_iterations,
            output_dir: run_dir.clone(),
        },
    );

    let report = runner.run().await?;
    if report.finished {
        info!("task finished after {} iteration(s)", report.iterations);
    } else {
        warn!(
            "iteration budget exhausted after {} iteration(s)",
            report.iterations
        );
    }
    if let Some(thought) = report.last_thought {
        info!("final thought: {}", thought);
    }
    info!("artifacts in {}", run_dir.display());
    Ok(())
}

/// Worker entrypoint: claim the session, drive the browser, coordinate
/// through the server-hosted store.
async fn run_worker(
    config: Config,
    session: String,
    url: String,
    store: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = HttpStore::new(store);

    let options = LaunchOptions {
        headless: config.worker.headless,
        binary: config.worker.chrome_binary.clone(),
    };
    let driver = match CdpDriver::launch(&options).await {
        Ok(driver) => driver,
        Err(err) => {
            error!("browser launch failed: {}", err);
            // The controller can only learn of the failure through the store.
            let update = StateUpdate::to(SessionState::Fatal).clearing_response();
            if let Err(store_err) = store.transition(&session, update).await {
                error!("could not record fatal state: {}", store_err);
            }
            return Err(err.into());
        }
    };

    let mut run_config = RunConfig::new(session, url);
    run_config.poll_interval = Duration::from_millis(config.worker.poll_interval_ms);
    run_config.settle_delay = Duration::from_millis(config.worker.settle_delay_ms);
    run_config.wait_duration = Duration::from_millis(config.worker.wait_duration_ms);
    run_config.max_lifetime = Duration::from_secs(config.worker.session_timeout_secs);

    SessionRunner::new(store, driver, run_config).run().await?;
    Ok(())
}
