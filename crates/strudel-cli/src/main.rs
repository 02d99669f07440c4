use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use std::fs::OpenOptions;
use std::sync::Arc;
use tokio::io::BufReader;

use strudel_core::config::{AgentConfig, ConfigLoader, LlmProvider};
use strudel_core::core_types::Turn;
use strudel_core::report::SessionReporter;
use strudel_core::{InputMultiplexer, SessionController, SessionError};
use strudel_cli::console::ConsoleReporter;
use strudel_cli::signal::cancel_on_signal;

const LOG_FILE: &str = "strudel-agent.log";

#[derive(Parser, Debug)]
#[clap(
    name = "strudel-agent",
    author,
    version = "0.1.0",
    about = "Conversational live-coding agent for Strudel"
)]
struct Cli {
    #[clap(long, short, help = "Optional YAML configuration file")]
    config: Option<String>,

    #[clap(long, help = "Playback server base URL (overrides STRUDEL_SERVER_URL)")]
    server_url: Option<String>,

    #[clap(long, help = "How often to poll the playback server for web prompts")]
    poll_interval_ms: Option<u64>,

    #[clap(long, help = "Gemini model name")]
    model: Option<String>,

    #[clap(long, short, default_value = "info")]
    log_level: String,

    #[clap(long, help = "Use canned patterns instead of calling the model")]
    mock: bool,

    #[clap(long, help = "Generate code for a single prompt and exit")]
    prompt: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to a file so they never interleave with the prompt.
    let log_level_filter = cli.log_level.parse().unwrap_or(LevelFilter::Info);
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(LOG_FILE)
        .with_context(|| format!("Failed to create {} file", LOG_FILE))?;
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let config = match load_config(&cli).await {
        Ok(config) => config,
        Err(e) if e.is_fatal() => {
            log::error!("Startup failed: {}", e);
            eprintln!("❌ Error: {}", e);
            if let SessionError::MissingCredential(env_var) = &e {
                eprintln!("\nPlease set your Gemini API key:");
                eprintln!("  export {}='your-api-key-here'", env_var);
                eprintln!("\nOr run with --mock to use canned patterns.");
            }
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    if config.is_mock() {
        log::info!("Running with canned patterns, no model calls will be made");
    }

    let controller = Arc::new(SessionController::from_config(&config)?);

    match cli.prompt {
        Some(prompt) => run_one_shot(controller, prompt).await,
        None => run_interactive(controller, &config).await,
    }
}

async fn load_config(cli: &Cli) -> Result<AgentConfig, SessionError> {
    let mut config = match &cli.config {
        Some(path) => {
            log::info!("Loading configuration from file: {}", path);
            ConfigLoader::from_file(path).await?
        }
        None => ConfigLoader::from_env(),
    };

    if let Some(server_url) = &cli.server_url {
        config.playback.server_base_url = server_url.clone();
    }
    if let Some(poll_interval_ms) = cli.poll_interval_ms {
        config.playback.poll_interval_ms = poll_interval_ms;
    }
    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }
    if cli.mock {
        config.llm.provider = LlmProvider::Mock;
    }

    config.validate()?;
    log::info!(
        "Configuration loaded: model {}, playback server {}",
        config.llm.model,
        config.playback.server_base_url
    );
    Ok(config)
}

async fn run_one_shot(controller: Arc<SessionController>, prompt: String) -> Result<()> {
    let reporter = ConsoleReporter::one_shot();
    reporter.banner("Strudel AI Live Coding Agent");
    println!("\nInitial prompt: {}", prompt);

    let healthy = controller.check_server().await;
    reporter.server_status(healthy, controller.playback().server_url());

    let turn = Turn::interactive(prompt);
    let outcome = controller
        .submit_turn_observed(&turn, |kind| reporter.turn_started(&turn, kind))
        .await;
    reporter.turn_finished(&turn, &outcome);

    if outcome.is_err() {
        std::process::exit(1);
    }
    Ok(())
}

async fn run_interactive(controller: Arc<SessionController>, config: &AgentConfig) -> Result<()> {
    let reporter = Arc::new(ConsoleReporter::interactive());
    reporter.banner("Strudel AI Live Coding Agent - Interactive Mode");

    let healthy = controller.check_server().await;
    reporter.server_status(healthy, controller.playback().server_url());
    reporter.usage();

    let multiplexer = InputMultiplexer::new(
        controller,
        reporter.clone(),
        config.playback.poll_interval(),
    );
    cancel_on_signal(multiplexer.shutdown_token());

    let result = multiplexer.run(BufReader::new(tokio::io::stdin())).await;
    reporter.farewell();

    if let Err(e) = result {
        log::error!("Interactive session ended with error: {}", e);
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }

    // The blocking stdin reader would otherwise hold the runtime open.
    std::process::exit(0);
}
