mod app;
mod classifier;
mod config;
mod dispatcher;
mod gesture;
mod handoff;
mod landmarks;
mod source;
mod stability;
mod stats;

use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

use app::{Pipeline, SessionEnd};
use config::Config;
use dispatcher::Dispatcher;
use source::Provider;
use stability::StabilityFilter;
use stats::History;

/// Turn hand landmarks into debounced gesture commands for a remote controller.
///
/// Landmarks are read as JSON lines from stdin, or from the stdout of the
/// provider command given after `--`.
#[derive(Parser, Debug)]
#[command(name = "gesture-link", version)]
struct Cli {
    /// Config file (default: ~/.config/gesture-link/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Remote controller host
    #[arg(long)]
    host: Option<String>,

    /// Remote controller port
    #[arg(long)]
    port: Option<u16>,

    /// Stability window and repeat interval in milliseconds
    #[arg(long)]
    window_ms: Option<u64>,

    /// Passed through to the landmark provider
    #[arg(long)]
    min_detection_confidence: Option<f32>,

    /// Passed through to the landmark provider
    #[arg(long)]
    min_tracking_confidence: Option<f32>,

    #[arg(long)]
    connect_timeout_ms: Option<u64>,

    /// Write the effective configuration back to the config file
    #[arg(long)]
    save_config: bool,

    /// Landmark provider command and its arguments
    #[arg(last = true)]
    provider: Vec<String>,
}

impl Cli {
    fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Layer command-line flags over a loaded config.
    fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(ms) = self.window_ms {
            config.stability_window_ms = ms;
        }
        if let Some(c) = self.min_detection_confidence {
            config.min_detection_confidence = c;
        }
        if let Some(c) = self.min_tracking_confidence {
            config.min_tracking_confidence = c;
        }
        if let Some(ms) = self.connect_timeout_ms {
            config.connect_timeout_ms = ms;
        }
        if !self.provider.is_empty() {
            config.provider_command = self.provider.clone();
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Gesture link starting");

    let code = match run(Cli::parse()).await {
        Ok(end) if end.is_failure() => 1,
        Ok(_) => 0,
        Err(e) => {
            log::error!("{e}");
            1
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<SessionEnd, Box<dyn std::error::Error>> {
    let config_path = cli.config_path();
    let mut config = Config::load(&config_path);
    cli.apply(&mut config);
    config.validate()?;

    if cli.save_config {
        config.save(&config_path)?;
        log::info!("Saved config to {}", config_path.display());
    }

    log::info!(
        "Endpoint {}:{}, window {:?}, max hands {}, detection {}, tracking {}",
        config.host,
        config.port,
        config.stability_window(),
        config.max_num_hands,
        config.min_detection_confidence,
        config.min_tracking_confidence,
    );

    let stream = dispatcher::connect(&config.host, config.port, config.connect_timeout()).await?;
    let mut pipeline = Pipeline::new(
        StabilityFilter::new(config.stability_window()),
        Dispatcher::new(stream),
    );

    let (frame_tx, frame_rx) = handoff::channel();
    let started = Instant::now();

    let mut provider = if config.provider_command.is_empty() {
        log::info!("Reading landmarks from stdin");
        source::start_reader(BufReader::new(std::io::stdin()), frame_tx, started)?;
        None
    } else {
        let (provider, stdout) = Provider::spawn(&config.provider_command, &config)?;
        source::start_reader(stdout, frame_tx, started)?;
        Some(provider)
    };

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    let end = app::run(&mut pipeline, &frame_rx, shutdown).await;

    if let Some(provider) = provider.as_mut() {
        provider.stop();
    }

    log::debug!(
        "Last candidate gesture: {}",
        pipeline.filter().state().candidate_label
    );
    let mut stats = pipeline.stats().clone();
    stats.dropped_frames = frame_rx.dropped();
    log::info!("Session ended ({end}): {}", stats.summary());

    let history_path = History::default_path();
    let mut history = History::load(&history_path);
    history.record_session(&end.to_string(), stats);
    if let Err(e) = history.save(&history_path) {
        log::warn!("Failed to save session history: {e}");
    }

    Ok(end)
}
