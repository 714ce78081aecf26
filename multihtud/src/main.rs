//! multiHTU21D daemon
//!
//! Host adapter for the multiHTU21D sensor board. Owns the single board
//! driver, exposes each reading as an observable value and each actuator as
//! a switch, and polls the board on a schedule.
//!
//! The serial device comes from `--port` or `[board] port` in the config
//! file. `--once` runs a single poll cycle and exits.

mod entities;
mod poller;
mod shutdown;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use entities::Entities;
use multihtu_core::{default_config_path, Actuator, RefreshOutcome, StaticConfig};
use multihtu_hardware::BoardDriver;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Requested actuator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OnOff {
    On,
    Off,
}

/// multiHTU21D sensor board daemon
#[derive(Parser, Debug)]
#[command(name = "multihtud")]
#[command(version, about = "multiHTU21D sensor board daemon", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial device path (e.g., /dev/ttyUSB0); overrides the config file
    #[arg(short, long)]
    port: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log every byte exchanged with the board
    #[arg(long)]
    debug_uart: bool,

    /// Run one poll cycle and exit
    #[arg(long)]
    once: bool,

    /// Print each cycle as a JSON object instead of log lines
    #[arg(long)]
    json: bool,

    /// Switch the heater at startup
    #[arg(long, value_enum)]
    heater: Option<OnOff>,

    /// Switch the fan at startup
    #[arg(long, value_enum)]
    fan: Option<OnOff>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(args.verbose);

    info!("multiHTU21D daemon starting...");

    // CLI flag > env var > default
    let config_path = args.config.clone().unwrap_or_else(|| {
        std::env::var("MULTIHTU_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_config_path())
    });
    info!("Configuration file: {}", config_path.display());

    let config = load_config(&config_path, &args)?;
    let port = config.port()?.to_string();
    let debug_uart = args.debug_uart || config.board.debug_uart;

    let board = Arc::new(BoardDriver::new(port, debug_uart));
    info!("Using board at {}", board.port_path());

    // First read happens at startup, like a fresh integration setup
    match board.refresh().await {
        RefreshOutcome::Updated => info!("Board is responding"),
        RefreshOutcome::Unavailable => error!(
            "Port {} is not accessible; will retry on the next poll",
            board.port_path()
        ),
        other => warn!("Initial read incomplete: {:?}", other),
    }

    let mut entities = Entities::new(board.clone());
    apply_switch(&mut entities, Actuator::Heater, args.heater).await;
    apply_switch(&mut entities, Actuator::Fan, args.fan).await;

    if args.once {
        poller::poll_once(&mut entities.values).await;
        poller::report(&entities.values, args.json)?;
        shutdown::release_board(&board).await;
        return Ok(());
    }

    let period = Duration::from_secs(config.poll.interval_secs);
    info!("Polling every {}s", period.as_secs());

    let result = tokio::select! {
        result = poller::run(&mut entities.values, period, args.json) => result,
        _ = shutdown::shutdown_signal() => Ok(()),
    };

    shutdown::release_board(&board).await;
    info!("Daemon shutdown complete");
    result
}

/// Load the config file and apply CLI overrides
fn load_config(path: &std::path::Path, args: &Args) -> Result<StaticConfig> {
    let mut config = StaticConfig::load(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    if let Some(port) = &args.port {
        config.board.port = Some(port.clone());
    }

    config.validate()?;
    Ok(config)
}

/// Send a startup actuator command if one was requested
async fn apply_switch(entities: &mut Entities, actuator: Actuator, requested: Option<OnOff>) {
    let Some(state) = requested else {
        return;
    };

    let switch = entities.switch_mut(actuator);
    let outcome = match state {
        OnOff::On => switch.turn_on().await,
        OnOff::Off => switch.turn_off().await,
    };
    info!(
        "{} switched {} ({:?})",
        switch.name(),
        if switch.is_on() { "on" } else { "off" },
        outcome
    );
}

/// Initialize tracing subscriber for logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
