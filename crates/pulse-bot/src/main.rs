//! Pulse bot - entry point.
//!
//! Runs the automation layer against the back-end selected in the config.
//! The simulated back-end is self-contained (an in-process round simulator
//! closes the loop); the visual and live back-ends need a surface driver
//! wired by the embedding deployment and are rejected here.

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use rust_decimal_macros::dec;
use tokio::sync::mpsc;
use tracing::info;

use pulse_bot::{ActionInterface, BotConfig};
use pulse_core::{system_clock, ActionParams, Cash, ExecutorKind};
use pulse_executor::SimulatedExecutor;
use pulse_persistence::spawn_log_writer;

/// Pulse game automation bot
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via PULSE_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    pulse_telemetry::init_logging()?;

    info!("Starting pulse-bot v{}", env!("CARGO_PKG_VERSION"));

    // Config path: CLI arg > PULSE_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("PULSE_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    let config = if std::path::Path::new(&config_path).exists() {
        info!(config_path = %config_path, "Loading configuration");
        BotConfig::from_file(&config_path)?
    } else {
        info!(config_path = %config_path, "Config file not found, using defaults");
        BotConfig::default()
    };

    match config.executor {
        ExecutorKind::Simulated => run_simulated(config).await,
        ExecutorKind::Visual | ExecutorKind::Live => {
            bail!(
                "executor kind '{}' needs a game surface driver wired by the \
                 embedding deployment; only 'simulated' is self-contained",
                config.executor
            );
        }
    }
}

/// Smoke run against the in-process simulated game: open, close, side
/// wager, then report latency statistics and the final state snapshot.
async fn run_simulated(config: BotConfig) -> Result<()> {
    let clock = system_clock();

    let (log, log_writer) = spawn_log_writer(&config.log_dir);
    let (executor, action_rx) = SimulatedExecutor::with_channel(clock.clone());
    let (update_tx, update_rx) = mpsc::unbounded_channel();

    let sim = pulse_bot::spawn_sim_game(action_rx, update_tx);

    let interface = Arc::new(ActionInterface::with_clock(
        &config.interface,
        Arc::new(executor),
        log,
        clock,
    ));

    let pump = interface.spawn_update_pump(update_rx);

    // Give the simulator a moment to emit its baseline snapshot.
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    for params in [
        ActionParams::Open {
            amount: Cash::new(dec!(1.0)),
        },
        ActionParams::Close { fraction: dec!(1) },
        ActionParams::SideWager {
            amount: Cash::new(dec!(0.01)),
        },
    ] {
        let kind = params.kind();
        let result = interface.execute_action(params).await?;
        info!(
            %kind,
            success = result.success,
            latency_ms = ?result.latency_ms,
            cash = %result.state.cash,
            position_qty = %result.state.position_qty,
            "Action completed"
        );
    }

    let stats = interface.latency_stats();
    info!(
        avg_ms = stats.avg_ms,
        p50_ms = stats.p50_ms,
        p95_ms = stats.p95_ms,
        samples = stats.sample_count,
        "Confirmation latency"
    );

    let state = interface.state_snapshot();
    info!(
        cash = %state.cash,
        position_qty = %state.position_qty,
        wager = ?state.active_wager,
        "Final state snapshot"
    );

    interface.shutdown();

    // Teardown order matters: the pump holds an interface handle (and with
    // it the simulator's action channel), so stop it first.
    pump.abort();
    drop(interface);
    let _ = sim.await;
    let _ = log_writer.await;

    Ok(())
}
