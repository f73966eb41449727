// Framework bootstrap for the simulator runtime.

use crate::frameworks::config::{self, SimSettings};
use crate::interface_adapters::console::{command_reader, snapshot_feed};
use crate::use_cases::{Command, SimSnapshot, SimulationEngine, WorldUpdate, world_task};

use std::{io, sync::Arc};
use tokio::io::BufReader;
use tokio::sync::{Notify, broadcast, mpsc, watch};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // stdout carries the snapshot feed; logs go to stderr.
    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Runs the simulation until shutdown: commands on stdin, JSON feed on stdout.
pub async fn run(settings: SimSettings) -> io::Result<()> {
    let engine = SimulationEngine::new(settings.area()).map_err(io::Error::other)?;

    // input_tx/rx: every command goes to the single world task.
    let (input_tx, input_rx) = mpsc::channel::<Command>(config::INPUT_CHANNEL_CAPACITY);
    // world_tx/rx: per-tick updates with that tick's events.
    let (world_tx, world_rx) = broadcast::channel::<WorldUpdate>(config::WORLD_BROADCAST_CAPACITY);
    // latest_tx/rx: most recent snapshot for the presentation feed.
    let (latest_tx, latest_rx) = watch::channel::<SimSnapshot>(engine.snapshot());
    let shutdown = Arc::new(Notify::new());

    let world = tokio::spawn(world_task(
        engine,
        input_rx,
        world_tx,
        latest_tx,
        settings.tick_interval(),
        shutdown.clone(),
    ));

    let feed = tokio::spawn(snapshot_feed(
        world_rx,
        latest_rx,
        settings.frame_interval(),
        tokio::io::stdout(),
    ));

    // Detached: a pending stdin read never completes on its own.
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            let stdin = BufReader::new(tokio::io::stdin());
            if let Err(e) = command_reader(stdin, input_tx, shutdown).await {
                tracing::error!(error = %e, "command reader failed");
            }
        }
    });

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received");
                shutdown.notify_one();
            }
        }
    });

    tracing::info!(
        width = settings.width,
        height = settings.height,
        tick_rate = settings.tick_rate,
        frame_rate = settings.frame_rate,
        "simulation running"
    );

    let outcome = world.await.map_err(io::Error::other)?;

    // The world task dropped its sender; the feed writes a final frame and ends.
    feed.await.map_err(io::Error::other)?.inspect_err(|e| {
        tracing::error!(error = %e, "snapshot feed failed");
    })?;

    outcome.map_err(io::Error::other)
}

pub async fn run_with_config() -> io::Result<()> {
    init_runtime();

    let settings = SimSettings::load().map_err(|e| {
        tracing::error!(error = %e, "failed to load settings");
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    run(settings).await
}
