use super::engine::{EngineError, SimulationEngine};
use super::types::{Command, WorldUpdate};
use super::SimSnapshot;
use crate::domain::{ConflictResolver, KinematicsStepper};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, broadcast, mpsc, watch};
use tracing::{debug, error, info, warn};

/// Authoritative physics loop. Owns the engine for its whole lifetime.
///
/// Commands are drained at each tick boundary, then the engine advances one
/// step and the resulting snapshot is published. Pausing only stops the engine
/// from advancing; the loop keeps running so commands and snapshots still flow.
pub async fn world_task<S, R>(
    mut engine: SimulationEngine<S, R>,
    mut input_rx: mpsc::Receiver<Command>,
    world_tx: broadcast::Sender<WorldUpdate>,
    latest_tx: watch::Sender<SimSnapshot>,
    tick_interval: Duration,
    shutdown: Arc<Notify>,
) -> Result<(), EngineError>
where
    S: KinematicsStepper,
    R: ConflictResolver,
{
    engine.restart();
    let _ = latest_tx.send(engine.snapshot());

    // Drive the fixed-step loop at the configured tick rate.
    let mut interval = tokio::time::interval(tick_interval);

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                info!(tick = engine.tick_count(), "world task shutting down");
                break;
            }
            _ = interval.tick() => {}
        }

        while let Ok(command) = input_rx.try_recv() {
            debug!(?command, "applying command");
            if let Err(e) = engine.apply_command(command) {
                warn!(error = %e, "command rejected");
            }
        }

        let events = match engine.tick() {
            Ok(events) => events,
            Err(e) => {
                // The watch keeps the last complete snapshot.
                error!(error = %e, "simulation aborted");
                return Err(e);
            }
        };

        let snapshot = engine.snapshot();
        let _ = latest_tx.send(snapshot.clone());
        let _ = world_tx.send(WorldUpdate { snapshot, events });
    }

    Ok(())
}
