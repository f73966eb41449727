// Line-delimited JSON adapter: commands in, snapshots and events out.

use crate::interface_adapters::protocol::{ClientMessage, EventDto, ServerMessage, SnapshotDto};
use crate::use_cases::{Command, SimSnapshot, WorldUpdate};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{Notify, broadcast, mpsc, watch};
use tracing::{debug, info, warn};

/// Reads one JSON command per line and forwards it to the world task.
///
/// Malformed lines are logged and skipped. End of input or a `Shutdown`
/// message signals `shutdown`.
pub async fn command_reader<R>(
    reader: R,
    input_tx: mpsc::Sender<Command>,
    shutdown: Arc<Notify>,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let msg = match serde_json::from_str::<ClientMessage>(line) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(error = %e, "ignoring malformed command");
                continue;
            }
        };

        let Some(command) = msg.into_command() else {
            info!("shutdown requested");
            shutdown.notify_one();
            return Ok(());
        };

        debug!(?command, "command received");
        if input_tx.send(command).await.is_err() {
            warn!("world task gone; command reader exiting");
            return Ok(());
        }
    }

    info!("command input closed");
    shutdown.notify_one();
    Ok(())
}

/// Writes the latest snapshot once per frame and each tick's events as they
/// arrive. Exits after a final snapshot once the world task is gone.
pub async fn snapshot_feed<W>(
    mut world_rx: broadcast::Receiver<WorldUpdate>,
    latest_rx: watch::Receiver<SimSnapshot>,
    frame_interval: Duration,
    mut out: W,
) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut frames = tokio::time::interval(frame_interval);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = frames.tick() => {
                let snapshot = latest_rx.borrow().clone();
                write_snapshot(&mut out, &snapshot).await?;
            }
            update = world_rx.recv() => match update {
                Ok(update) if update.events.is_empty() => {}
                Ok(update) => {
                    let msg = ServerMessage::Events {
                        tick: update.snapshot.tick,
                        events: update.events.iter().map(EventDto::from).collect(),
                    };
                    write_message(&mut out, &msg).await?;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(missed = n, "snapshot feed lagged; events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("world updates channel closed; snapshot feed exiting");
                    break;
                }
            }
        }
    }

    let snapshot = latest_rx.borrow().clone();
    write_snapshot(&mut out, &snapshot).await
}

async fn write_snapshot<W>(out: &mut W, snapshot: &SimSnapshot) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    write_message(out, &ServerMessage::Snapshot(SnapshotDto::from(snapshot))).await
}

async fn write_message<W>(out: &mut W, msg: &ServerMessage) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(msg)?;
    line.push(b'\n');
    out.write_all(&line).await?;
    out.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Area;
    use crate::use_cases::{SimEvent, SimulationEngine};
    use tokio::io::{AsyncReadExt, BufReader};

    #[tokio::test]
    async fn forwards_commands_until_shutdown() {
        let input = concat!(
            "{\"type\":\"Pause\"}\n",
            "not json\n",
            "\n",
            "{\"type\":\"SetCourse\",\"data\":{\"vehicle_id\":0,\"course\":90.0}}\n",
            "{\"type\":\"Shutdown\"}\n",
            "{\"type\":\"Resume\"}\n",
        );
        let (input_tx, mut input_rx) = mpsc::channel(8);
        let shutdown = Arc::new(Notify::new());

        command_reader(input.as_bytes(), input_tx, shutdown.clone())
            .await
            .unwrap();

        assert_eq!(input_rx.recv().await, Some(Command::Pause));
        assert_eq!(
            input_rx.recv().await,
            Some(Command::SetCourse {
                vehicle_id: 0,
                course: 90.0
            })
        );
        // the reader dropped its sender after Shutdown
        assert_eq!(input_rx.recv().await, None);
        shutdown.notified().await;
    }

    #[tokio::test]
    async fn end_of_input_requests_shutdown() {
        let (input_tx, _input_rx) = mpsc::channel(8);
        let shutdown = Arc::new(Notify::new());

        command_reader(&b""[..], input_tx, shutdown.clone())
            .await
            .unwrap();

        shutdown.notified().await;
    }

    #[tokio::test(start_paused = true)]
    async fn feed_writes_snapshots_and_events() {
        let engine = SimulationEngine::new(Area::new(1000.0, 800.0)).unwrap();
        let snapshot = engine.snapshot();
        let (world_tx, world_rx) = broadcast::channel(8);
        let (_latest_tx, latest_rx) = watch::channel(snapshot.clone());
        let (writer, reader) = tokio::io::duplex(64 * 1024);

        let feed = tokio::spawn(snapshot_feed(
            world_rx,
            latest_rx,
            Duration::from_millis(16),
            writer,
        ));
        world_tx
            .send(WorldUpdate {
                snapshot: snapshot.clone(),
                events: Vec::new(),
            })
            .unwrap();
        world_tx
            .send(WorldUpdate {
                snapshot,
                events: vec![SimEvent::BoundaryExit { vehicle_id: 1 }],
            })
            .unwrap();
        drop(world_tx);
        feed.await.unwrap().unwrap();

        let mut text = String::new();
        BufReader::new(reader)
            .read_to_string(&mut text)
            .await
            .unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["type"], "Snapshot");
        assert_eq!(lines[0]["data"]["vehicles"].as_array().unwrap().len(), 2);
        assert_eq!(lines[1]["type"], "Events");
        assert_eq!(lines[1]["data"]["events"][0]["kind"], "BoundaryExit");
        assert_eq!(lines[2]["type"], "Snapshot");
    }
}
