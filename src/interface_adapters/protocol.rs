// Wire protocol DTOs for the line-delimited JSON console interface.

use crate::domain::VehicleSnapshot;
use crate::use_cases::{Command, SimEvent, SimPhase, SimSnapshot, TurnDirection};
use serde::{Deserialize, Serialize};

/// Messages written to the output feed, one JSON object per line.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // Latest state of the simulation, once per presentation frame.
    Snapshot(SnapshotDto),
    // Events raised by a single physics tick.
    Events { tick: u64, events: Vec<EventDto> },
}

/// Messages read from the input side, one JSON object per line.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    SetCourse { vehicle_id: usize, course: f64 },
    AdjustSpeed { vehicle_id: usize, delta: f64 },
    NudgeCourse { vehicle_id: usize, direction: TurnDirectionDto },
    Restart,
    Pause,
    Resume,
    TogglePause,
    ToggleCollisionInjection,
    // Ends the process; never reaches the engine.
    Shutdown,
}

impl ClientMessage {
    /// Engine command carried by this message, or `None` for `Shutdown`.
    pub fn into_command(self) -> Option<Command> {
        let command = match self {
            ClientMessage::SetCourse { vehicle_id, course } => {
                Command::SetCourse { vehicle_id, course }
            }
            ClientMessage::AdjustSpeed { vehicle_id, delta } => {
                Command::AdjustSpeed { vehicle_id, delta }
            }
            ClientMessage::NudgeCourse {
                vehicle_id,
                direction,
            } => Command::NudgeCourse {
                vehicle_id,
                direction: direction.into(),
            },
            ClientMessage::Restart => Command::Restart,
            ClientMessage::Pause => Command::Pause,
            ClientMessage::Resume => Command::Resume,
            ClientMessage::TogglePause => Command::TogglePause,
            ClientMessage::ToggleCollisionInjection => Command::ToggleCollisionInjection,
            ClientMessage::Shutdown => return None,
        };
        Some(command)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub enum TurnDirectionDto {
    Left,
    Right,
}

impl From<TurnDirectionDto> for TurnDirection {
    fn from(direction: TurnDirectionDto) -> Self {
        match direction {
            TurnDirectionDto::Left => TurnDirection::Left,
            TurnDirectionDto::Right => TurnDirection::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub enum PhaseDto {
    Running,
    Stopped,
    Finished,
}

impl From<SimPhase> for PhaseDto {
    fn from(phase: SimPhase) -> Self {
        match phase {
            SimPhase::Running => PhaseDto::Running,
            SimPhase::Stopped => PhaseDto::Stopped,
            SimPhase::Finished => PhaseDto::Finished,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotDto {
    pub tick: u64,
    pub phase: PhaseDto,
    pub is_stopped: bool,
    pub is_finished: bool,
    pub collision_injection: bool,
    pub tick_rate: f64,
    pub vehicles: Vec<VehicleStateDto>,
}

impl From<&SimSnapshot> for SnapshotDto {
    fn from(snapshot: &SimSnapshot) -> Self {
        Self {
            tick: snapshot.tick,
            phase: snapshot.phase.into(),
            is_stopped: snapshot.is_stopped(),
            is_finished: snapshot.is_finished(),
            collision_injection: snapshot.collision_injection,
            tick_rate: snapshot.tick_rate,
            vehicles: snapshot.vehicles.iter().map(VehicleStateDto::from).collect(),
        }
    }
}

/// Flattened vehicle state. Angles are in degrees.
#[derive(Debug, Clone, Serialize)]
pub struct VehicleStateDto {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
    pub course: f64,
    pub speed: f64,
    pub size: f64,
    pub safezone_size: f64,
    pub safezone_occupied: bool,
    pub distance_covered: f64,
    pub path: Vec<[f64; 2]>,
}

impl From<&VehicleSnapshot> for VehicleStateDto {
    fn from(vehicle: &VehicleSnapshot) -> Self {
        Self {
            id: vehicle.id,
            x: vehicle.position.x,
            y: vehicle.position.y,
            yaw: vehicle.yaw_angle,
            course: vehicle.course,
            speed: vehicle.speed,
            size: vehicle.size,
            safezone_size: vehicle.safezone_size,
            safezone_occupied: vehicle.safezone_occupied,
            distance_covered: vehicle.distance_covered,
            path: vehicle.recent_path.iter().map(|p| p.to_array()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum EventDto {
    SafezoneEntered {
        vehicle_id: usize,
    },
    SafezoneLeft {
        vehicle_id: usize,
    },
    ConflictDetected {
        vehicle_id: usize,
        peer_id: usize,
        separation: f64,
        relative: [f64; 2],
        correction: Option<f64>,
    },
    ConflictSkipped {
        vehicle_id: usize,
        warning: String,
    },
    Collision {
        first: usize,
        second: usize,
    },
    BoundaryExit {
        vehicle_id: usize,
    },
}

impl From<&SimEvent> for EventDto {
    fn from(event: &SimEvent) -> Self {
        match *event {
            SimEvent::SafezoneEntered { vehicle_id } => EventDto::SafezoneEntered { vehicle_id },
            SimEvent::SafezoneLeft { vehicle_id } => EventDto::SafezoneLeft { vehicle_id },
            SimEvent::ConflictDetected { report, correction } => EventDto::ConflictDetected {
                vehicle_id: report.vehicle_id,
                peer_id: report.peer_id,
                separation: report.separation,
                relative: report.relative.to_array(),
                correction,
            },
            SimEvent::ConflictSkipped {
                vehicle_id,
                warning,
            } => EventDto::ConflictSkipped {
                vehicle_id,
                warning: warning.to_string(),
            },
            SimEvent::Collision { first, second } => EventDto::Collision { first, second },
            SimEvent::BoundaryExit { vehicle_id } => EventDto::BoundaryExit { vehicle_id },
        }
    }
}
