// Use-case level inputs/outputs for the simulation loop.

use crate::domain::{ConflictReport, TopologyWarning, VehicleSnapshot};

/// Engine lifecycle. `Finished` implies the physics tick is halted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimPhase {
    Running,
    Stopped,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    /// Decreasing course angle.
    Left,
    /// Increasing course angle.
    Right,
}

/// Commands accepted from the input side, applied at tick boundaries.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetCourse {
        vehicle_id: usize,
        course: f64,
    },
    AdjustSpeed {
        vehicle_id: usize,
        delta: f64,
    },
    /// Shift the course by twice the vehicle's turn-rate limit.
    NudgeCourse {
        vehicle_id: usize,
        direction: TurnDirection,
    },
    /// Stop, reset, start.
    Restart,
    Pause,
    Resume,
    /// Pause or resume; after a terminal condition, reset and start.
    TogglePause,
    ToggleCollisionInjection,
}

/// Things that happened during one tick, in the order they happened.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    SafezoneEntered {
        vehicle_id: usize,
    },
    SafezoneLeft {
        vehicle_id: usize,
    },
    ConflictDetected {
        report: ConflictReport,
        correction: Option<f64>,
    },
    ConflictSkipped {
        vehicle_id: usize,
        warning: TopologyWarning,
    },
    Collision {
        first: usize,
        second: usize,
    },
    BoundaryExit {
        vehicle_id: usize,
    },
}

/// Immutable view of the simulation published after every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SimSnapshot {
    pub tick: u64,
    pub phase: SimPhase,
    pub collision_injection: bool,
    /// Measured physics ticks per second; zero while stopped.
    pub tick_rate: f64,
    pub vehicles: Vec<VehicleSnapshot>,
}

impl SimSnapshot {
    pub fn is_stopped(&self) -> bool {
        self.phase != SimPhase::Running
    }

    pub fn is_finished(&self) -> bool {
        self.phase == SimPhase::Finished
    }
}

#[derive(Debug, Clone)]
pub struct WorldUpdate {
    pub snapshot: SimSnapshot,
    pub events: Vec<SimEvent>,
}
