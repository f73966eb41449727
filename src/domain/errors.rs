// Domain-level errors and warnings for vehicle setup and conflict handling.

use std::fmt;

/// Recoverable topology problems reported by the conflict trigger.
///
/// These are logged and the trigger is skipped; the simulation keeps running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyWarning {
    /// The trigger fired with an empty vehicle set.
    NoVehicles,
    /// Only the triggering vehicle exists, so there is nothing to measure against.
    NoPeer { vehicle_id: usize },
    /// More vehicles than the pairwise protocol supports.
    UnsupportedTopology { count: usize },
}

impl fmt::Display for TopologyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyWarning::NoVehicles => {
                write!(f, "conflict trigger called but there are no vehicles")
            }
            TopologyWarning::NoPeer { vehicle_id } => {
                write!(f, "conflict trigger called for vehicle {vehicle_id} without a peer")
            }
            TopologyWarning::UnsupportedTopology { count } => write!(
                f,
                "conflict trigger called with {count} vehicles; only pairs are supported"
            ),
        }
    }
}

/// Internal-consistency faults that abort the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictFault {
    /// The vehicle at `index` does not carry id `index` (or `index` is out of range).
    IdMismatch { index: usize, found: Option<usize> },
}

impl fmt::Display for ConflictFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictFault::IdMismatch {
                index,
                found: Some(found),
            } => write!(f, "vehicle at index {index} has id {found}"),
            ConflictFault::IdMismatch { index, found: None } => {
                write!(f, "no vehicle at index {index}")
            }
        }
    }
}

impl std::error::Error for ConflictFault {}

/// Errors raised while building the vehicle set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    InvalidVehicle { id: usize, reason: &'static str },
    CapacityExceeded { requested: usize, capacity: usize },
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::InvalidVehicle { id, reason } => {
                write!(f, "invalid vehicle {id}: {reason}")
            }
            SetupError::CapacityExceeded {
                requested,
                capacity,
            } => write!(
                f,
                "requested {requested} vehicles but the registry holds at most {capacity}"
            ),
        }
    }
}

impl std::error::Error for SetupError {}
