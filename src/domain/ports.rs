use crate::domain::systems::conflict::ConflictReport;
use crate::domain::vehicle::Vehicle;

// Port for advancing a single vehicle by one tick.
//
// Implementations must only read and write the vehicle they are given.
pub trait KinematicsStepper: Send + Sync {
    fn step(&self, vehicle: &mut Vehicle);
}

// Port for conflict resolution after a safezone incursion is detected.
//
// Returns a new course (degrees) for the triggering vehicle, or `None` to hold.
pub trait ConflictResolver: Send + Sync {
    fn resolve(&self, report: &ConflictReport, vehicle: &Vehicle, peer: &Vehicle) -> Option<f64>;
}

/// Resolver that never maneuvers; detection only.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoldCourse;

impl ConflictResolver for HoldCourse {
    fn resolve(&self, _report: &ConflictReport, _vehicle: &Vehicle, _peer: &Vehicle) -> Option<f64> {
        None
    }
}
