use crate::domain::errors::{ConflictFault, TopologyWarning};
use crate::domain::ports::ConflictResolver;
use crate::domain::registry::MAX_VEHICLES;
use crate::domain::vehicle::Vehicle;
use glam::DVec2;
use tracing::{info, warn};

/// Geometry of a detected safezone incursion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConflictReport {
    /// The vehicle whose safezone was entered.
    pub vehicle_id: usize,
    /// The intruding vehicle.
    pub peer_id: usize,
    /// Distance between the two centers.
    pub separation: f64,
    /// Triggering vehicle position relative to the peer.
    pub relative: DVec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConflictOutcome {
    /// Conflict measured; `correction` is the course the resolver applied, if any.
    Detected {
        report: ConflictReport,
        correction: Option<f64>,
    },
    /// Topology precondition failed; nothing was touched.
    Skipped(TopologyWarning),
}

/// Validates the vehicle set and measures the conflict for `vehicle_id`.
///
/// Count problems are warnings. A vehicle that does not sit at the index
/// matching its id is a fault: the set is corrupt and the caller must abort.
pub fn detect(vehicles: &[Vehicle], vehicle_id: usize) -> Result<ConflictOutcome, ConflictFault> {
    if vehicles.is_empty() {
        return Ok(ConflictOutcome::Skipped(TopologyWarning::NoVehicles));
    }
    if vehicles.len() > MAX_VEHICLES {
        return Ok(ConflictOutcome::Skipped(
            TopologyWarning::UnsupportedTopology {
                count: vehicles.len(),
            },
        ));
    }

    let vehicle = vehicles.get(vehicle_id).ok_or(ConflictFault::IdMismatch {
        index: vehicle_id,
        found: None,
    })?;
    if vehicle.id() != vehicle_id {
        return Err(ConflictFault::IdMismatch {
            index: vehicle_id,
            found: Some(vehicle.id()),
        });
    }

    let Some(peer) = peer_index(vehicles, vehicle_id).map(|index| &vehicles[index]) else {
        return Ok(ConflictOutcome::Skipped(TopologyWarning::NoPeer { vehicle_id }));
    };

    Ok(ConflictOutcome::Detected {
        report: ConflictReport {
            vehicle_id,
            peer_id: peer.id(),
            separation: vehicle.distance_to(peer),
            relative: vehicle.position - peer.position,
        },
        correction: None,
    })
}

fn peer_index(vehicles: &[Vehicle], vehicle_id: usize) -> Option<usize> {
    (0..vehicles.len()).find(|&index| index != vehicle_id)
}

/// Runs detection, then hands the conflict to `resolver` and applies its course.
pub fn trigger<R>(
    vehicles: &mut [Vehicle],
    vehicle_id: usize,
    resolver: &R,
) -> Result<ConflictOutcome, ConflictFault>
where
    R: ConflictResolver + ?Sized,
{
    let report = match detect(vehicles, vehicle_id)? {
        ConflictOutcome::Detected { report, .. } => report,
        ConflictOutcome::Skipped(warning) => {
            warn!(vehicle_id, %warning, "conflict avoidance skipped");
            return Ok(ConflictOutcome::Skipped(warning));
        }
    };

    info!(
        vehicle_id,
        peer_id = report.peer_id,
        separation = report.separation,
        relative_x = report.relative.x,
        relative_y = report.relative.y,
        "conflict detected"
    );

    let Some(peer) = peer_index(vehicles, vehicle_id) else {
        return Ok(ConflictOutcome::Detected {
            report,
            correction: None,
        });
    };
    let correction = resolver.resolve(&report, &vehicles[vehicle_id], &vehicles[peer]);
    let correction = correction.filter(|course| course.is_finite()).map(|course| {
        let vehicle = &mut vehicles[vehicle_id];
        vehicle.set_course(course);
        info!(vehicle_id, course = vehicle.course, "avoidance course applied");
        vehicle.course
    });

    Ok(ConflictOutcome::Detected { report, correction })
}
