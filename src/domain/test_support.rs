use crate::domain::vehicle::{Vehicle, VehicleSpec};
use glam::DVec2;

// Vehicle with default tuning heading along +x; any id is accepted so tests can
// build inconsistent sets on purpose.
pub(crate) fn vehicle_at(id: usize, x: f64, y: f64) -> Vehicle {
    Vehicle::new(id, VehicleSpec::at(DVec2::new(x, y), 0.0)).expect("valid test vehicle")
}
