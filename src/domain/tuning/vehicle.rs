use crate::domain::vehicle::VehicleSpec;
use glam::DVec2;

/// Airframe tuning for simulated vehicles.
///
/// Keep this separate from runtime configuration (area size, tick rates, buffer sizes).
#[derive(Debug, Clone, Copy)]
pub struct VehicleTuning {
    /// Hitbox diameter in scene units.
    pub size: f64,

    /// Safety perimeter diameter in scene units.
    pub safezone_size: f64,

    /// Turn-rate limit in degrees per tick.
    pub max_course_change: f64,

    /// Speed every vehicle starts with, in scene units per tick.
    pub start_speed: f64,

    /// Lowest speed the command surface accepts.
    pub min_commanded_speed: f64,
}

impl Default for VehicleTuning {
    fn default() -> Self {
        Self {
            size: 20.0,
            safezone_size: 150.0,
            max_course_change: 2.0,
            start_speed: 2.0,
            min_commanded_speed: 1.0,
        }
    }
}

/// Fixed starting configuration rebuilt on every reset.
///
/// Vehicle 0 starts near the top-left corner heading 45 degrees, vehicle 1 near
/// the top-right corner heading 135 degrees; on the default area they meet head-on.
pub fn starting_layout() -> Vec<VehicleSpec> {
    vec![
        VehicleSpec::at(DVec2::new(100.0, 100.0), 45.0),
        VehicleSpec::at(DVec2::new(900.0, 100.0), 135.0),
    ]
}
