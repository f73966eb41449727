// Domain layer: vehicle state and the per-tick simulation rules.

pub mod errors;
pub mod ports;
pub mod registry;
pub mod systems;
pub mod tuning;
pub mod vehicle;

#[cfg(test)]
pub(crate) mod test_support;

pub use errors::{ConflictFault, SetupError, TopologyWarning};
pub use ports::{ConflictResolver, HoldCourse, KinematicsStepper};
pub use registry::{MAX_VEHICLES, VehicleRegistry};
pub use systems::boundary::Area;
pub use systems::conflict::{ConflictOutcome, ConflictReport};
pub use systems::kinematics::RateLimitedTurn;
pub use vehicle::{Vehicle, VehicleSnapshot, VehicleSpec, wrap_degrees};
