// Per-tick simulation rules, run by the engine in this order:
// kinematics, proximity, collision, boundary, injector.

pub mod boundary;
pub mod collision;
pub mod conflict;
pub mod injector;
pub mod kinematics;
pub mod proximity;
