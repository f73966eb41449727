// Use cases layer: the simulation engine and the loop that drives it.
pub mod engine;
pub mod tick_rate;
pub mod types;
pub mod world;

pub use engine::{CommandError, EngineError, SimulationEngine};
pub use types::{Command, SimEvent, SimPhase, SimSnapshot, TurnDirection, WorldUpdate};
pub use world::world_task;
