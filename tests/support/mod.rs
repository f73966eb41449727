// Shared scenario builders for the integration tests.
#![allow(dead_code)]

use glam::DVec2;
use uav_sim::domain::{Area, VehicleSpec};
use uav_sim::use_cases::{SimEvent, SimulationEngine};

pub const AREA: Area = Area {
    width: 1000.0,
    height: 800.0,
};

pub fn spec(x: f64, y: f64, heading: f64) -> VehicleSpec {
    VehicleSpec::at(DVec2::new(x, y), heading)
}

// Started engine that rebuilds `specs` on reset.
pub fn running(specs: Vec<VehicleSpec>) -> SimulationEngine {
    let mut engine = SimulationEngine::with_scenario(AREA, specs).expect("valid scenario");
    engine.start().expect("fresh engine starts");
    engine
}

// Ticks until the engine stops on its own, collecting every event.
pub fn run_until_stopped(engine: &mut SimulationEngine, max_ticks: usize) -> Vec<SimEvent> {
    let mut events = Vec::new();
    for _ in 0..max_ticks {
        events.extend(engine.tick().expect("consistent vehicle set"));
        if engine.is_stopped() {
            break;
        }
    }
    events
}
