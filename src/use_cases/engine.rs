// Simulation engine: owns the vehicle set and runs the fixed-step pipeline.

use super::tick_rate::TickRateMeter;
use super::types::{Command, SimEvent, SimPhase, SimSnapshot, TurnDirection};
use crate::domain::systems::proximity::{self, SafezoneTransition};
use crate::domain::systems::{boundary, collision, conflict, injector};
use crate::domain::tuning::vehicle::{VehicleTuning, starting_layout};
use crate::domain::{
    Area, ConflictFault, ConflictOutcome, ConflictResolver, HoldCourse, KinematicsStepper,
    RateLimitedTurn, SetupError, Vehicle, VehicleRegistry, VehicleSnapshot, VehicleSpec,
};
use std::fmt;
use tokio::time::Instant;
use tracing::{error, info};

/// Reasons a command was refused. The engine state is left untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    UnknownVehicle {
        vehicle_id: usize,
    },
    SpeedBelowMinimum {
        vehicle_id: usize,
        requested: f64,
        minimum: f64,
    },
    NonFiniteValue {
        vehicle_id: usize,
    },
    /// Resume was requested after a terminal condition; only a reset helps.
    SimulationFinished,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownVehicle { vehicle_id } => {
                write!(f, "no vehicle with id {vehicle_id}")
            }
            CommandError::SpeedBelowMinimum {
                vehicle_id,
                requested,
                minimum,
            } => write!(
                f,
                "speed {requested} for vehicle {vehicle_id} is below the minimum of {minimum}"
            ),
            CommandError::NonFiniteValue { vehicle_id } => {
                write!(f, "non-finite value in command for vehicle {vehicle_id}")
            }
            CommandError::SimulationFinished => {
                write!(f, "simulation has finished; reset before resuming")
            }
        }
    }
}

impl std::error::Error for CommandError {}

/// Fatal engine failures. The tick that raised one was aborted.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    Conflict(ConflictFault),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Conflict(fault) => write!(f, "conflict trigger fault: {fault}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<ConflictFault> for EngineError {
    fn from(fault: ConflictFault) -> Self {
        EngineError::Conflict(fault)
    }
}

/// Fixed-step simulation of a small vehicle set.
///
/// The engine starts `Stopped` with the starting layout in place; call
/// [`start`](Self::start) to run it. Terminal conditions move it to `Finished`,
/// which only [`reset`](Self::reset) clears.
pub struct SimulationEngine<S = RateLimitedTurn, R = HoldCourse> {
    area: Area,
    tuning: VehicleTuning,
    // Layout rebuilt on reset.
    template: VehicleRegistry,
    vehicles: VehicleRegistry,
    phase: SimPhase,
    tick: u64,
    collision_injection: bool,
    tick_rate: TickRateMeter,
    stepper: S,
    resolver: R,
}

impl SimulationEngine {
    /// Engine with the fixed two-vehicle starting layout.
    pub fn new(area: Area) -> Result<Self, SetupError> {
        Self::with_scenario(area, starting_layout())
    }

    /// Engine whose reset rebuilds `specs` instead of the default layout.
    pub fn with_scenario<I>(area: Area, specs: I) -> Result<Self, SetupError>
    where
        I: IntoIterator<Item = VehicleSpec>,
    {
        Self::with_parts(area, specs, RateLimitedTurn, HoldCourse)
    }
}

impl<S, R> SimulationEngine<S, R>
where
    S: KinematicsStepper,
    R: ConflictResolver,
{
    pub fn with_parts<I>(area: Area, specs: I, stepper: S, resolver: R) -> Result<Self, SetupError>
    where
        I: IntoIterator<Item = VehicleSpec>,
    {
        let template = VehicleRegistry::from_specs(specs)?;
        Ok(Self {
            area,
            tuning: VehicleTuning::default(),
            vehicles: template.clone(),
            template,
            phase: SimPhase::Stopped,
            tick: 0,
            collision_injection: false,
            tick_rate: TickRateMeter::default(),
            stepper,
            resolver,
        })
    }

    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    pub fn is_stopped(&self) -> bool {
        self.phase != SimPhase::Running
    }

    pub fn is_finished(&self) -> bool {
        self.phase == SimPhase::Finished
    }

    /// Ticks advanced since the last reset.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn collision_injection(&self) -> bool {
        self.collision_injection
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        self.vehicles.as_slice()
    }

    /// Discards every vehicle and rebuilds the starting layout.
    ///
    /// Clears `Finished`; a running engine keeps running.
    pub fn reset(&mut self) {
        self.vehicles.clear();
        self.vehicles = self.template.clone();
        self.tick = 0;
        if self.phase == SimPhase::Finished {
            self.phase = SimPhase::Stopped;
        }
        info!(vehicles = self.vehicles.len(), "simulation reset");
    }

    /// Resumes the physics tick. Refused once the simulation has finished.
    pub fn start(&mut self) -> Result<(), CommandError> {
        if self.is_finished() {
            return Err(CommandError::SimulationFinished);
        }
        self.run();
        Ok(())
    }

    /// Halts the physics tick and zeroes the measured tick rate.
    pub fn stop(&mut self) {
        if self.phase == SimPhase::Running {
            self.phase = SimPhase::Stopped;
            info!(tick = self.tick, "simulation stopped");
        }
        self.tick_rate.reset();
    }

    pub fn restart(&mut self) {
        self.stop();
        self.reset();
        self.run();
    }

    pub fn toggle_pause(&mut self) {
        match self.phase {
            SimPhase::Running => self.stop(),
            SimPhase::Stopped => self.run(),
            SimPhase::Finished => {
                self.reset();
                self.run();
            }
        }
    }

    fn run(&mut self) {
        if self.phase != SimPhase::Running {
            self.phase = SimPhase::Running;
            info!(tick = self.tick, "simulation started");
        }
    }

    fn finish(&mut self) {
        self.stop();
        self.phase = SimPhase::Finished;
    }

    pub fn apply_command(&mut self, command: Command) -> Result<(), CommandError> {
        match command {
            Command::SetCourse { vehicle_id, course } => {
                if !course.is_finite() {
                    return Err(CommandError::NonFiniteValue { vehicle_id });
                }
                self.vehicle_mut(vehicle_id)?.set_course(course);
            }
            Command::AdjustSpeed { vehicle_id, delta } => {
                if !delta.is_finite() {
                    return Err(CommandError::NonFiniteValue { vehicle_id });
                }
                let minimum = self.tuning.min_commanded_speed;
                let vehicle = self.vehicle_mut(vehicle_id)?;
                let requested = vehicle.speed + delta;
                if !requested.is_finite() {
                    return Err(CommandError::NonFiniteValue { vehicle_id });
                }
                if requested < minimum {
                    return Err(CommandError::SpeedBelowMinimum {
                        vehicle_id,
                        requested,
                        minimum,
                    });
                }
                vehicle.speed = requested;
            }
            Command::NudgeCourse {
                vehicle_id,
                direction,
            } => {
                let vehicle = self.vehicle_mut(vehicle_id)?;
                let step = 2.0 * vehicle.max_course_change;
                let step = match direction {
                    TurnDirection::Left => -step,
                    TurnDirection::Right => step,
                };
                vehicle.set_course(vehicle.course + step);
            }
            Command::Restart => self.restart(),
            Command::Pause => self.stop(),
            Command::Resume => self.start()?,
            Command::TogglePause => self.toggle_pause(),
            Command::ToggleCollisionInjection => {
                self.collision_injection = !self.collision_injection;
                info!(enabled = self.collision_injection, "collision injection toggled");
            }
        }
        Ok(())
    }

    fn vehicle_mut(&mut self, vehicle_id: usize) -> Result<&mut Vehicle, CommandError> {
        self.vehicles
            .get_mut(vehicle_id)
            .ok_or(CommandError::UnknownVehicle { vehicle_id })
    }

    /// Advances one fixed step. A no-op unless running.
    ///
    /// On `Err` the engine is stopped and every safezone flag is restored to
    /// its value before the proximity pass; positions keep this tick's motion.
    pub fn tick(&mut self) -> Result<Vec<SimEvent>, EngineError> {
        if self.phase != SimPhase::Running {
            return Ok(Vec::new());
        }
        self.tick_rate.record(Instant::now());
        self.tick += 1;

        for vehicle in self.vehicles.as_mut_slice() {
            self.stepper.step(vehicle);
        }

        let flags: Vec<bool> = self.vehicles.iter().map(|v| v.safezone_occupied).collect();
        let mut events = Vec::new();
        if let Err(fault) = self.check_safezones(&mut events) {
            error!(tick = self.tick, error = %fault, "vehicle set is inconsistent; tick aborted");
            for (vehicle, occupied) in self.vehicles.as_mut_slice().iter_mut().zip(flags) {
                vehicle.safezone_occupied = occupied;
            }
            self.stop();
            return Err(fault.into());
        }

        if let Some((first, second)) = collision::find_collision(self.vehicles.as_slice()) {
            self.finish();
            info!(first, second, tick = self.tick, "vehicles collided; simulation stopped");
            events.push(SimEvent::Collision { first, second });
            return Ok(events);
        }

        if let Some(vehicle_id) = boundary::find_out_of_bounds(self.vehicles.as_slice(), self.area)
        {
            self.finish();
            info!(
                vehicle_id,
                tick = self.tick,
                "vehicle left simulation boundaries; simulation stopped"
            );
            events.push(SimEvent::BoundaryExit { vehicle_id });
            return Ok(events);
        }

        if self.collision_injection {
            injector::steer_into_collision(self.vehicles.as_mut_slice());
        }

        Ok(events)
    }

    fn check_safezones(&mut self, events: &mut Vec<SimEvent>) -> Result<(), ConflictFault> {
        let resolver = &self.resolver;
        proximity::check_safezones(self.vehicles.as_mut_slice(), |vehicles, event| {
            let vehicle_id = event.vehicle_id;
            match event.transition {
                SafezoneTransition::Left => events.push(SimEvent::SafezoneLeft { vehicle_id }),
                SafezoneTransition::Entered => {
                    events.push(SimEvent::SafezoneEntered { vehicle_id });
                    events.push(match conflict::trigger(vehicles, vehicle_id, resolver)? {
                        ConflictOutcome::Detected { report, correction } => {
                            SimEvent::ConflictDetected { report, correction }
                        }
                        ConflictOutcome::Skipped(warning) => SimEvent::ConflictSkipped {
                            vehicle_id,
                            warning,
                        },
                    });
                }
            }
            Ok(())
        })
    }

    pub fn snapshot(&self) -> SimSnapshot {
        SimSnapshot {
            tick: self.tick,
            phase: self.phase,
            collision_injection: self.collision_injection,
            tick_rate: self.tick_rate.rate(),
            vehicles: self.vehicles.iter().map(VehicleSnapshot::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConflictReport;
    use glam::DVec2;

    const AREA: Area = Area {
        width: 1000.0,
        height: 800.0,
    };

    fn running(specs: Vec<VehicleSpec>) -> SimulationEngine {
        let mut engine = SimulationEngine::with_scenario(AREA, specs).unwrap();
        engine.start().unwrap();
        engine
    }

    fn run_until_stopped(engine: &mut SimulationEngine, max_ticks: usize) -> Vec<SimEvent> {
        let mut events = Vec::new();
        for _ in 0..max_ticks {
            events.extend(engine.tick().unwrap());
            if engine.is_stopped() {
                break;
            }
        }
        events
    }

    #[test]
    fn new_engine_is_stopped_with_starting_layout() {
        let engine = SimulationEngine::new(AREA).unwrap();

        assert_eq!(engine.phase(), SimPhase::Stopped);
        let vehicles = engine.vehicles();
        assert_eq!(vehicles.len(), 2);
        assert_eq!(vehicles[0].position, DVec2::new(100.0, 100.0));
        assert_eq!(vehicles[0].course, 45.0);
        assert_eq!(vehicles[1].position, DVec2::new(900.0, 100.0));
        assert_eq!(vehicles[1].course, 135.0);
        assert!(vehicles.iter().all(|v| v.speed == 2.0));
    }

    #[test]
    fn ticking_while_stopped_changes_nothing() {
        let mut engine = SimulationEngine::new(AREA).unwrap();

        let events = engine.tick().unwrap();

        assert!(events.is_empty());
        assert_eq!(engine.tick_count(), 0);
        assert_eq!(engine.vehicles()[0].position, DVec2::new(100.0, 100.0));
    }

    #[test]
    fn pause_and_resume() {
        let mut engine = SimulationEngine::new(AREA).unwrap();
        engine.start().unwrap();
        engine.tick().unwrap();

        engine.apply_command(Command::Pause).unwrap();
        let frozen = engine.vehicles()[0].position;
        engine.tick().unwrap();
        assert!(engine.is_stopped());
        assert_eq!(engine.vehicles()[0].position, frozen);

        engine.apply_command(Command::Resume).unwrap();
        engine.tick().unwrap();
        assert_eq!(engine.phase(), SimPhase::Running);
        assert_ne!(engine.vehicles()[0].position, frozen);
        assert_eq!(engine.tick_count(), 2);
    }

    #[test]
    fn default_layout_ends_in_a_collision() {
        let mut engine = SimulationEngine::new(AREA).unwrap();
        engine.start().unwrap();

        let events = run_until_stopped(&mut engine, 1_000);

        assert!(engine.is_finished());
        assert!(events.contains(&SimEvent::Collision { first: 0, second: 1 }));
        // both safezones were entered exactly once on the way in
        let entered = events
            .iter()
            .filter(|e| matches!(e, SimEvent::SafezoneEntered { .. }))
            .count();
        assert_eq!(entered, 2);
    }

    #[test]
    fn finished_engine_refuses_resume() {
        let mut engine = running(vec![VehicleSpec::at(DVec2::new(15.0, 400.0), 180.0)]);

        let events = run_until_stopped(&mut engine, 10);

        assert_eq!(events, vec![SimEvent::BoundaryExit { vehicle_id: 0 }]);
        assert_eq!(
            engine.apply_command(Command::Resume),
            Err(CommandError::SimulationFinished)
        );
        assert!(engine.is_finished());
    }

    #[test]
    fn toggle_pause_after_finish_resets_and_runs() {
        let mut engine = running(vec![VehicleSpec::at(DVec2::new(15.0, 400.0), 180.0)]);
        run_until_stopped(&mut engine, 10);

        engine.apply_command(Command::TogglePause).unwrap();

        assert_eq!(engine.phase(), SimPhase::Running);
        assert_eq!(engine.vehicles()[0].position, DVec2::new(15.0, 400.0));
        assert_eq!(engine.tick_count(), 0);
    }

    #[test]
    fn toggle_pause_flips_between_running_and_stopped() {
        let mut engine = SimulationEngine::new(AREA).unwrap();
        engine.apply_command(Command::TogglePause).unwrap();
        assert_eq!(engine.phase(), SimPhase::Running);
        engine.apply_command(Command::TogglePause).unwrap();
        assert_eq!(engine.phase(), SimPhase::Stopped);
    }

    #[test]
    fn speed_cannot_drop_below_one() {
        let mut engine = SimulationEngine::new(AREA).unwrap();

        engine
            .apply_command(Command::AdjustSpeed {
                vehicle_id: 0,
                delta: -1.0,
            })
            .unwrap();
        let refused = engine.apply_command(Command::AdjustSpeed {
            vehicle_id: 0,
            delta: -1.0,
        });

        assert!(matches!(
            refused,
            Err(CommandError::SpeedBelowMinimum { vehicle_id: 0, .. })
        ));
        assert_eq!(engine.vehicles()[0].speed, 1.0);

        engine
            .apply_command(Command::AdjustSpeed {
                vehicle_id: 0,
                delta: 1.0,
            })
            .unwrap();
        assert_eq!(engine.vehicles()[0].speed, 2.0);
    }

    #[test]
    fn speed_overflow_is_refused() {
        let mut engine = SimulationEngine::new(AREA).unwrap();
        engine.start().unwrap();
        let boost = Command::AdjustSpeed {
            vehicle_id: 0,
            delta: f64::MAX,
        };

        engine.apply_command(boost.clone()).unwrap();
        let refused = engine.apply_command(boost);

        assert_eq!(refused, Err(CommandError::NonFiniteValue { vehicle_id: 0 }));
        assert!(engine.vehicles()[0].speed.is_finite());

        engine.tick().unwrap();
        let vehicle = &engine.vehicles()[0];
        assert!(vehicle.distance_covered.is_finite());
    }

    #[test]
    fn course_commands_wrap() {
        let mut engine = SimulationEngine::new(AREA).unwrap();

        engine
            .apply_command(Command::SetCourse {
                vehicle_id: 1,
                course: -90.0,
            })
            .unwrap();
        assert_eq!(engine.vehicles()[1].course, 270.0);

        engine
            .apply_command(Command::SetCourse {
                vehicle_id: 0,
                course: 2.0,
            })
            .unwrap();
        engine
            .apply_command(Command::NudgeCourse {
                vehicle_id: 0,
                direction: TurnDirection::Left,
            })
            .unwrap();
        // default turn limit is 2 deg/tick, so a nudge is 4 deg
        assert_eq!(engine.vehicles()[0].course, 358.0);

        engine
            .apply_command(Command::NudgeCourse {
                vehicle_id: 0,
                direction: TurnDirection::Right,
            })
            .unwrap();
        assert_eq!(engine.vehicles()[0].course, 2.0);
    }

    #[test]
    fn commands_for_unknown_vehicles_are_refused() {
        let mut engine = SimulationEngine::new(AREA).unwrap();
        let result = engine.apply_command(Command::SetCourse {
            vehicle_id: 2,
            course: 10.0,
        });
        assert_eq!(result, Err(CommandError::UnknownVehicle { vehicle_id: 2 }));

        let result = engine.apply_command(Command::SetCourse {
            vehicle_id: 0,
            course: f64::NAN,
        });
        assert_eq!(result, Err(CommandError::NonFiniteValue { vehicle_id: 0 }));
        assert_eq!(engine.vehicles()[0].course, 45.0);
    }

    #[test]
    fn distance_is_the_sum_of_speeds() {
        let mut engine = SimulationEngine::new(AREA).unwrap();
        engine.start().unwrap();

        let mut previous = 0.0;
        let mut expected = 0.0;
        for tick in 0..30 {
            if tick == 10 {
                engine
                    .apply_command(Command::AdjustSpeed {
                        vehicle_id: 0,
                        delta: 3.0,
                    })
                    .unwrap();
            }
            expected += engine.vehicles()[0].speed;
            engine.tick().unwrap();
            let covered = engine.vehicles()[0].distance_covered;
            assert!(covered >= previous);
            previous = covered;
        }

        assert_eq!(previous, expected);
        assert_eq!(engine.vehicles()[0].path.len(), 30);
    }

    #[test]
    fn collision_injection_drives_vehicle_one_into_vehicle_zero() {
        let specs = vec![
            VehicleSpec::at(DVec2::new(500.0, 400.0), 0.0).with_speed(0.0),
            VehicleSpec::at(DVec2::new(500.0, 550.0), 90.0)
                .with_speed(4.0)
                .with_max_course_change(10.0),
        ];
        let mut engine = running(specs);
        engine
            .apply_command(Command::ToggleCollisionInjection)
            .unwrap();

        let events = run_until_stopped(&mut engine, 500);

        assert!(engine.is_finished());
        assert_eq!(
            events.last(),
            Some(&SimEvent::Collision { first: 0, second: 1 })
        );
    }

    struct BreakAway;

    impl ConflictResolver for BreakAway {
        fn resolve(&self, report: &ConflictReport, _: &Vehicle, _: &Vehicle) -> Option<f64> {
            // turn directly away from the intruder
            let away = report.relative;
            Some(away.y.atan2(away.x).to_degrees())
        }
    }

    #[test]
    fn resolver_correction_is_applied_on_entry() {
        let specs = vec![
            VehicleSpec::at(DVec2::new(300.0, 400.0), 0.0).with_speed(1.0),
            VehicleSpec::at(DVec2::new(600.0, 400.0), 180.0).with_speed(1.0),
        ];
        let mut engine =
            SimulationEngine::with_parts(AREA, specs, RateLimitedTurn, BreakAway).unwrap();
        engine.start().unwrap();

        let mut corrections = Vec::new();
        for _ in 0..200 {
            for event in engine.tick().unwrap() {
                if let SimEvent::ConflictDetected {
                    report,
                    correction: Some(course),
                } = event
                {
                    corrections.push((report.vehicle_id, course));
                }
            }
            if !corrections.is_empty() {
                break;
            }
        }

        // vehicle 0 is left of vehicle 1, so "away" is 180 degrees
        assert_eq!(corrections.len(), 2);
        let (id, course) = corrections[0];
        assert_eq!(id, 0);
        assert!((course - 180.0).abs() < 1e-6);
        assert!((engine.vehicles()[0].course - 180.0).abs() < 1e-6);
        assert!(engine.vehicles()[1].course < 1e-6 || engine.vehicles()[1].course > 360.0 - 1e-6);
    }

    #[test]
    fn inconsistent_set_aborts_the_tick_and_restores_flags() {
        let mut engine = running(vec![
            VehicleSpec::at(DVec2::new(500.0, 400.0), 0.0).with_speed(0.0),
            VehicleSpec::at(DVec2::new(550.0, 400.0), 0.0).with_speed(0.0),
        ]);
        engine.vehicles.as_mut_slice().swap(0, 1);

        let result = engine.tick();

        assert_eq!(
            result,
            Err(EngineError::Conflict(ConflictFault::IdMismatch {
                index: 1,
                found: Some(0)
            }))
        );
        assert_eq!(engine.phase(), SimPhase::Stopped);
        assert!(engine.vehicles().iter().all(|v| !v.safezone_occupied));
    }

    #[test]
    fn stop_zeroes_the_tick_rate() {
        let mut engine = SimulationEngine::new(AREA).unwrap();
        engine.start().unwrap();
        engine.tick().unwrap();

        engine.stop();

        assert_eq!(engine.snapshot().tick_rate, 0.0);
        assert!(engine.snapshot().is_stopped());
    }
}
