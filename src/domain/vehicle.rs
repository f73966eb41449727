// Domain-level vehicle state and its presentation snapshot.

use super::errors::SetupError;
use super::tuning::vehicle::VehicleTuning;
use glam::DVec2;

/// Number of trailing path segments handed to the presentation layer.
pub const PATH_TAIL_SEGMENTS: usize = 100;

/// Wraps an angle in degrees into `[0, 360)`.
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Initial parameters for a vehicle built on reset.
#[derive(Debug, Clone, Copy)]
pub struct VehicleSpec {
    pub position: DVec2,
    pub yaw_angle: f64,
    pub course: f64,
    pub speed: f64,
    pub max_course_change: f64,
    pub size: f64,
    pub safezone_size: f64,
}

impl VehicleSpec {
    /// Spec at `position` flying `heading` with the default airframe tuning.
    pub fn at(position: DVec2, heading: f64) -> Self {
        let tuning = VehicleTuning::default();
        Self {
            position,
            yaw_angle: heading,
            course: heading,
            speed: tuning.start_speed,
            max_course_change: tuning.max_course_change,
            size: tuning.size,
            safezone_size: tuning.safezone_size,
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_course(mut self, course: f64) -> Self {
        self.course = course;
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_safezone_size(mut self, safezone_size: f64) -> Self {
        self.safezone_size = safezone_size;
        self
    }

    pub fn with_max_course_change(mut self, max_course_change: f64) -> Self {
        self.max_course_change = max_course_change;
        self
    }
}

/// One simulated aircraft.
///
/// The id is fixed at construction; everything else is plain kinematic state
/// that the engine mutates once per tick.
#[derive(Debug, Clone)]
pub struct Vehicle {
    id: usize,
    pub position: DVec2,
    /// Current heading in degrees, `[0, 360)`.
    pub yaw_angle: f64,
    /// Commanded heading in degrees, `[0, 360)`.
    pub course: f64,
    /// Distance per tick.
    pub speed: f64,
    /// Turn-rate limit in degrees per tick.
    pub max_course_change: f64,
    /// Hitbox diameter.
    pub size: f64,
    /// Safety perimeter diameter.
    pub safezone_size: f64,
    pub safezone_occupied: bool,
    pub distance_covered: f64,
    pub path: Vec<DVec2>,
}

impl Vehicle {
    /// Builds a vehicle, validating the spec so that later ticks can rely on
    /// positive sizes, non-negative speed and wrapped angles.
    pub fn new(id: usize, spec: VehicleSpec) -> Result<Self, SetupError> {
        let invalid = |reason: &'static str| SetupError::InvalidVehicle { id, reason };

        if !spec.position.is_finite() {
            return Err(invalid("position must be finite"));
        }
        if !spec.yaw_angle.is_finite() || !spec.course.is_finite() {
            return Err(invalid("angles must be finite"));
        }
        if !(spec.speed >= 0.0 && spec.speed.is_finite()) {
            return Err(invalid("speed must be a finite non-negative number"));
        }
        if !(spec.max_course_change >= 0.0 && spec.max_course_change.is_finite()) {
            return Err(invalid("max course change must be a finite non-negative number"));
        }
        if !(spec.size > 0.0 && spec.size.is_finite()) {
            return Err(invalid("size must be positive"));
        }
        if !(spec.safezone_size > 0.0 && spec.safezone_size.is_finite()) {
            return Err(invalid("safezone size must be positive"));
        }

        Ok(Self {
            id,
            position: spec.position,
            yaw_angle: wrap_degrees(spec.yaw_angle),
            course: wrap_degrees(spec.course),
            speed: spec.speed,
            max_course_change: spec.max_course_change,
            size: spec.size,
            safezone_size: spec.safezone_size,
            safezone_occupied: false,
            distance_covered: 0.0,
            path: Vec::new(),
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Sets the commanded heading, wrapped into `[0, 360)`.
    pub fn set_course(&mut self, course: f64) {
        self.course = wrap_degrees(course);
    }

    pub fn distance_to(&self, other: &Vehicle) -> f64 {
        self.position.distance(other.position)
    }
}

/// Read-only copy of a vehicle for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleSnapshot {
    pub id: usize,
    pub position: DVec2,
    pub yaw_angle: f64,
    pub course: f64,
    pub speed: f64,
    pub size: f64,
    pub safezone_size: f64,
    pub safezone_occupied: bool,
    pub distance_covered: f64,
    /// The most recent path points, oldest first.
    pub recent_path: Vec<DVec2>,
}

impl From<&Vehicle> for VehicleSnapshot {
    fn from(v: &Vehicle) -> Self {
        let tail_start = v.path.len().saturating_sub(PATH_TAIL_SEGMENTS + 1);
        Self {
            id: v.id,
            position: v.position,
            yaw_angle: v.yaw_angle,
            course: v.course,
            speed: v.speed,
            size: v.size,
            safezone_size: v.safezone_size,
            safezone_occupied: v.safezone_occupied,
            distance_covered: v.distance_covered,
            recent_path: v.path[tail_start..].to_vec(),
        }
    }
}
