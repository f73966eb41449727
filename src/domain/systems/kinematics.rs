use crate::domain::ports::KinematicsStepper;
use crate::domain::vehicle::{Vehicle, wrap_degrees};
use glam::DVec2;

/// Constant-speed stepper with a per-tick turn-rate limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct RateLimitedTurn;

impl KinematicsStepper for RateLimitedTurn {
    fn step(&self, v: &mut Vehicle) {
        // heading first; the move uses the updated heading
        v.yaw_angle = turn_toward(v.yaw_angle, v.course, v.max_course_change);

        // 0 deg = +x, angles grow toward +y (screen down)
        let heading = v.yaw_angle.to_radians();
        v.position += DVec2::new(heading.cos(), heading.sin()) * v.speed;

        v.distance_covered += v.speed;
        v.path.push(v.position);
    }
}

/// Signed shortest rotation from `from` to `to`, in `(-180, 180]` degrees.
pub fn shortest_turn(from: f64, to: f64) -> f64 {
    let delta = wrap_degrees(to - from);
    if delta > 180.0 { delta - 360.0 } else { delta }
}

/// Rotates `yaw` toward `course` by at most `max_change` degrees.
///
/// Lands exactly on `course` when it is within reach, so there is no overshoot.
pub fn turn_toward(yaw: f64, course: f64, max_change: f64) -> f64 {
    let delta = shortest_turn(yaw, course);
    if delta.abs() <= max_change {
        wrap_degrees(course)
    } else {
        wrap_degrees(yaw + max_change.copysign(delta))
    }
}
