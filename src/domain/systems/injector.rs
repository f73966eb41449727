use crate::domain::vehicle::{Vehicle, wrap_degrees};

/// Points vehicle 1 straight at vehicle 0's current position.
///
/// Test aid for driving the collision detector deterministically. Does nothing
/// with fewer than two vehicles.
pub fn steer_into_collision(vehicles: &mut [Vehicle]) {
    let [target, chaser, ..] = vehicles else {
        return;
    };
    let delta = target.position - chaser.position;
    chaser.set_course(wrap_degrees(delta.y.atan2(delta.x).to_degrees()));
}
