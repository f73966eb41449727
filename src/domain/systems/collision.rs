use crate::domain::vehicle::Vehicle;

/// Two hitboxes overlap when their centers are no further apart than the sum of radii.
pub fn collides(a: &Vehicle, b: &Vehicle) -> bool {
    a.distance_to(b) <= (a.size + b.size) / 2.0
}

/// Returns the ids of the first colliding pair, scanning pairs in index order.
pub fn find_collision(vehicles: &[Vehicle]) -> Option<(usize, usize)> {
    for i in 0..vehicles.len() {
        for j in (i + 1)..vehicles.len() {
            if collides(&vehicles[i], &vehicles[j]) {
                return Some((vehicles[i].id(), vehicles[j].id()));
            }
        }
    }
    None
}
