use crate::domain::vehicle::Vehicle;

/// Rectangular simulation area with its origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Area {
    pub width: f64,
    pub height: f64,
}

impl Area {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when the whole hitbox lies inside the area (edges inclusive).
    pub fn contains(&self, v: &Vehicle) -> bool {
        let r = v.size / 2.0;
        (r..=self.width - r).contains(&v.position.x) && (r..=self.height - r).contains(&v.position.y)
    }
}

/// Returns the id of the first vehicle, in collection order, that left the area.
pub fn find_out_of_bounds(vehicles: &[Vehicle], area: Area) -> Option<usize> {
    vehicles.iter().find(|v| !area.contains(v)).map(Vehicle::id)
}
