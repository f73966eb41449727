use crate::domain::vehicle::Vehicle;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafezoneTransition {
    Entered,
    Left,
}

/// Edge event for one vehicle's safezone flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafezoneEvent {
    pub vehicle_id: usize,
    pub transition: SafezoneTransition,
}

/// Which vehicles currently have another vehicle inside their own safezone radius.
///
/// Each pair's distance is computed once and compared against both radii; the
/// test is asymmetric, so a large safezone can be occupied while the other is not.
pub fn occupancy(vehicles: &[Vehicle]) -> Vec<bool> {
    let mut occupied = vec![false; vehicles.len()];
    for i in 0..vehicles.len() {
        for j in (i + 1)..vehicles.len() {
            let distance = vehicles[i].distance_to(&vehicles[j]);
            if distance <= vehicles[i].safezone_size / 2.0 {
                occupied[i] = true;
            }
            if distance <= vehicles[j].safezone_size / 2.0 {
                occupied[j] = true;
            }
        }
    }
    occupied
}

/// Updates every safezone flag and reports flips through `on_transition`.
///
/// Vehicles are handled in collection order and each callback runs before the
/// next vehicle is looked at. Unchanged flags produce no callback, so a vehicle
/// that stays inside a safezone fires `Entered` exactly once.
pub fn check_safezones<E, F>(vehicles: &mut [Vehicle], mut on_transition: F) -> Result<(), E>
where
    F: FnMut(&mut [Vehicle], SafezoneEvent) -> Result<(), E>,
{
    let occupied = occupancy(vehicles);

    for (index, now_occupied) in occupied.into_iter().enumerate() {
        let vehicle = &mut vehicles[index];
        if vehicle.safezone_occupied == now_occupied {
            continue;
        }
        vehicle.safezone_occupied = now_occupied;
        let vehicle_id = vehicle.id();

        let transition = if now_occupied {
            info!(vehicle_id, "object entered safezone");
            SafezoneTransition::Entered
        } else {
            info!(vehicle_id, "object left safezone");
            SafezoneTransition::Left
        };

        on_transition(
            vehicles,
            SafezoneEvent {
                vehicle_id,
                transition,
            },
        )?;
    }

    Ok(())
}
