// Capacity-bounded vehicle collection with index-derived ids.

use super::errors::SetupError;
use super::vehicle::{Vehicle, VehicleSpec};

/// Largest vehicle set the pairwise conflict protocol supports.
pub const MAX_VEHICLES: usize = 2;

/// Ordered vehicle set where `vehicles[i].id() == i` always holds.
///
/// Ids are assigned here and never change, which keeps the conflict
/// trigger's id check unreachable for engine-built sets.
#[derive(Debug, Clone, Default)]
pub struct VehicleRegistry {
    vehicles: Vec<Vehicle>,
}

impl VehicleRegistry {
    /// Builds a registry from specs in order; holds at most [`MAX_VEHICLES`].
    pub fn from_specs<I>(specs: I) -> Result<Self, SetupError>
    where
        I: IntoIterator<Item = VehicleSpec>,
    {
        let specs: Vec<VehicleSpec> = specs.into_iter().collect();
        if specs.len() > MAX_VEHICLES {
            return Err(SetupError::CapacityExceeded {
                requested: specs.len(),
                capacity: MAX_VEHICLES,
            });
        }

        let vehicles = specs
            .into_iter()
            .enumerate()
            .map(|(id, spec)| Vehicle::new(id, spec))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { vehicles })
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn get_mut(&mut self, id: usize) -> Option<&mut Vehicle> {
        self.vehicles.get_mut(id)
    }

    pub fn as_slice(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Mutable access to the vehicles themselves; the set cannot grow or shrink.
    pub fn as_mut_slice(&mut self) -> &mut [Vehicle] {
        &mut self.vehicles
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.iter()
    }

    /// Clears every path, then discards the vehicles.
    pub fn clear(&mut self) {
        for vehicle in &mut self.vehicles {
            vehicle.path.clear();
        }
        self.vehicles.clear();
    }
}
