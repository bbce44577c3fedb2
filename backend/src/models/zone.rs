//! Parking zones: named pools of identical spaces with fixed capacity.

use crate::models::space::{ParkingSpace, SpaceError, Vacated};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role a zone plays in the allocation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneRole {
    /// Primary lot
    Internal,
    /// Overflow lot
    External,
    /// Hypothetical expansion, toggleable
    Projected,
}

impl ZoneRole {
    pub const ALL: [ZoneRole; 3] = [ZoneRole::Internal, ZoneRole::External, ZoneRole::Projected];

    pub fn id(self) -> &'static str {
        match self {
            ZoneRole::Internal => "internal",
            ZoneRole::External => "external",
            ZoneRole::Projected => "projected",
        }
    }

    pub fn default_name(self) -> &'static str {
        match self {
            ZoneRole::Internal => "Internal Zone",
            ZoneRole::External => "External Zone",
            ZoneRole::Projected => "Projected Zone (Expansion)",
        }
    }

    fn space_prefix(self) -> &'static str {
        match self {
            ZoneRole::Internal => "I",
            ZoneRole::External => "E",
            ZoneRole::Projected => "P",
        }
    }
}

impl fmt::Display for ZoneRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A parking zone
///
/// Capacity is the number of spaces and never changes after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingZone {
    id: String,
    name: String,
    role: ZoneRole,
    spaces: Vec<ParkingSpace>,
    is_projected: bool,
}

impl ParkingZone {
    /// Create a zone of `capacity` free spaces named `<prefix>-1..`
    pub fn new(role: ZoneRole, capacity: usize) -> Self {
        let spaces = (1..=capacity)
            .map(|i| ParkingSpace::new(format!("{}-{}", role.space_prefix(), i)))
            .collect();
        Self {
            id: role.id().to_string(),
            name: role.default_name().to_string(),
            role,
            spaces,
            is_projected: role == ZoneRole::Projected,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> ZoneRole {
        self.role
    }

    pub fn is_projected(&self) -> bool {
        self.is_projected
    }

    pub fn capacity(&self) -> usize {
        self.spaces.len()
    }

    pub fn spaces(&self) -> &[ParkingSpace] {
        &self.spaces
    }

    pub fn space(&self, space_id: &str) -> Option<&ParkingSpace> {
        self.spaces.iter().find(|s| s.id() == space_id)
    }

    pub fn space_mut(&mut self, space_id: &str) -> Option<&mut ParkingSpace> {
        self.spaces.iter_mut().find(|s| s.id() == space_id)
    }

    pub fn free_count(&self) -> usize {
        self.spaces.iter().filter(|s| s.is_free()).count()
    }

    pub fn occupied_count(&self, reservations_enabled: bool) -> usize {
        self.spaces
            .iter()
            .filter(|s| s.counts_as_occupied(reservations_enabled))
            .count()
    }

    /// Free spaces as a fraction of capacity (0 for an empty zone)
    pub fn free_ratio(&self) -> f64 {
        if self.capacity() == 0 {
            0.0
        } else {
            self.free_count() as f64 / self.capacity() as f64
        }
    }

    /// Park a vehicle in the first free space. Returns the space id, or
    /// `None` when the zone is full.
    pub fn park(
        &mut self,
        vehicle_id: String,
        departure_time: u32,
        duration: u32,
    ) -> Result<Option<String>, SpaceError> {
        match self.spaces.iter_mut().find(|s| s.is_free()) {
            Some(space) => {
                space.occupy(vehicle_id, departure_time, duration)?;
                Ok(Some(space.id().to_string()))
            }
            None => Ok(None),
        }
    }

    /// Vacate every space due at `clock`, in space order
    pub fn release_due(&mut self, clock: u32, reservations_enabled: bool) -> Vec<(String, Vacated)> {
        self.spaces
            .iter_mut()
            .filter(|s| s.is_due(clock, reservations_enabled))
            .map(|s| (s.id().to_string(), s.vacate()))
            .collect()
    }
}
