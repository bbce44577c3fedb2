//! Facility: the ordered set of zones for one run
//!
//! # Critical Invariants
//!
//! 1. **Fixed shape**: the zone set and every zone's capacity are fixed for a run
//! 2. **Capacity**: occupied spaces in a zone never exceed its capacity
//! 3. **Projected zone**: always present in the model; excluded from
//!    allocation and reporting when the feature flag is off

use crate::models::space::{SpaceError, Vacated};
use crate::models::zone::{ParkingZone, ZoneRole};
use serde::{Deserialize, Serialize};

/// Zone capacities used to build a facility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilityLayout {
    pub internal: usize,
    pub external: usize,
    pub projected: usize,
}

impl Default for FacilityLayout {
    fn default() -> Self {
        Self {
            internal: 20,
            external: 30,
            projected: 24,
        }
    }
}

impl FacilityLayout {
    pub fn capacity(&self, role: ZoneRole) -> usize {
        match role {
            ZoneRole::Internal => self.internal,
            ZoneRole::External => self.external,
            ZoneRole::Projected => self.projected,
        }
    }
}

/// A vehicle that left during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Departure {
    pub zone_id: String,
    pub space_id: String,
    pub vehicle_id: Option<String>,
    pub duration: Option<u32>,
}

/// A successful allocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub role: ZoneRole,
    pub space_id: String,
}

/// All zones of the parking facility
///
/// # Example
///
/// ```rust
/// use parking_simulator_core_rs::models::{Facility, FacilityLayout, ZoneRole};
///
/// let facility = Facility::new(FacilityLayout::default());
/// assert_eq!(facility.zones().len(), 3);
/// assert_eq!(facility.zone(ZoneRole::Internal).capacity(), 20);
/// assert_eq!(facility.active_zones(false).count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    zones: Vec<ParkingZone>,
}

impl Facility {
    /// Build internal, external and projected zones, in that order
    pub fn new(layout: FacilityLayout) -> Self {
        let zones = ZoneRole::ALL
            .iter()
            .map(|&role| ParkingZone::new(role, layout.capacity(role)))
            .collect();
        Self { zones }
    }

    pub fn zones(&self) -> &[ParkingZone] {
        &self.zones
    }

    pub fn zone(&self, role: ZoneRole) -> &ParkingZone {
        &self.zones[Self::index(role)]
    }

    fn zone_mut(&mut self, role: ZoneRole) -> &mut ParkingZone {
        &mut self.zones[Self::index(role)]
    }

    pub fn zone_by_id(&self, zone_id: &str) -> Option<&ParkingZone> {
        self.zones.iter().find(|z| z.id() == zone_id)
    }

    pub fn zone_by_id_mut(&mut self, zone_id: &str) -> Option<&mut ParkingZone> {
        self.zones.iter_mut().find(|z| z.id() == zone_id)
    }

    /// Zones that take part in allocation and reporting
    pub fn active_zones(&self, projected_enabled: bool) -> impl Iterator<Item = &ParkingZone> {
        self.zones
            .iter()
            .filter(move |z| !z.is_projected() || projected_enabled)
    }

    /// Free spaces across active zones
    pub fn total_free(&self, projected_enabled: bool) -> usize {
        self.active_zones(projected_enabled)
            .map(|z| z.free_count())
            .sum()
    }

    /// Park a vehicle in zone `role`. `None` if that zone is full.
    pub fn park(
        &mut self,
        role: ZoneRole,
        vehicle_id: String,
        departure_time: u32,
        duration: u32,
    ) -> Result<Option<Placement>, SpaceError> {
        let space_id = self
            .zone_mut(role)
            .park(vehicle_id, departure_time, duration)?;
        Ok(space_id.map(|space_id| Placement { role, space_id }))
    }

    /// Vacate every space due at `clock` across all zones
    pub fn release_due(&mut self, clock: u32, reservations_enabled: bool) -> Vec<Departure> {
        let mut departures = Vec::new();
        for zone in &mut self.zones {
            let zone_id = zone.id().to_string();
            for (space_id, Vacated { vehicle_id, duration }) in
                zone.release_due(clock, reservations_enabled)
            {
                departures.push(Departure {
                    zone_id: zone_id.clone(),
                    space_id,
                    vehicle_id,
                    duration,
                });
            }
        }
        departures
    }

    /// Check every space's field invariant
    pub fn is_consistent(&self) -> bool {
        self.zones
            .iter()
            .flat_map(|z| z.spaces())
            .all(|s| s.is_consistent())
    }

    fn index(role: ZoneRole) -> usize {
        match role {
            ZoneRole::Internal => 0,
            ZoneRole::External => 1,
            ZoneRole::Projected => 2,
        }
    }
}
