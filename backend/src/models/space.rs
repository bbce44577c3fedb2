//! Parking space model
//!
//! A space is Free, Occupied or Reserved. An Occupied space carries the
//! vehicle id, the absolute minute it must be vacated and the duration that
//! was sampled on arrival.
//!
//! # Critical Invariants
//!
//! 1. `status == Free` ⇔ vehicle id, departure time and assigned duration are all absent
//! 2. An Occupied space always has all three fields set

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Occupation status of a space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceStatus {
    Free,
    Occupied,
    Reserved,
}

/// Errors from space state transitions
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SpaceError {
    #[error("Space {id} is not free (status {status:?})")]
    NotFree { id: String, status: SpaceStatus },
}

/// Vehicle removed from a space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vacated {
    pub vehicle_id: Option<String>,
    /// Minutes the vehicle was assigned on arrival
    pub duration: Option<u32>,
}

/// A single parking space
///
/// # Example
/// ```
/// use parking_simulator_core_rs::models::{ParkingSpace, SpaceStatus};
///
/// let mut space = ParkingSpace::new("I-1");
/// space.occupy("V-1".to_string(), 400, 40).unwrap();
/// assert_eq!(space.status(), SpaceStatus::Occupied);
/// assert!(space.is_due(400, false));
///
/// let vacated = space.vacate();
/// assert_eq!(vacated.duration, Some(40));
/// assert!(space.is_free());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingSpace {
    id: String,
    status: SpaceStatus,
    vehicle_id: Option<String>,
    departure_time: Option<u32>,
    assigned_duration: Option<u32>,
}

impl ParkingSpace {
    /// Create a free space
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: SpaceStatus::Free,
            vehicle_id: None,
            departure_time: None,
            assigned_duration: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> SpaceStatus {
        self.status
    }

    pub fn is_free(&self) -> bool {
        self.status == SpaceStatus::Free
    }

    pub fn vehicle_id(&self) -> Option<&str> {
        self.vehicle_id.as_deref()
    }

    pub fn departure_time(&self) -> Option<u32> {
        self.departure_time
    }

    pub fn assigned_duration(&self) -> Option<u32> {
        self.assigned_duration
    }

    /// Park a vehicle for `duration` minutes, leaving at `departure_time`
    pub fn occupy(
        &mut self,
        vehicle_id: String,
        departure_time: u32,
        duration: u32,
    ) -> Result<(), SpaceError> {
        self.ensure_free()?;
        self.status = SpaceStatus::Occupied;
        self.vehicle_id = Some(vehicle_id);
        self.departure_time = Some(departure_time);
        self.assigned_duration = Some(duration);
        Ok(())
    }

    /// Mark the space Reserved (status bookkeeping only)
    pub fn reserve(&mut self) -> Result<(), SpaceError> {
        self.ensure_free()?;
        self.status = SpaceStatus::Reserved;
        Ok(())
    }

    /// Whether the space counts towards occupancy
    pub fn counts_as_occupied(&self, reservations_enabled: bool) -> bool {
        match self.status {
            SpaceStatus::Occupied => true,
            SpaceStatus::Reserved => reservations_enabled,
            SpaceStatus::Free => false,
        }
    }

    /// Whether the occupant must leave at or before `clock`
    pub fn is_due(&self, clock: u32, reservations_enabled: bool) -> bool {
        self.counts_as_occupied(reservations_enabled)
            && self.departure_time.is_some_and(|t| t <= clock)
    }

    /// Free the space, returning what was in it
    pub fn vacate(&mut self) -> Vacated {
        self.status = SpaceStatus::Free;
        self.departure_time = None;
        Vacated {
            vehicle_id: self.vehicle_id.take(),
            duration: self.assigned_duration.take(),
        }
    }

    /// Free spaces carry no vehicle fields; occupied spaces carry all of them
    pub fn is_consistent(&self) -> bool {
        let has_fields = [
            self.vehicle_id.is_some(),
            self.departure_time.is_some(),
            self.assigned_duration.is_some(),
        ];
        match self.status {
            SpaceStatus::Free => has_fields.iter().all(|f| !f),
            SpaceStatus::Occupied => has_fields.iter().all(|f| *f),
            SpaceStatus::Reserved => true,
        }
    }

    fn ensure_free(&self) -> Result<(), SpaceError> {
        if self.is_free() {
            Ok(())
        } else {
            Err(SpaceError::NotFree {
                id: self.id.clone(),
                status: self.status,
            })
        }
    }
}
