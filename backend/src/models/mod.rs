//! Domain models for the parking simulator

pub mod event;
pub mod facility;
pub mod space;
pub mod zone;

// Re-exports
pub use event::{event_digest, Event, EventLog, LogEntry};
pub use facility::{Departure, Facility, FacilityLayout, Placement};
pub use space::{ParkingSpace, SpaceError, SpaceStatus, Vacated};
pub use zone::{ParkingZone, ZoneRole};
