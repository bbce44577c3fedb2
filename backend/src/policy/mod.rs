//! Zone Allocation Policy Module
//!
//! This module defines the policy interface that decides which zone an
//! arriving vehicle is sent to.
//!
//! # Overview
//!
//! On every arrival attempt the engine builds a read-only
//! [`ZoneAvailability`] view of the active zones (free spaces and capacity)
//! and asks the configured policy for an ordered list of candidate zones.
//! The engine parks the vehicle in the first candidate that still has a free
//! space. An empty list is a **rejection**: a normal business outcome, not
//! an error.
//!
//! # Policy Interface
//!
//! All policies implement the `AllocationPolicy` trait:
//! ```rust
//! use parking_simulator_core_rs::models::ZoneRole;
//! use parking_simulator_core_rs::policy::{AllocationPolicy, ZoneAvailability};
//! use parking_simulator_core_rs::rng::PrngProvider;
//!
//! struct ExternalOnly;
//!
//! impl AllocationPolicy for ExternalOnly {
//!     fn candidates(
//!         &mut self,
//!         availability: &ZoneAvailability,
//!         _rng: &mut PrngProvider,
//!     ) -> Vec<ZoneRole> {
//!         if availability.external.has_space() {
//!             vec![ZoneRole::External]
//!         } else {
//!             vec![]
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "external-only"
//!     }
//! }
//! ```
//!
//! Available policies:
//! 1. **Balanced**: free-percentage balancing with stochastic overflow (default)
//! 2. **PriorityOrder**: first free zone in order internal → external → projected

use crate::models::{Facility, ZoneRole};
use crate::rng::PrngProvider;
use serde::{Deserialize, Serialize};

pub mod balanced;
pub mod priority;

pub use balanced::BalancedPolicy;
pub use priority::PriorityOrderPolicy;

/// Free spaces and capacity of one zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSlots {
    pub free: usize,
    pub capacity: usize,
}

impl ZoneSlots {
    pub fn has_space(&self) -> bool {
        self.free > 0
    }

    /// Free spaces as a fraction of capacity (0 for an empty zone)
    pub fn free_ratio(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.free as f64 / self.capacity as f64
        }
    }
}

/// Read-only view of the active zones at the moment of an arrival
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneAvailability {
    pub internal: ZoneSlots,
    pub external: ZoneSlots,
    /// `None` when the projected zone is disabled
    pub projected: Option<ZoneSlots>,
}

impl ZoneAvailability {
    pub fn from_facility(facility: &Facility, projected_enabled: bool) -> Self {
        let slots = |role| {
            let zone = facility.zone(role);
            ZoneSlots {
                free: zone.free_count(),
                capacity: zone.capacity(),
            }
        };
        Self {
            internal: slots(ZoneRole::Internal),
            external: slots(ZoneRole::External),
            projected: projected_enabled.then(|| slots(ZoneRole::Projected)),
        }
    }

    /// Free spaces across active zones
    pub fn total_free(&self) -> usize {
        self.internal.free + self.external.free + self.projected.map_or(0, |p| p.free)
    }

    pub fn slots(&self, role: ZoneRole) -> Option<ZoneSlots> {
        match role {
            ZoneRole::Internal => Some(self.internal),
            ZoneRole::External => Some(self.external),
            ZoneRole::Projected => self.projected,
        }
    }

    /// Keep only roles that are active and have a free space, preserving order
    pub fn with_space(&self, roles: &[ZoneRole]) -> Vec<ZoneRole> {
        roles
            .iter()
            .copied()
            .filter(|&role| self.slots(role).is_some_and(|s| s.has_space()))
            .collect()
    }
}

/// Zone allocation policy
pub trait AllocationPolicy: Send {
    /// Ordered candidate zones for one arriving vehicle.
    ///
    /// The first candidate is the policy's choice; later ones are
    /// fallbacks. An empty list means the vehicle is rejected.
    fn candidates(&mut self, availability: &ZoneAvailability, rng: &mut PrngProvider)
        -> Vec<ZoneRole>;

    /// Policy name for logging
    fn name(&self) -> &'static str;
}

/// Policy selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AllocationPolicyConfig {
    /// Balance internal/projected by free percentage, with a stochastic
    /// preference for the external lot
    Balanced {
        /// Probability of choosing external when internal, projected and
        /// external all have room
        p_all_free: f64,
        /// Probability of choosing external when exactly one of
        /// internal/projected has room and external has room
        p_one_free: f64,
    },

    /// First zone with room in fixed order
    PriorityOrder,
}

impl Default for AllocationPolicyConfig {
    fn default() -> Self {
        AllocationPolicyConfig::Balanced {
            p_all_free: balanced::P_ALL_FREE,
            p_one_free: balanced::P_ONE_FREE,
        }
    }
}

impl AllocationPolicyConfig {
    pub fn build(&self) -> Box<dyn AllocationPolicy> {
        match *self {
            AllocationPolicyConfig::Balanced {
                p_all_free,
                p_one_free,
            } => Box::new(BalancedPolicy::new(p_all_free, p_one_free)),
            AllocationPolicyConfig::PriorityOrder => Box::new(PriorityOrderPolicy),
        }
    }

    /// Probabilities configured for the policy, if any
    pub fn probabilities(&self) -> Vec<f64> {
        match *self {
            AllocationPolicyConfig::Balanced {
                p_all_free,
                p_one_free,
            } => vec![p_all_free, p_one_free],
            AllocationPolicyConfig::PriorityOrder => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FacilityLayout;

    #[test]
    fn test_availability_excludes_disabled_projected() {
        let facility = Facility::new(FacilityLayout::default());
        let availability = ZoneAvailability::from_facility(&facility, false);
        assert!(availability.projected.is_none());
        assert_eq!(availability.total_free(), 50);
        assert!(availability.with_space(&[ZoneRole::Projected]).is_empty());
    }

    #[test]
    fn test_zero_capacity_ratio() {
        let slots = ZoneSlots { free: 0, capacity: 0 };
        assert_eq!(slots.free_ratio(), 0.0);
        assert!(!slots.has_space());
    }
}
