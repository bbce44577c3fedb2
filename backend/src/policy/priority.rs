//! Priority-order policy
//!
//! Simplest baseline policy: park in the first zone with room.
//!
//! # Behavior
//!
//! - Fixed order internal → external → projected (projected only when enabled)
//! - No consideration of load balance
//! - Never consumes randomness
//!
//! # Use Case
//!
//! - Baseline for comparison with the balanced policy
//! - Reproducible runs under the non-seedable `Default` generator

use super::{AllocationPolicy, ZoneAvailability};
use crate::models::ZoneRole;
use crate::rng::PrngProvider;

const ORDER: [ZoneRole; 3] = [ZoneRole::Internal, ZoneRole::External, ZoneRole::Projected];

/// Priority-order policy: first zone with a free space
///
/// # Example
///
/// ```
/// use parking_simulator_core_rs::models::ZoneRole;
/// use parking_simulator_core_rs::policy::{AllocationPolicy, PriorityOrderPolicy, ZoneAvailability, ZoneSlots};
/// use parking_simulator_core_rs::rng::PrngProvider;
///
/// let availability = ZoneAvailability {
///     internal: ZoneSlots { free: 0, capacity: 20 },
///     external: ZoneSlots { free: 3, capacity: 30 },
///     projected: Some(ZoneSlots { free: 24, capacity: 24 }),
/// };
/// let mut rng = PrngProvider::default();
/// let candidates = PriorityOrderPolicy.candidates(&availability, &mut rng);
/// assert_eq!(candidates, vec![ZoneRole::External, ZoneRole::Projected]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityOrderPolicy;

impl AllocationPolicy for PriorityOrderPolicy {
    fn candidates(
        &mut self,
        availability: &ZoneAvailability,
        _rng: &mut PrngProvider,
    ) -> Vec<ZoneRole> {
        availability.with_space(&ORDER)
    }

    fn name(&self) -> &'static str {
        "priority_order"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::ZoneSlots;

    #[test]
    fn test_disabled_projected_never_offered() {
        let availability = ZoneAvailability {
            internal: ZoneSlots { free: 0, capacity: 20 },
            external: ZoneSlots { free: 0, capacity: 30 },
            projected: None,
        };
        let mut rng = PrngProvider::default();
        assert!(PriorityOrderPolicy
            .candidates(&availability, &mut rng)
            .is_empty());
    }

    #[test]
    fn test_internal_first() {
        let availability = ZoneAvailability {
            internal: ZoneSlots { free: 1, capacity: 20 },
            external: ZoneSlots { free: 30, capacity: 30 },
            projected: None,
        };
        let mut rng = PrngProvider::default();
        assert_eq!(
            PriorityOrderPolicy.candidates(&availability, &mut rng),
            vec![ZoneRole::Internal, ZoneRole::External]
        );
    }
}
