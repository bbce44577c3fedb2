//! Balanced allocation policy
//!
//! **Strategy**: keep the primary zones evenly loaded, and send a share of
//! vehicles to the external lot even when the primary zones have room.
//!
//! # Decision Logic
//!
//! With the projected zone enabled:
//! 1. Internal, projected and external all have room → external with probability `p_all_free`
//! 2. Exactly one of internal/projected has room and external has room → external
//!    with probability `p_one_free`
//! 3. Otherwise, or if the draw did not fire: internal vs projected by free
//!    percentage, the other one as fallback
//! 4. Neither internal nor projected has room → external
//!
//! With the projected zone disabled: internal vs external by free percentage,
//! the other one as fallback.
//!
//! Ties in free percentage go to the internal zone. A uniform is consumed only
//! in cases 1 and 2.

use super::{AllocationPolicy, ZoneAvailability, ZoneSlots};
use crate::models::ZoneRole;
use crate::rng::PrngProvider;

/// Default probability for case 1
pub const P_ALL_FREE: f64 = 0.20;
/// Default probability for case 2
pub const P_ONE_FREE: f64 = 0.10;

/// Free-percentage balancing with stochastic overflow
#[derive(Debug, Clone)]
pub struct BalancedPolicy {
    p_all_free: f64,
    p_one_free: f64,
}

impl BalancedPolicy {
    pub fn new(p_all_free: f64, p_one_free: f64) -> Self {
        Self {
            p_all_free,
            p_one_free,
        }
    }
}

impl Default for BalancedPolicy {
    fn default() -> Self {
        Self::new(P_ALL_FREE, P_ONE_FREE)
    }
}

/// Both roles ordered by free percentage, `a` first on a tie
fn by_free_ratio(a: (ZoneRole, ZoneSlots), b: (ZoneRole, ZoneSlots)) -> [ZoneRole; 2] {
    if a.1.free_ratio() >= b.1.free_ratio() {
        [a.0, b.0]
    } else {
        [b.0, a.0]
    }
}

impl AllocationPolicy for BalancedPolicy {
    fn candidates(
        &mut self,
        availability: &ZoneAvailability,
        rng: &mut PrngProvider,
    ) -> Vec<ZoneRole> {
        let internal = availability.internal;
        let external = availability.external;

        let Some(projected) = availability.projected else {
            let order = by_free_ratio(
                (ZoneRole::Internal, internal),
                (ZoneRole::External, external),
            );
            return availability.with_space(&order);
        };

        let internal_free = internal.has_space();
        let projected_free = projected.has_space();
        let external_free = external.has_space();

        if external_free {
            let p = if internal_free && projected_free {
                Some(self.p_all_free)
            } else if internal_free != projected_free {
                Some(self.p_one_free)
            } else {
                None
            };
            if let Some(p) = p {
                if rng.next() < p {
                    return vec![ZoneRole::External];
                }
            }
        }

        if internal_free || projected_free {
            let order = by_free_ratio(
                (ZoneRole::Internal, internal),
                (ZoneRole::Projected, projected),
            );
            return availability.with_space(&order);
        }

        availability.with_space(&[ZoneRole::External])
    }

    fn name(&self) -> &'static str {
        "balanced"
    }
}
