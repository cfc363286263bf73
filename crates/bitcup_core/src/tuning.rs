//! Runtime-adjustable simulation parameters

use crate::denom::{DenomTable, Denomination};

/// Tunable per-tier and scheduler parameters.
///
/// Hot-swappable on the engine; defaults match the shipped overlay behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuning {
    /// Seconds between spawns while draining a plain order.
    pub drop_delay: f32,
    /// How much of the triggering bit's fall speed feeds into the impulse.
    pub velocity_amp: f32,
    /// Collapse repeated non-smallest-tier spawns into one high-power bit.
    pub combine_bits: bool,
    /// Simulated mass per tier.
    pub mass: DenomTable<f32>,
    /// Configured bonus added to each tier's base explosion force.
    pub force_bonus: DenomTable<f32>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            drop_delay: 0.25,
            velocity_amp: 0.5,
            combine_bits: false,
            mass: DenomTable::new([1.0, 1.5, 2.0, 2.5, 3.0]),
            force_bonus: DenomTable::new([0.0, 500.0, 1000.0, 1400.0, 2400.0]),
        }
    }
}

impl Tuning {
    /// Effective explosion force for one unit of `denom`.
    pub fn force(&self, denom: Denomination) -> f32 {
        denom.base_force() + self.force_bonus[denom]
    }
}
