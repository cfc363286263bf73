//! Donation denominations
//!
//! The five bit tiers form a closed set; per-tier data lives in parallel
//! lookup tables (`DenomTable`) rather than behind trait objects, since the
//! set is fixed and the lookups sit on the spawn/explosion hot paths.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Number of denomination tiers.
pub const DENOM_COUNT: usize = 5;

/// One donation tier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Denomination {
    Bit1,
    Bit100,
    Bit1000,
    Bit5000,
    Bit10000,
}

impl Denomination {
    /// All tiers, smallest first. Scheduler scan order depends on this.
    pub const ALL: [Denomination; DENOM_COUNT] = [
        Denomination::Bit1,
        Denomination::Bit100,
        Denomination::Bit1000,
        Denomination::Bit5000,
        Denomination::Bit10000,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Bit value of one unit of this tier.
    pub fn value(self) -> u32 {
        match self {
            Denomination::Bit1 => 1,
            Denomination::Bit100 => 100,
            Denomination::Bit1000 => 1000,
            Denomination::Bit5000 => 5000,
            Denomination::Bit10000 => 10000,
        }
    }

    /// The smallest tier never explodes and is never combined.
    #[inline]
    pub fn is_smallest(self) -> bool {
        matches!(self, Denomination::Bit1)
    }

    /// Built-in explosion force before any configured bonus.
    pub fn base_force(self) -> f32 {
        match self {
            Denomination::Bit1 => 0.0,
            Denomination::Bit100 => 500.0,
            Denomination::Bit1000 => 1000.0,
            Denomination::Bit5000 => 1450.0,
            Denomination::Bit10000 => 2500.0,
        }
    }
}

/// Per-tier lookup table indexed by `Denomination`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DenomTable<T>([T; DENOM_COUNT]);

impl<T> DenomTable<T> {
    pub fn new(values: [T; DENOM_COUNT]) -> Self {
        Self(values)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Denomination, &T)> {
        Denomination::ALL.iter().copied().zip(self.0.iter())
    }

    pub fn as_array(&self) -> &[T; DENOM_COUNT] {
        &self.0
    }
}

impl<T> Index<Denomination> for DenomTable<T> {
    type Output = T;

    #[inline]
    fn index(&self, denom: Denomination) -> &T {
        &self.0[denom.index()]
    }
}

impl<T> IndexMut<Denomination> for DenomTable<T> {
    #[inline]
    fn index_mut(&mut self, denom: Denomination) -> &mut T {
        &mut self.0[denom.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_ordered_smallest_first() {
        let mut prev = 0;
        for denom in Denomination::ALL {
            assert!(denom.value() > prev);
            prev = denom.value();
        }
    }

    #[test]
    fn index_round_trips() {
        for denom in Denomination::ALL {
            assert_eq!(Denomination::from_index(denom.index()), Some(denom));
        }
        assert_eq!(Denomination::from_index(DENOM_COUNT), None);
    }

    #[test]
    fn table_indexing() {
        let mut table = DenomTable::new([0u32; DENOM_COUNT]);
        table[Denomination::Bit5000] = 7;
        assert_eq!(table[Denomination::Bit5000], 7);
        assert_eq!(table[Denomination::Bit1], 0);
    }

    #[test]
    fn only_bit1_is_smallest() {
        assert!(Denomination::Bit1.is_smallest());
        assert!(Denomination::ALL[1..].iter().all(|d| !d.is_smallest()));
    }
}
