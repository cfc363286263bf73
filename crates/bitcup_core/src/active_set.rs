//! Sparse/dense active-set index
//!
//! Maps slot ids to positions in a dense array of live bit state, giving
//! O(1) activate, O(1) membership test, and O(1) deactivate via
//! swap-with-last. The dense array does NOT preserve spawn order; callers
//! must never rely on it.
//!
//! Invariant: for every `i < len()`, `sparse[dense[i].slot] == i`, and
//! `sparse[s] == INACTIVE` exactly when slot `s` is inactive. Violations are
//! programming errors and assert, they are not recoverable failures.

use crate::denom::Denomination;
use crate::pool::SlotId;

/// Sparse-array sentinel for "slot not active".
const INACTIVE: i32 = -1;

/// Live state for one active bit.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEntry {
    pub slot: SlotId,
    /// Combined-unit multiplier; 1 unless combine mode folded a tier.
    pub power: u16,
    pub has_exploded: bool,
    pub denom: Denomination,
    /// Override texture id, `None` for the tier default.
    pub texture: Option<String>,
}

impl ActiveEntry {
    pub fn new(slot: SlotId, power: u16, denom: Denomination, texture: Option<String>) -> Self {
        Self {
            slot,
            power,
            has_exploded: false,
            denom,
            texture,
        }
    }
}

/// Fixed-capacity sparse/dense set over slot ids.
pub struct ActiveSet {
    sparse: Vec<i32>,
    dense: Vec<ActiveEntry>,
}

impl ActiveSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            sparse: vec![INACTIVE; capacity],
            dense: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.sparse.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    #[inline]
    pub fn is_active(&self, slot: SlotId) -> bool {
        self.sparse[slot] != INACTIVE
    }

    /// Dense position of `slot`, if active.
    pub fn dense_index(&self, slot: SlotId) -> Option<usize> {
        match self.sparse.get(slot) {
            Some(&d) if d != INACTIVE => Some(d as usize),
            _ => None,
        }
    }

    /// Activate `entry.slot`, returning its dense index.
    ///
    /// Panics if the slot is already active or the set is at capacity.
    pub fn activate(&mut self, entry: ActiveEntry) -> usize {
        let slot = entry.slot;
        assert!(
            self.sparse[slot] == INACTIVE,
            "double-activate of slot {slot}"
        );
        assert!(
            self.dense.len() < self.capacity(),
            "active set at capacity ({})",
            self.capacity()
        );

        let dense_index = self.dense.len();
        self.dense.push(entry);
        self.sparse[slot] = dense_index as i32;
        dense_index
    }

    /// Deactivate `slot` by swapping the last dense entry into its position.
    ///
    /// Panics if the slot is not active.
    pub fn deactivate(&mut self, slot: SlotId) -> ActiveEntry {
        let d = self.sparse[slot];
        assert!(d != INACTIVE, "deactivate of inactive slot {slot}");
        let d = d as usize;

        self.sparse[slot] = INACTIVE;
        let entry = self.dense.swap_remove(d);
        debug_assert_eq!(entry.slot, slot);

        // Patch the sparse mapping of the entry that moved into the hole.
        if d < self.dense.len() {
            self.sparse[self.dense[d].slot] = d as i32;
        }
        entry
    }

    /// Deactivate everything and reset every sparse mapping.
    pub fn clear(&mut self) {
        for entry in self.dense.drain(..) {
            self.sparse[entry.slot] = INACTIVE;
        }
    }

    pub fn entry(&self, slot: SlotId) -> Option<&ActiveEntry> {
        self.dense_index(slot).map(|d| &self.dense[d])
    }

    pub fn entry_mut(&mut self, slot: SlotId) -> Option<&mut ActiveEntry> {
        self.dense_index(slot).map(move |d| &mut self.dense[d])
    }

    pub fn entry_at_mut(&mut self, dense_index: usize) -> &mut ActiveEntry {
        &mut self.dense[dense_index]
    }

    /// Dense entries, unordered.
    pub fn entries(&self) -> &[ActiveEntry] {
        &self.dense
    }
}
