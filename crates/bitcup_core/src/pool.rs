//! Fixed-capacity slot pool
//!
//! All simulated bodies are created once at startup and only ever toggled
//! between active and inactive. Claiming scans forward from a rotating
//! cursor so freed slots are reused fairly; the scan is bounded by the pool
//! capacity and amortized O(1) in steady state.

use crate::active_set::ActiveSet;
use crate::physics::SimBackend;
use glam::Vec2;

/// Stable pool-entry id, `0..capacity`. Doubles as the physics body id.
pub type SlotId = usize;

/// Round-robin allocator over the pre-created slots.
///
/// The pool itself holds no per-slot data: a slot is its id, the body behind
/// it lives in the simulation backend, and its live state (if any) lives in
/// the active set.
pub struct SlotPool {
    capacity: usize,
    cursor: usize,
}

impl SlotPool {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "pool capacity must be non-zero");
        Self {
            capacity,
            cursor: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Park every body at the spawn point, disabled and hidden.
    ///
    /// Called once at startup and again on a wholesale clear so no residual
    /// transform state leaks into the next spawn.
    pub fn reset_backend(&self, backend: &mut dyn SimBackend, spawn_position: Vec2) {
        for slot in 0..self.capacity {
            backend.set_enabled(slot, false);
            backend.hide(slot);
            backend.place(slot, spawn_position);
        }
    }

    /// Claim the next inactive slot.
    ///
    /// Panics if every slot is active; the pool is sized above worst-case
    /// concurrent load precisely so this cannot happen in normal operation.
    pub fn claim(&mut self, active: &ActiveSet) -> SlotId {
        assert!(
            active.len() < self.capacity,
            "slot pool exhausted ({} slots)",
            self.capacity
        );
        loop {
            let slot = self.cursor;
            self.cursor = (self.cursor + 1) % self.capacity;
            if !active.is_active(slot) {
                return slot;
            }
        }
    }
}
