//! Engine facade
//!
//! `BitEngine` owns the slot pool, the active-set index, and the order
//! scheduler, and runs them from a single-threaded fixed-cadence loop.
//! External producers submit orders through a bounded channel drained at the
//! start of every tick; the hosting simulation invokes the boundary-exit and
//! explosion-trigger callbacks synchronously within the same tick, so a
//! reclaimed slot is reusable before the next spawn decision.

use crate::active_set::{ActiveEntry, ActiveSet};
use crate::denom::Denomination;
use crate::explosion::{
    apply_explosion, explosion_impulse, saturating_power_curve, PowerCurve, RETRIGGER_SPEED,
};
use crate::order::{BitOrder, OrderError, OrderKind, OrderScheduler, SpawnCommand};
use crate::physics::{BodyId, NoOverrides, SimBackend, TextureResolver};
use crate::pool::{SlotId, SlotPool};
use crate::tuning::Tuning;
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};

/// Bound on orders buffered between the producer and the simulation loop.
const ORDER_CHANNEL_CAPACITY: usize = 128;

/// Horizontal velocity jitter applied to fresh spawns.
const SPAWN_JITTER: f32 = 10.0;
/// Spin jitter for plain and rain spawns.
const SPIN_JITTER_PLAIN: f32 = 10.0;
const SPIN_JITTER_RAIN: f32 = 32.0;

/// Thread-safe handle for submitting orders from another execution context
/// (typically the chat/event client's I/O callback).
#[derive(Clone)]
pub struct OrderSender(mpsc::Sender<BitOrder>);

impl OrderSender {
    /// Submit an order. All-zero orders are rejected here so they never
    /// consume a scheduler tick; a full channel is back-pressure at the
    /// boundary, never inside the simulation loop.
    pub fn enqueue(&self, order: BitOrder) -> Result<(), OrderError> {
        if order.is_empty() {
            return Err(OrderError::Empty);
        }
        self.0.try_send(order).map_err(|err| match err {
            TrySendError::Full(_) => OrderError::ChannelFull,
            TrySendError::Closed(_) => OrderError::Disconnected,
        })
    }
}

/// One persisted pool slot. `active == false` records carry placeholder
/// state and are skipped on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitRecord {
    pub slot: SlotId,
    pub active: bool,
    pub x: f32,
    pub y: f32,
    pub denom: Denomination,
    pub power: u16,
    pub has_exploded: bool,
    pub texture: Option<String>,
}

/// The bit lifecycle engine.
pub struct BitEngine {
    pool: SlotPool,
    active: ActiveSet,
    scheduler: OrderScheduler,
    tuning: Tuning,
    power_curve: PowerCurve,
    resolver: Box<dyn TextureResolver>,
    spawn_position: Vec2,
    rng: Pcg32,
    orders_tx: mpsc::Sender<BitOrder>,
    orders_rx: mpsc::Receiver<BitOrder>,
}

impl BitEngine {
    pub fn new(capacity: usize, spawn_position: Vec2, tuning: Tuning, seed: u64) -> Self {
        let (orders_tx, orders_rx) = mpsc::channel(ORDER_CHANNEL_CAPACITY);
        Self {
            pool: SlotPool::new(capacity),
            active: ActiveSet::new(capacity),
            scheduler: OrderScheduler::new(),
            tuning,
            power_curve: saturating_power_curve,
            resolver: Box::new(NoOverrides),
            spawn_position,
            rng: Pcg32::seed_from_u64(seed),
            orders_tx,
            orders_rx,
        }
    }

    /// Park every pooled body at the spawn point. Call once after the
    /// backend has created its bodies.
    pub fn init_backend(&self, backend: &mut dyn SimBackend) {
        self.pool.reset_backend(backend, self.spawn_position);
    }

    /// Cloneable cross-thread order submission handle.
    pub fn order_sender(&self) -> OrderSender {
        OrderSender(self.orders_tx.clone())
    }

    /// Same-thread order submission, subject to the same rejection rules.
    pub fn enqueue_order(&mut self, order: BitOrder) -> Result<(), OrderError> {
        self.scheduler.push(order)
    }

    pub fn set_tuning(&mut self, tuning: Tuning) {
        self.tuning = tuning;
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn set_power_curve(&mut self, curve: PowerCurve) {
        self.power_curve = curve;
    }

    pub fn set_texture_resolver(&mut self, resolver: Box<dyn TextureResolver>) {
        self.resolver = resolver;
    }

    // Telemetry, consumed by the debug overlay.

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn queued_orders(&self) -> usize {
        self.scheduler.len()
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Advance one frame: drain externally submitted orders, then let the
    /// scheduler release at most one unit into the simulation.
    pub fn tick(&mut self, dt: f32, backend: &mut dyn SimBackend) {
        loop {
            match self.orders_rx.try_recv() {
                Ok(order) => {
                    if let Err(err) = self.scheduler.push(order) {
                        tracing::warn!(%err, "discarding submitted order");
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        if let Some(command) = self.scheduler.tick(dt, &self.tuning, &mut self.rng) {
            self.spawn_command(command, backend);
        }
    }

    fn spawn_command(&mut self, command: SpawnCommand, backend: &mut dyn SimBackend) {
        let SpawnCommand {
            denom,
            power,
            texture,
            kind,
        } = command;
        self.spawn(
            denom,
            self.spawn_position,
            power,
            texture,
            kind == OrderKind::Rain,
            backend,
        );
    }

    /// Claim a free slot, configure its body, and activate it.
    ///
    /// Returns the new dense index (the restore path patches the exploded
    /// flag through it). Panics if the pool is exhausted.
    pub fn spawn(
        &mut self,
        denom: Denomination,
        position: Vec2,
        power: u16,
        texture: Option<String>,
        rain: bool,
        backend: &mut dyn SimBackend,
    ) -> usize {
        let slot = self.pool.claim(&self.active);

        backend.place(slot, position);
        backend.set_linear_velocity(
            slot,
            Vec2::new(self.rng.gen_range(-1.0..=1.0) * SPAWN_JITTER, 0.0),
        );
        let spin_jitter = if rain {
            SPIN_JITTER_RAIN
        } else {
            SPIN_JITTER_PLAIN
        };
        backend.set_angular_velocity(slot, self.rng.gen_range(-1.0..=1.0) * spin_jitter);
        backend.set_enabled(slot, true);
        backend.set_mass(slot, self.tuning.mass[denom]);
        backend.set_collision_tier(slot, denom);

        let texture = texture.filter(|id| {
            if self.resolver.resolves(id) {
                true
            } else {
                tracing::debug!(id, "override texture unresolved, using tier default");
                false
            }
        });
        backend.set_texture(slot, denom, texture.as_deref());

        self.active
            .activate(ActiveEntry::new(slot, power.max(1), denom, texture))
    }

    /// Trigger-zone callback. A trigger for an untracked body is logged and
    /// ignored; the smallest tier never explodes; each bit explodes once
    /// unless re-launched downward past the re-trigger threshold.
    pub fn on_explosion_trigger(&mut self, body: BodyId, backend: &mut dyn SimBackend) {
        let Some(entry) = self.active.entry_mut(body) else {
            tracing::warn!(body, "explosion trigger for untracked body");
            return;
        };
        if entry.denom.is_smallest() {
            return;
        }

        let velocity = backend.linear_velocity(body);
        if entry.has_exploded && velocity.y <= RETRIGGER_SPEED {
            return;
        }
        entry.has_exploded = true;

        let impulse = explosion_impulse(
            entry.denom,
            entry.power,
            &self.tuning,
            self.power_curve,
            velocity.y,
        );
        apply_explosion(backend, body, impulse);
    }

    /// Bounds-exit callback. Deactivates the slot and parks the body for
    /// reuse; duplicate callbacks for the same exit are no-ops.
    pub fn on_boundary_exit(&mut self, body: BodyId, backend: &mut dyn SimBackend) {
        if self.active.dense_index(body).is_none() {
            tracing::debug!(body, "boundary exit for inactive body");
            return;
        }
        self.active.deactivate(body);
        self.release_slot(body, backend);
    }

    /// Deactivate every active slot. Queued orders are untouched; use
    /// [`clear_orders`](Self::clear_orders) to drop those too.
    pub fn clear_all(&mut self, backend: &mut dyn SimBackend) {
        let slots: Vec<SlotId> = self.active.entries().iter().map(|e| e.slot).collect();
        self.active.clear();
        for slot in slots {
            self.release_slot(slot, backend);
        }
    }

    /// Drop every queued order wholesale.
    pub fn clear_orders(&mut self) {
        self.scheduler.clear();
    }

    fn release_slot(&self, slot: SlotId, backend: &mut dyn SimBackend) {
        backend.set_enabled(slot, false);
        backend.hide(slot);
        backend.place(slot, self.spawn_position);
    }

    /// Snapshot every pool slot for persistence.
    pub fn snapshot(&self, backend: &dyn SimBackend) -> Vec<BitRecord> {
        (0..self.pool.capacity())
            .map(|slot| match self.active.entry(slot) {
                Some(entry) => {
                    let position = backend.position(slot);
                    BitRecord {
                        slot,
                        active: true,
                        x: position.x.floor(),
                        y: position.y.floor(),
                        denom: entry.denom,
                        power: entry.power,
                        has_exploded: entry.has_exploded,
                        texture: entry.texture.clone(),
                    }
                }
                None => BitRecord {
                    slot,
                    active: false,
                    x: self.spawn_position.x,
                    y: self.spawn_position.y,
                    denom: Denomination::Bit1,
                    power: 1,
                    has_exploded: false,
                    texture: None,
                },
            })
            .collect()
    }

    /// Respawn previously persisted bits. Saved slot assignments are not
    /// preserved; each record claims a fresh slot like a normal spawn.
    pub fn restore(&mut self, records: &[BitRecord], backend: &mut dyn SimBackend) {
        for record in records {
            if !record.active {
                continue;
            }
            if self.active.len() >= self.pool.capacity() {
                tracing::warn!("restore truncated: pool capacity reached");
                break;
            }
            let dense = self.spawn(
                record.denom,
                Vec2::new(record.x, record.y),
                record.power.max(1),
                record.texture.clone(),
                false,
                backend,
            );
            self.active.entry_at_mut(dense).has_exploded = record.has_exploded;
        }
    }
}
