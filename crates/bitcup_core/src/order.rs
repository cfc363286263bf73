//! Order queue and throttled spawn scheduler
//!
//! Donations arrive as `BitOrder` batches and drain through a strict FIFO
//! queue, at most one denomination-unit per tick. The per-order timer
//! carries its remainder across spawns so the configured interval is exact
//! over time, and drops negative for the pauses between tiers and orders.

use crate::denom::{DenomTable, Denomination, DENOM_COUNT};
use crate::tuning::Tuning;
use rand::Rng;
use std::collections::VecDeque;
use thiserror::Error;

/// Spawn interval while draining a rain order, seconds.
pub const RAIN_DELAY: f32 = 0.05;
/// Pause inserted when a plain order exhausts one tier and moves to the next.
pub const TIER_PAUSE: f32 = 2.0;
/// Pause inserted between two queued orders.
pub const ORDER_PAUSE: f32 = 3.0;
/// Chance that the rain cursor passes over a non-empty tier, biasing the
/// stream away from hammering one tier.
pub const RAIN_SKIP_CHANCE: f32 = 0.25;
/// Largest bit amount accepted for a single order.
pub const MAX_ORDER_AMOUNT: u32 = i16::MAX as u32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("order contains no units")]
    Empty,
    #[error("order channel is full")]
    ChannelFull,
    #[error("order channel is disconnected")]
    Disconnected,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OrderKind {
    /// Ordinary donation; paced by the configured drop delay.
    Plain,
    /// Event shower; faster cadence, randomized tier selection.
    Rain,
}

/// A queued batch request: how many units of each tier to spawn.
#[derive(Debug, Clone, PartialEq)]
pub struct BitOrder {
    pub kind: OrderKind,
    pub amounts: DenomTable<u32>,
    /// Per-tier override texture ids (cheermote art), if any.
    pub textures: DenomTable<Option<String>>,
}

impl BitOrder {
    /// Break a raw bit amount greedily into tiers, largest first.
    pub fn from_amount(amount: u32) -> Self {
        let mut remaining = amount.clamp(1, MAX_ORDER_AMOUNT);
        let mut amounts = DenomTable::new([0u32; DENOM_COUNT]);
        for denom in Denomination::ALL.iter().rev() {
            amounts[*denom] = remaining / denom.value();
            remaining %= denom.value();
        }
        Self {
            kind: OrderKind::Plain,
            amounts,
            textures: DenomTable::default(),
        }
    }

    /// Like [`from_amount`](Self::from_amount), tagging the largest non-zero
    /// tier with the donor's override texture.
    pub fn with_texture(amount: u32, texture_id: impl Into<String>) -> Self {
        let mut order = Self::from_amount(amount);
        for denom in Denomination::ALL.iter().rev() {
            if order.amounts[*denom] > 0 {
                order.textures[*denom] = Some(texture_id.into());
                break;
            }
        }
        order
    }

    /// Celebration shower for a hype level in `1..=5`.
    pub fn rain(level: u8) -> Self {
        let level = level.clamp(1, 5);
        let mut amounts = DenomTable::new([0u32; DENOM_COUNT]);
        amounts[Denomination::Bit1] = 50;
        match level {
            1 => amounts[Denomination::Bit1] += 25,
            2 => amounts[Denomination::Bit1] += 100,
            3 => amounts[Denomination::Bit100] = 150,
            4 => amounts[Denomination::Bit1000] = 150,
            _ => {
                amounts[Denomination::Bit5000] = 150;
                amounts[Denomination::Bit10000] = 1;
            }
        }
        Self {
            kind: OrderKind::Rain,
            amounts,
            textures: DenomTable::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.as_array().iter().all(|&n| n == 0)
    }

    /// Total requested units across all tiers.
    pub fn total_units(&self) -> u32 {
        self.amounts.as_array().iter().sum()
    }

    /// True when only the smallest tier carries units. Such orders stream
    /// smoothly into each other, so the inter-order pause is skipped.
    pub fn is_small_only(&self) -> bool {
        self.amounts[Denomination::Bit1] > 0
            && Denomination::ALL[1..]
                .iter()
                .all(|&d| self.amounts[d] == 0)
    }
}

/// One unit the scheduler has decided to materialize this tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnCommand {
    pub denom: Denomination,
    pub power: u16,
    pub texture: Option<String>,
    pub kind: OrderKind,
}

/// FIFO order queue plus the per-tick advance state machine.
pub struct OrderScheduler {
    queue: VecDeque<BitOrder>,
    timer: f32,
    rain_cursor: usize,
}

impl OrderScheduler {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            timer: 0.0,
            rain_cursor: 0,
        }
    }

    /// Append an order. All-zero orders are rejected here rather than
    /// silently finishing on their first tick.
    pub fn push(&mut self, order: BitOrder) -> Result<(), OrderError> {
        if order.is_empty() {
            return Err(OrderError::Empty);
        }
        self.queue.push_back(order);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop every queued order. In-flight progress is lost.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.timer = 0.0;
    }

    /// Advance by one tick; at most one unit is released per call.
    pub fn tick(&mut self, dt: f32, tuning: &Tuning, rng: &mut impl Rng) -> Option<SpawnCommand> {
        let order = self.queue.front_mut()?;
        let delay = match order.kind {
            OrderKind::Plain => tuning.drop_delay,
            OrderKind::Rain => RAIN_DELAY,
        };

        self.timer += dt;
        if self.timer < delay {
            return None;
        }
        // Carry the remainder so the interval stays exact across ticks.
        self.timer -= delay;

        let advance = match order.kind {
            OrderKind::Plain => advance_plain(order, tuning.combine_bits),
            OrderKind::Rain => advance_rain(order, &mut self.rain_cursor, rng),
        };

        let Some((command, tier_emptied)) = advance else {
            // Defensive: an empty order should never reach the queue.
            tracing::warn!("dropping exhausted order from queue head");
            self.queue.pop_front();
            return None;
        };

        if tier_emptied && !order.is_empty() {
            self.timer = -TIER_PAUSE;
        }

        if order.is_empty() {
            self.queue.pop_front();
            let next_streams = self
                .queue
                .front()
                .is_some_and(|next| next.is_small_only());
            self.timer = if next_streams { 0.0 } else { -ORDER_PAUSE };
        }

        Some(command)
    }
}

impl Default for OrderScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Plain orders drain smallest tier first; combine mode collapses a whole
/// non-smallest tier into one high-power unit.
fn advance_plain(order: &mut BitOrder, combine: bool) -> Option<(SpawnCommand, bool)> {
    for denom in Denomination::ALL {
        if order.amounts[denom] == 0 {
            continue;
        }
        let power = if combine && !denom.is_smallest() {
            let folded = order.amounts[denom].min(u32::from(u16::MAX)) as u16;
            order.amounts[denom] = 0;
            folded
        } else {
            order.amounts[denom] -= 1;
            1
        };
        let command = SpawnCommand {
            denom,
            power,
            texture: order.textures[denom].clone(),
            kind: OrderKind::Plain,
        };
        return Some((command, order.amounts[denom] == 0));
    }
    None
}

/// Rain orders rotate a tier cursor and occasionally skip a tier so the
/// shower mixes denominations instead of draining them in sequence.
fn advance_rain(
    order: &mut BitOrder,
    cursor: &mut usize,
    rng: &mut impl Rng,
) -> Option<(SpawnCommand, bool)> {
    let start = *cursor;
    *cursor = (*cursor + 1) % DENOM_COUNT;

    let mut candidates = (0..DENOM_COUNT)
        .filter_map(|offset| Denomination::from_index((start + offset) % DENOM_COUNT))
        .filter(|&d| order.amounts[d] > 0);

    let first = candidates.next()?;
    let pick = if rng.gen::<f32>() < RAIN_SKIP_CHANCE {
        candidates.next().unwrap_or(first)
    } else {
        first
    };

    order.amounts[pick] -= 1;
    let command = SpawnCommand {
        denom: pick,
        power: 1,
        texture: order.textures[pick].clone(),
        kind: OrderKind::Rain,
    };
    Some((command, false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(0x5eed)
    }

    fn order_from_counts(counts: [u32; DENOM_COUNT]) -> BitOrder {
        BitOrder {
            kind: OrderKind::Plain,
            amounts: DenomTable::new(counts),
            textures: DenomTable::default(),
        }
    }

    /// Drain the whole queue with oversized ticks, collecting every command.
    fn drain(scheduler: &mut OrderScheduler, tuning: &Tuning) -> Vec<SpawnCommand> {
        let mut rng = rng();
        let mut commands = Vec::new();
        for _ in 0..100_000 {
            if scheduler.is_empty() {
                break;
            }
            if let Some(cmd) = scheduler.tick(10.0, tuning, &mut rng) {
                commands.push(cmd);
            }
        }
        commands
    }

    #[test]
    fn breakdown_is_greedy() {
        let order = BitOrder::from_amount(11_203);
        assert_eq!(order.amounts[Denomination::Bit10000], 1);
        assert_eq!(order.amounts[Denomination::Bit5000], 0);
        assert_eq!(order.amounts[Denomination::Bit1000], 1);
        assert_eq!(order.amounts[Denomination::Bit100], 2);
        assert_eq!(order.amounts[Denomination::Bit1], 3);
        assert_eq!(order.total_units(), 7);
    }

    #[test]
    fn texture_tags_largest_tier() {
        let order = BitOrder::with_texture(5_100, "kappa");
        assert_eq!(
            order.textures[Denomination::Bit5000].as_deref(),
            Some("kappa")
        );
        assert_eq!(order.textures[Denomination::Bit100], None);
    }

    #[test]
    fn rain_levels() {
        assert_eq!(BitOrder::rain(1).amounts[Denomination::Bit1], 75);
        assert_eq!(BitOrder::rain(2).amounts[Denomination::Bit1], 150);
        assert_eq!(BitOrder::rain(3).amounts[Denomination::Bit100], 150);
        let top = BitOrder::rain(5);
        assert_eq!(top.amounts[Denomination::Bit5000], 150);
        assert_eq!(top.amounts[Denomination::Bit10000], 1);
        // Out-of-range levels clamp.
        assert_eq!(BitOrder::rain(9), BitOrder::rain(5));
    }

    #[test]
    fn empty_orders_are_rejected() {
        let mut scheduler = OrderScheduler::new();
        let empty = order_from_counts([0; DENOM_COUNT]);
        assert_eq!(scheduler.push(empty), Err(OrderError::Empty));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn conservation_without_combine() {
        let mut scheduler = OrderScheduler::new();
        scheduler
            .push(order_from_counts([50, 20, 10, 5, 2]))
            .unwrap();

        let tuning = Tuning::default();
        let commands = drain(&mut scheduler, &tuning);

        assert_eq!(commands.len(), 87);
        assert!(commands.iter().all(|c| c.power == 1));
    }

    #[test]
    fn conservation_with_combine() {
        let mut scheduler = OrderScheduler::new();
        scheduler
            .push(order_from_counts([50, 20, 10, 5, 2]))
            .unwrap();

        let tuning = Tuning {
            combine_bits: true,
            ..Tuning::default()
        };
        let commands = drain(&mut scheduler, &tuning);

        // The smallest tier never combines; each other tier folds to one call.
        assert_eq!(commands.len(), 54);
        let total: u32 = commands.iter().map(|c| u32::from(c.power)).sum();
        assert_eq!(total, 87);
    }

    #[test]
    fn smallest_tier_drains_first() {
        let mut scheduler = OrderScheduler::new();
        scheduler.push(order_from_counts([2, 1, 0, 0, 0])).unwrap();

        let tuning = Tuning::default();
        let commands = drain(&mut scheduler, &tuning);
        assert_eq!(
            commands.iter().map(|c| c.denom).collect::<Vec<_>>(),
            vec![
                Denomination::Bit1,
                Denomination::Bit1,
                Denomination::Bit100
            ]
        );
    }

    #[test]
    fn spawn_interval_is_exact_over_time() {
        // Order {1: 5}, interval 0.25s, ticked at 0.1s: spawns land at
        // 0.3, 0.5, 0.8, 1.0 and the fifth at 1.3, finishing the order.
        let mut scheduler = OrderScheduler::new();
        scheduler.push(order_from_counts([5, 0, 0, 0, 0])).unwrap();

        let tuning = Tuning {
            drop_delay: 0.25,
            ..Tuning::default()
        };
        let mut rng = rng();
        let mut spawned = 0;
        for step in 1..=13 {
            if scheduler.tick(0.1, &tuning, &mut rng).is_some() {
                spawned += 1;
            }
            if step == 10 {
                assert_eq!(spawned, 4);
                assert_eq!(scheduler.len(), 1);
            }
        }
        assert_eq!(spawned, 5);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn tier_exhaustion_pauses_before_next_tier() {
        let mut scheduler = OrderScheduler::new();
        scheduler.push(order_from_counts([1, 1, 0, 0, 0])).unwrap();

        let tuning = Tuning::default();
        let mut rng = rng();

        // First unit empties the smallest tier.
        assert!(scheduler.tick(1.0, &tuning, &mut rng).is_some());
        // The next unit waits out the tier pause, not just the drop delay.
        assert!(scheduler.tick(1.0, &tuning, &mut rng).is_none());
        assert!(scheduler.tick(1.0, &tuning, &mut rng).is_none());
        assert!(scheduler.tick(1.5, &tuning, &mut rng).is_some());
    }

    #[test]
    fn inter_order_pause_skipped_for_small_streams() {
        let mut scheduler = OrderScheduler::new();
        scheduler.push(order_from_counts([1, 0, 0, 0, 0])).unwrap();
        scheduler.push(order_from_counts([1, 0, 0, 0, 0])).unwrap();
        scheduler.push(order_from_counts([0, 1, 0, 0, 0])).unwrap();

        let tuning = Tuning::default();
        let mut rng = rng();

        assert!(scheduler.tick(1.0, &tuning, &mut rng).is_some());
        // Next order is small-units-only: no pause, next drop on schedule.
        assert!(scheduler.tick(1.0, &tuning, &mut rng).is_some());
        // Following order is not: the inter-order pause applies.
        assert!(scheduler.tick(1.0, &tuning, &mut rng).is_none());
        assert!(scheduler.tick(1.0, &tuning, &mut rng).is_none());
        assert!(scheduler.tick(1.0, &tuning, &mut rng).is_none());
        assert!(scheduler.tick(1.5, &tuning, &mut rng).is_some());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn rain_conserves_units() {
        let mut scheduler = OrderScheduler::new();
        scheduler.push(BitOrder::rain(5)).unwrap();

        let tuning = Tuning::default();
        let commands = drain(&mut scheduler, &tuning);
        assert_eq!(commands.len(), 201);
        assert!(commands.iter().all(|c| c.kind == OrderKind::Rain));
        assert_eq!(
            commands
                .iter()
                .filter(|c| c.denom == Denomination::Bit10000)
                .count(),
            1
        );
    }

    #[test]
    fn rain_mixes_tiers() {
        let mut scheduler = OrderScheduler::new();
        let mut shower = BitOrder::rain(3);
        shower.amounts[Denomination::Bit1] = 50;
        shower.amounts[Denomination::Bit100] = 50;
        scheduler.push(shower).unwrap();

        let tuning = Tuning::default();
        let commands = drain(&mut scheduler, &tuning);

        // The rotating cursor interleaves tiers rather than draining one
        // before touching the other.
        let first_40: Vec<_> = commands.iter().take(40).map(|c| c.denom).collect();
        assert!(first_40.contains(&Denomination::Bit1));
        assert!(first_40.contains(&Denomination::Bit100));
    }

    #[test]
    fn clear_drops_everything() {
        let mut scheduler = OrderScheduler::new();
        scheduler.push(BitOrder::from_amount(500)).unwrap();
        scheduler.push(BitOrder::from_amount(11)).unwrap();
        scheduler.clear();
        assert!(scheduler.is_empty());

        let mut rng = rng();
        assert!(scheduler.tick(10.0, &Tuning::default(), &mut rng).is_none());
    }
}
