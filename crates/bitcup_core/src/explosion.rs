//! Explosion force propagation
//!
//! When a bit trips the cup's trigger zone it launches nearby settled bits
//! upward. The math never fails; gating (one-shot flag, tier checks,
//! re-trigger velocity) lives in the engine facade, the force and impulse
//! computation lives here.

use crate::denom::Denomination;
use crate::physics::{BodyId, SimBackend};
use crate::tuning::Tuning;
use glam::Vec2;

/// Downward speed above which an already-exploded bit may explode again.
pub const RETRIGGER_SPEED: f32 = 1024.0;
/// Bits moving faster than this are mid-launch and excluded from the blast,
/// so a chain reaction cannot re-launch them disproportionately.
pub const SETTLED_SPEED: f32 = 128.0;
/// Speed at or below which a bit counts toward the trigger density.
pub const TRIGGER_SPEED: f32 = 50.0;
/// More overlapping slow bits than this arms the trigger zone.
pub const TRIGGER_DENSITY: usize = 10;
/// Fixed downward kick on the triggering bit itself.
pub const COUNTER_IMPULSE: f32 = 300.0;

/// Scales explosion force for combined high-power bits.
///
/// Pluggable because the right curve is a tuning question, not a law; the
/// default saturates so larger stacks gain proportionally less extra force
/// and chained explosions cannot run away.
pub type PowerCurve = fn(force: f32, power: u16) -> f32;

/// Default curve: approaches 2x as power grows, half the headroom at 10.
pub fn saturating_power_curve(force: f32, power: u16) -> f32 {
    let p = f32::from(power);
    force * (1.0 + p / (p + 10.0))
}

/// Density gate for a trigger-zone entry: explode when the zone is crowded
/// with settled bits (or unconditionally for an always-armed zone).
pub fn should_trigger(overlap_speeds: impl IntoIterator<Item = f32>, always: bool) -> bool {
    if always {
        return true;
    }
    let settled = overlap_speeds
        .into_iter()
        .filter(|&speed| speed <= TRIGGER_SPEED)
        .count();
    settled > TRIGGER_DENSITY
}

/// Upward impulse for one explosion.
///
/// `vertical_velocity` is the triggering bit's fall speed (+Y is down); a
/// hard-falling bit amplifies the blast.
pub fn explosion_impulse(
    denom: Denomination,
    power: u16,
    tuning: &Tuning,
    curve: PowerCurve,
    vertical_velocity: f32,
) -> Vec2 {
    let mut force = tuning.force(denom);
    if power > 1 {
        force = curve(force, power);
    }
    Vec2::NEG_Y * force + Vec2::NEG_Y * (vertical_velocity * tuning.velocity_amp)
}

/// Push every settled bit in the cup except the source, then kick the
/// source downward so the exploding bit does not rocket out of the cup.
pub fn apply_explosion(backend: &mut dyn SimBackend, source: BodyId, impulse: Vec2) {
    for body in backend.cup_overlaps() {
        if body == source {
            continue;
        }
        if backend.linear_velocity(body).length() < SETTLED_SPEED {
            backend.apply_impulse(body, impulse);
        }
    }
    backend.apply_impulse(source, Vec2::Y * COUNTER_IMPULSE);
}
