//! Seams to the external simulation and presentation layers
//!
//! The engine never integrates motion itself; it configures bodies and
//! applies impulses through `SimBackend`, and the host simulation calls back
//! into the engine on boundary-exit and explosion-trigger events.

use crate::denom::Denomination;
use glam::Vec2;

/// Stable simulated-body handle. Body ids coincide with slot ids; the pool
/// creates one body per slot at startup and never destroys it.
pub type BodyId = usize;

/// Operations the engine needs from the hosting simulation.
///
/// Coordinates follow the screen convention: +Y is down, so "up" impulses
/// point along -Y.
pub trait SimBackend {
    /// Teleport a body, clearing any residual transform state.
    fn place(&mut self, body: BodyId, position: Vec2);
    fn set_linear_velocity(&mut self, body: BodyId, velocity: Vec2);
    fn set_angular_velocity(&mut self, body: BodyId, velocity: f32);
    fn set_mass(&mut self, body: BodyId, mass: f32);
    /// Enable only the collision shape matching `denom`; disable the rest.
    fn set_collision_tier(&mut self, body: BodyId, denom: Denomination);
    /// Unfreeze/freeze the body and include/exclude it from simulation.
    fn set_enabled(&mut self, body: BodyId, enabled: bool);
    /// Assign and show the body's sprite. `override_id` is pre-resolved;
    /// `None` means the tier default.
    fn set_texture(&mut self, body: BodyId, denom: Denomination, override_id: Option<&str>);
    /// Hide the body's sprite.
    fn hide(&mut self, body: BodyId);

    fn position(&self, body: BodyId) -> Vec2;
    fn linear_velocity(&self, body: BodyId) -> Vec2;
    fn apply_impulse(&mut self, body: BodyId, impulse: Vec2);

    /// Bodies currently overlapping the cup containment zone.
    fn cup_overlaps(&self) -> Vec<BodyId>;
}

/// Decides whether a donation's override texture id is usable by the
/// presentation layer. Unresolvable ids fall back to the tier default.
pub trait TextureResolver: Send {
    fn resolves(&self, id: &str) -> bool;
}

/// Resolver that knows no override textures.
pub struct NoOverrides;

impl TextureResolver for NoOverrides {
    fn resolves(&self, _id: &str) -> bool {
        false
    }
}
