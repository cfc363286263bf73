//! Toy simulation backend for the headless demo loop
//!
//! Good enough to exercise the engine end to end: gravity, a cup floor that
//! bits settle on, a bounds box, and the cup/trigger overlap queries. Not a
//! physics engine; the production overlay hosts the engine inside a real one.

use bitcup_core::{BodyId, Denomination, SimBackend};
use glam::Vec2;

const GRAVITY: f32 = 980.0;
/// Velocity retained on floor contact.
const FLOOR_DAMPING: f32 = 0.35;
const REST_SPEED: f32 = 10.0;

struct DemoBody {
    enabled: bool,
    visible: bool,
    position: Vec2,
    velocity: Vec2,
    spin: f32,
    mass: f32,
    tier: Denomination,
    texture: Option<String>,
    in_trigger: bool,
}

impl DemoBody {
    fn parked() -> Self {
        Self {
            enabled: false,
            visible: false,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            spin: 0.0,
            mass: 1.0,
            tier: Denomination::Bit1,
            texture: None,
            in_trigger: false,
        }
    }
}

/// Events produced by one integration step.
#[derive(Debug, Default)]
pub struct StepEvents {
    /// Bodies that left the bounds box this step.
    pub exited: Vec<BodyId>,
    /// Bodies that entered the trigger band this step.
    pub trigger_entries: Vec<BodyId>,
}

pub struct DemoBackend {
    bodies: Vec<DemoBody>,
    bounds_min: Vec2,
    bounds_max: Vec2,
    cup_min: Vec2,
    cup_max: Vec2,
    /// Bodies below this line (inside the cup) arm the explosion trigger.
    trigger_y: f32,
}

impl DemoBackend {
    pub fn new(capacity: usize) -> Self {
        Self {
            bodies: (0..capacity).map(|_| DemoBody::parked()).collect(),
            bounds_min: Vec2::new(-400.0, -600.0),
            bounds_max: Vec2::new(400.0, 500.0),
            cup_min: Vec2::new(-150.0, 100.0),
            cup_max: Vec2::new(150.0, 400.0),
            trigger_y: 350.0,
        }
    }

    fn in_cup(&self, position: Vec2) -> bool {
        position.x >= self.cup_min.x
            && position.x <= self.cup_max.x
            && position.y >= self.cup_min.y
            && position.y <= self.cup_max.y
    }

    /// Advance every enabled body and report boundary/trigger transitions.
    pub fn step(&mut self, dt: f32) -> StepEvents {
        let mut events = StepEvents::default();
        let floor = self.cup_max.y;

        for (id, body) in self.bodies.iter_mut().enumerate() {
            if !body.enabled {
                continue;
            }

            body.velocity.y += GRAVITY * dt;
            body.position += body.velocity * dt;

            // Bits come to rest on the cup floor.
            if body.position.x >= self.cup_min.x
                && body.position.x <= self.cup_max.x
                && body.position.y >= floor
            {
                body.position.y = floor;
                body.velocity *= FLOOR_DAMPING;
                if body.velocity.length() < REST_SPEED {
                    body.velocity = Vec2::ZERO;
                }
            }

            let inside_bounds = body.position.x >= self.bounds_min.x
                && body.position.x <= self.bounds_max.x
                && body.position.y >= self.bounds_min.y
                && body.position.y <= self.bounds_max.y;
            if !inside_bounds {
                events.exited.push(id);
                continue;
            }

            let in_trigger = body.position.y >= self.trigger_y
                && body.position.x >= self.cup_min.x
                && body.position.x <= self.cup_max.x;
            if in_trigger && !body.in_trigger {
                events.trigger_entries.push(id);
            }
            body.in_trigger = in_trigger;
        }

        events
    }

    /// Speeds of everything in the cup, for the trigger density gate.
    pub fn cup_speeds(&self) -> Vec<f32> {
        self.cup_overlaps()
            .into_iter()
            .map(|id| self.bodies[id].velocity.length())
            .collect()
    }
}

impl SimBackend for DemoBackend {
    fn place(&mut self, body: BodyId, position: Vec2) {
        let b = &mut self.bodies[body];
        b.position = position;
        b.in_trigger = false;
    }

    fn set_linear_velocity(&mut self, body: BodyId, velocity: Vec2) {
        self.bodies[body].velocity = velocity;
    }

    fn set_angular_velocity(&mut self, body: BodyId, velocity: f32) {
        self.bodies[body].spin = velocity;
    }

    fn set_mass(&mut self, body: BodyId, mass: f32) {
        self.bodies[body].mass = mass;
    }

    fn set_collision_tier(&mut self, body: BodyId, denom: Denomination) {
        self.bodies[body].tier = denom;
    }

    fn set_enabled(&mut self, body: BodyId, enabled: bool) {
        self.bodies[body].enabled = enabled;
    }

    fn set_texture(&mut self, body: BodyId, _denom: Denomination, override_id: Option<&str>) {
        let b = &mut self.bodies[body];
        b.texture = override_id.map(str::to_owned);
        b.visible = true;
    }

    fn hide(&mut self, body: BodyId) {
        self.bodies[body].visible = false;
    }

    fn position(&self, body: BodyId) -> Vec2 {
        self.bodies[body].position
    }

    fn linear_velocity(&self, body: BodyId) -> Vec2 {
        self.bodies[body].velocity
    }

    fn apply_impulse(&mut self, body: BodyId, impulse: Vec2) {
        let b = &mut self.bodies[body];
        if b.mass > 0.0 {
            b.velocity += impulse / b.mass;
        }
    }

    fn cup_overlaps(&self) -> Vec<BodyId> {
        self.bodies
            .iter()
            .enumerate()
            .filter(|(_, b)| b.enabled && self.in_cup(b.position))
            .map(|(id, _)| id)
            .collect()
    }
}
