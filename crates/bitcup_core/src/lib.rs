//! BitCup Engine Core
//!
//! Contains the bit lifecycle systems:
//! - Fixed-capacity slot pool and round-robin spawner
//! - Sparse/dense active-set index
//! - Throttled order queue and scheduler
//! - Explosion force propagation

pub mod active_set;
pub mod denom;
pub mod engine;
pub mod explosion;
pub mod order;
pub mod physics;
pub mod pool;
pub mod tuning;

pub use active_set::{ActiveEntry, ActiveSet};
pub use denom::{DenomTable, Denomination, DENOM_COUNT};
pub use engine::{BitEngine, BitRecord, OrderSender};
pub use explosion::{saturating_power_curve, should_trigger, PowerCurve};
pub use order::{BitOrder, OrderError, OrderKind, OrderScheduler, SpawnCommand};
pub use physics::{BodyId, NoOverrides, SimBackend, TextureResolver};
pub use pool::{SlotId, SlotPool};
pub use tuning::Tuning;

pub use glam;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
