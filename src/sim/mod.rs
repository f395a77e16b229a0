//! Game simulation module
//!
//! All gameplay logic lives here:
//! - Fixed timestep only; cooldowns and grace windows are polled state
//! - Seeded RNG only
//! - Stable iteration order (by body ID)
//! - No rendering, audio or platform dependencies
//! - The rigid-body engine sits behind the `PhysicsWorld` trait

pub mod danger;
pub mod launcher;
pub mod merge;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod tier;
pub mod world;

#[cfg(test)]
pub(crate) mod scripted;

pub use danger::{DangerMonitor, DangerSignal, DangerState, is_overflowing};
pub use launcher::{LauncherController, LauncherState, Shot};
pub use merge::{ItemContact, ItemPair, Merge, MergeOutcome, MergeResolver};
pub use spawn::SpawnQueue;
pub use state::{GameEvent, Item, ItemView, SessionState, Snapshot};
pub use tick::{PointerInput, Session};
pub use tier::{Tier, TierCatalog, TierError, dessert_tiers};
pub use world::{
    BodyId, BodyLabel, BodySnapshot, Boundaries, CircleBodyDesc, CollisionGroup, CollisionPair,
    ContactBody, PhysicsWorld, WallSide,
};
