//! Physics world contract
//!
//! The rigid-body engine is an external collaborator. The simulation loop owns
//! exactly one world, drives it through this trait, and never lets any other
//! component mutate it directly.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Engine-assigned body handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// Collision categories (bit flags)
pub mod category {
    pub const ITEM: u32 = 0x0002;
    pub const WALL: u32 = 0x0004;
    pub const SENSOR: u32 = 0x0008;
}

/// Category/mask pair deciding which bodies may touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionGroup {
    pub category: u32,
    pub mask: u32,
}

impl CollisionGroup {
    /// Items collide with walls and with each other
    pub const ITEM: Self = Self {
        category: category::ITEM,
        mask: category::WALL | category::ITEM,
    };
    /// Walls only ever collide with items
    pub const WALL: Self = Self {
        category: category::WALL,
        mask: category::ITEM,
    };
    /// Sensors are never part of a physical contact
    pub const SENSOR: Self = Self {
        category: category::SENSOR,
        mask: 0,
    };

    #[inline]
    pub fn interacts(&self, other: &CollisionGroup) -> bool {
        (self.mask & other.category) != 0 && (other.mask & self.category) != 0
    }
}

/// Which static boundary a wall body is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallSide {
    Top,
    Bottom,
    Left,
    Right,
}

/// Engine-side label for a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyLabel {
    Item,
    Wall(WallSide),
}

/// Static boundary layout, fixed at world creation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundaries {
    /// Inner edge of the top wall
    pub top: f32,
    /// Inner edge of the bottom wall
    pub bottom: f32,
    /// Inner edge of the left wall
    pub left: f32,
    /// Inner edge of the right wall
    pub right: f32,
    pub wall_restitution: f32,
    pub wall_friction: f32,
    /// Gravity acceleration in pixels per ms squared
    pub gravity: Vec2,
}

/// Parameters for a new circular body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleBodyDesc {
    pub position: Vec2,
    pub radius: f32,
    pub mass: f32,
    pub restitution: f32,
    pub friction: f32,
    pub friction_air: f32,
    pub group: CollisionGroup,
}

/// Read-only view of one body after a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub id: BodyId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub angle: f32,
    pub speed: f32,
    pub label: BodyLabel,
}

/// One side of a collision-start pair, captured at contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactBody {
    pub id: BodyId,
    pub label: BodyLabel,
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Immutable collision-start record from one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionPair {
    pub a: ContactBody,
    pub b: ContactBody,
}

/// Contract the simulation loop consumes from the rigid-body engine
pub trait PhysicsWorld {
    /// Build a fresh world with its static walls already in place
    fn with_boundaries(bounds: &Boundaries) -> Self
    where
        Self: Sized;

    fn create_circle_body(&mut self, desc: &CircleBodyDesc) -> BodyId;

    /// Removing an unknown id is a no-op
    fn remove_body(&mut self, id: BodyId);

    fn set_velocity(&mut self, id: BodyId, velocity: Vec2);

    fn set_position(&mut self, id: BodyId, position: Vec2);

    /// All dynamic and static bodies, in stable id order
    fn all_bodies(&self) -> Vec<BodySnapshot>;

    fn step_simulation(&mut self, dt_ms: f32);

    /// Collision-start pairs buffered since the last drain
    fn drain_collisions(&mut self) -> Vec<CollisionPair>;
}
