//! Session state and published snapshot types

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::danger::DangerState;
use super::launcher::LauncherState;
use super::world::BodyId;

/// Core-side tag for an item body, kept in a side table keyed by body id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub body: BodyId,
    pub tier: usize,
    /// Tick the item popped into existence; `None` = no spawn animation
    pub created_at_tick: Option<u64>,
    /// Launched by the player and not yet settled
    pub is_projectile: bool,
}

/// Score and terminal flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub score: u64,
    pub game_over: bool,
}

/// Discrete notifications for presentation and audio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// The on-deck tier changed (also sent at session start)
    NextTier { tier: usize },
    ShotFired { tier: usize, angle: f32, power: f32 },
    Merged { tier: usize, position: Vec2, score: u64 },
    /// Non-merging contact fast enough to be audible
    Impact { intensity: f32 },
    DangerStarted,
    DangerCleared,
    GameOver { score: u64 },
}

/// One item as seen by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemView {
    pub id: BodyId,
    pub position: Vec2,
    pub angle: f32,
    pub tier: usize,
    pub created_at_tick: Option<u64>,
    pub is_projectile: bool,
}

/// Read-only per-tick snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub items: Vec<ItemView>,
    pub score: u64,
    pub game_over: bool,
    pub launcher: LauncherState,
    pub danger: DangerState,
    pub is_warning: bool,
    /// Tier waiting in the launcher
    pub next_tier: usize,
    /// False while the post-shot cooldown runs
    pub ready: bool,
}
