//! Game tuning and configuration
//!
//! Everything the simulation needs to agree on (play area layout, physics
//! constants, launcher feel, overflow timing, tier table) lives here. The
//! defaults are the reference tuning; a JSON file may override any section.

use std::fmt;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::SIM_DT_MS;
use crate::sim::tier::{Tier, TierCatalog, TierError, dessert_tiers};
use crate::sim::world::Boundaries;

/// Play surface layout (screen space, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaConfig {
    pub width: f32,
    pub height: f32,
    /// Height of the top border; the top wall's inner edge sits here
    pub top_boundary_offset: f32,
    /// Extra margin below the top wall used by the tunneling clamp
    pub clamp_margin: f32,
    /// Launcher distance from the bottom edge
    pub launcher_offset: f32,
    /// Fill line distance from the bottom edge
    pub fill_line_offset: f32,
    /// How far below the visible bottom the bottom wall sits
    pub bottom_wall_slack: f32,
}

impl Default for AreaConfig {
    fn default() -> Self {
        Self {
            width: 450.0,
            height: 750.0,
            top_boundary_offset: 40.0,
            clamp_margin: 5.0,
            launcher_offset: 60.0,
            fill_line_offset: 150.0,
            bottom_wall_slack: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Vertical gravity; negative drifts items toward the top wall
    pub gravity_y: f32,
    pub gravity_scale: f32,
    pub friction: f32,
    pub friction_air: f32,
    pub wall_restitution: f32,
    pub wall_friction: f32,
    /// Fixed physics step in milliseconds
    pub step_ms: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity_y: -0.25,
            gravity_scale: 0.001,
            friction: 0.1,
            friction_air: 0.02,
            wall_restitution: 0.6,
            wall_friction: 0.1,
            step_ms: SIM_DT_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    pub base_speed: f32,
    /// Play areas wider than this get the wide-screen bonus
    pub wide_screen_threshold: f32,
    pub wide_screen_bonus: f32,
    pub min_power_multiplier: f32,
    pub max_power_multiplier: f32,
    /// Drag distance that maps to full power
    pub max_drag_distance: f32,
    /// Gap between the aim cone edges and horizontal (radians)
    pub cone_margin: f32,
    /// Real-time lock after each shot
    pub cooldown_ms: f64,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            base_speed: 10.0,
            wide_screen_threshold: 500.0,
            wide_screen_bonus: 1.2,
            min_power_multiplier: 0.6,
            max_power_multiplier: 1.5,
            max_drag_distance: 300.0,
            cone_margin: 0.1,
            cooldown_ms: 500.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Upward speed given to a freshly merged item
    pub upward_nudge: f32,
    /// Total width of the random horizontal jitter
    pub jitter_span: f32,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            upward_nudge: 4.0,
            jitter_span: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DangerConfig {
    /// Items slower than this count as settled
    pub settle_speed: f32,
    /// Continuous overflow needed before game over
    pub grace_ms: f32,
}

impl Default for DangerConfig {
    fn default() -> Self {
        Self {
            settle_speed: 0.2,
            grace_ms: 2000.0,
        }
    }
}

/// Cosmetic impact reporting thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub impact_threshold: f32,
    pub impact_volume_scale: f32,
    pub impact_volume_cap: f32,
    pub top_wall_volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            impact_threshold: 1.0,
            impact_volume_scale: 10.0,
            impact_volume_cap: 0.8,
            top_wall_volume: 0.3,
        }
    }
}

/// Complete game tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub area: AreaConfig,
    pub physics: PhysicsConfig,
    pub launcher: LauncherConfig,
    pub merge: MergeConfig,
    pub danger: DangerConfig,
    pub audio: AudioConfig,
    /// Launches draw uniformly from tiers `0..spawn_tier_count`
    pub spawn_tier_count: usize,
    pub tiers: Vec<Tier>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            area: AreaConfig::default(),
            physics: PhysicsConfig::default(),
            launcher: LauncherConfig::default(),
            merge: MergeConfig::default(),
            danger: DangerConfig::default(),
            audio: AudioConfig::default(),
            spawn_tier_count: 3,
            tiers: dessert_tiers(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Tier(TierError),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config: {e}"),
            Self::Parse(e) => write!(f, "failed to parse config: {e}"),
            Self::Tier(e) => write!(f, "invalid tier table: {e}"),
            Self::Invalid(what) => write!(f, "invalid config: {what}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Tier(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

impl From<TierError> for ConfigError {
    fn from(e: TierError) -> Self {
        Self::Tier(e)
    }
}

impl GameConfig {
    /// Parse and validate a JSON config; missing sections use defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Build the validated tier table
    pub fn tier_catalog(&self) -> Result<TierCatalog, TierError> {
        TierCatalog::new(self.tiers.clone())
    }

    /// Reject tuning the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let catalog = self.tier_catalog()?;
        if self.spawn_tier_count == 0 || self.spawn_tier_count > catalog.len() {
            return Err(ConfigError::Invalid("spawn_tier_count must be within the tier table"));
        }
        if self.physics.step_ms <= 0.0 {
            return Err(ConfigError::Invalid("physics.step_ms must be positive"));
        }
        if self.area.width <= 0.0 || self.area.height <= 0.0 {
            return Err(ConfigError::Invalid("area must have a positive size"));
        }
        if self.area.fill_line_offset <= self.area.launcher_offset {
            return Err(ConfigError::Invalid("fill line must sit above the launcher"));
        }
        let l = &self.launcher;
        if l.min_power_multiplier > l.max_power_multiplier {
            return Err(ConfigError::Invalid("launcher power multipliers are inverted"));
        }
        if l.max_drag_distance <= 0.0 {
            return Err(ConfigError::Invalid("launcher.max_drag_distance must be positive"));
        }
        if l.cone_margin < 0.0 || l.cone_margin >= std::f32::consts::FRAC_PI_2 {
            return Err(ConfigError::Invalid("launcher.cone_margin must leave an upward cone"));
        }
        if self.danger.grace_ms < 0.0 {
            return Err(ConfigError::Invalid("danger.grace_ms must not be negative"));
        }
        Ok(())
    }

    /// Fixed launcher position
    pub fn launch_origin(&self) -> Vec2 {
        Vec2::new(
            self.area.width / 2.0,
            self.area.height - self.area.launcher_offset,
        )
    }

    /// Items settled with a center below this y are overflowing
    pub fn fill_line_y(&self) -> f32 {
        self.area.height - self.area.fill_line_offset
    }

    /// Item centers above this y have tunneled through the top wall
    pub fn safe_top_limit(&self) -> f32 {
        self.area.top_boundary_offset + self.area.clamp_margin
    }

    /// Grace period expressed in whole ticks
    pub fn grace_ticks(&self) -> u64 {
        // Tolerance absorbs the f32 rounding of 1000/60
        let ticks = self.danger.grace_ms / self.physics.step_ms;
        (ticks - 1e-3).ceil().max(0.0) as u64
    }

    /// Shot speed bonus for wide play areas
    pub fn screen_width_factor(&self) -> f32 {
        if self.area.width > self.launcher.wide_screen_threshold {
            self.launcher.wide_screen_bonus
        } else {
            1.0
        }
    }

    /// Static walls handed to a fresh physics world
    pub fn boundaries(&self) -> Boundaries {
        Boundaries {
            top: self.area.top_boundary_offset,
            bottom: self.area.height + self.area.bottom_wall_slack,
            left: 0.0,
            right: self.area.width,
            wall_restitution: self.physics.wall_restitution,
            wall_friction: self.physics.wall_friction,
            gravity: Vec2::new(0.0, self.physics.gravity_y * self.physics.gravity_scale),
        }
    }
}
