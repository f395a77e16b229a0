//! Launcher: drag-to-aim, release-to-fire
//!
//! Pointer input mutates the launcher synchronously; the controller only
//! produces a `Shot`. Spawning the body, locking the queue and scheduling the
//! cooldown belong to the simulation loop.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::LauncherConfig;
use crate::consts::AIM_UP;
use crate::{normalize_angle, polar_to_cartesian};

/// Published launcher state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LauncherState {
    pub is_dragging: bool,
    /// Aim direction in screen space (straight up is -π/2)
    pub aim_angle: f32,
    /// Drag strength in [0, 1]
    pub power: f32,
}

impl Default for LauncherState {
    fn default() -> Self {
        Self {
            is_dragging: false,
            aim_angle: AIM_UP,
            power: 0.5,
        }
    }
}

/// A released shot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub aim_angle: f32,
    pub power: f32,
    pub velocity: Vec2,
}

#[derive(Debug, Clone)]
pub struct LauncherController {
    state: LauncherState,
    origin: Vec2,
    params: LauncherConfig,
    width_factor: f32,
}

impl LauncherController {
    pub fn new(origin: Vec2, params: LauncherConfig, width_factor: f32) -> Self {
        Self {
            state: LauncherState::default(),
            origin,
            params,
            width_factor,
        }
    }

    pub fn state(&self) -> LauncherState {
        self.state
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn is_aiming(&self) -> bool {
        self.state.is_dragging
    }

    /// Lower and upper edges of the upward aim cone
    pub fn cone(&self) -> (f32, f32) {
        (-PI + self.params.cone_margin, -self.params.cone_margin)
    }

    /// Idle -> Aiming; the caller decides whether firing is currently allowed
    pub fn begin_drag(&mut self, pointer: Vec2, can_fire: bool) -> bool {
        if !can_fire {
            return false;
        }
        self.state.is_dragging = true;
        self.pointer_moved(pointer);
        true
    }

    /// Recompute aim and power while aiming; ignored otherwise
    pub fn pointer_moved(&mut self, pointer: Vec2) {
        if !self.state.is_dragging {
            return;
        }
        let delta = pointer - self.origin;
        self.state.aim_angle = self.aim_angle_for(delta);
        self.state.power = self.power_for(delta.length());
    }

    /// Aiming -> Idle without a shot (pointer left the surface)
    pub fn abandon(&mut self) {
        self.state.is_dragging = false;
    }

    /// Aiming -> Idle, producing the shot
    pub fn release(&mut self) -> Option<Shot> {
        if !self.state.is_dragging {
            return None;
        }
        self.state.is_dragging = false;
        Some(Shot {
            aim_angle: self.state.aim_angle,
            power: self.state.power,
            velocity: self.launch_velocity(self.state.aim_angle, self.state.power),
        })
    }

    /// Map a pointer offset into the upward cone
    ///
    /// Offsets below the horizontal snap to the cone edge on their own side
    /// instead of jumping to straight up, so dragging across the horizontal
    /// axis keeps the aim continuous and never flips it to the other side.
    pub fn aim_angle_for(&self, delta: Vec2) -> f32 {
        let (min, max) = self.cone();
        if delta.length_squared() <= f32::EPSILON {
            return AIM_UP;
        }
        let raw = normalize_angle(delta.y.atan2(delta.x));
        if raw >= 0.0 {
            return if raw <= FRAC_PI_2 { max } else { min };
        }
        raw.clamp(min, max)
    }

    pub fn power_for(&self, distance: f32) -> f32 {
        (distance / self.params.max_drag_distance).clamp(0.0, 1.0)
    }

    pub fn launch_speed(&self, power: f32) -> f32 {
        let p = &self.params;
        let multiplier =
            p.min_power_multiplier + power * (p.max_power_multiplier - p.min_power_multiplier);
        p.base_speed * self.width_factor * multiplier
    }

    pub fn launch_velocity(&self, aim_angle: f32, power: f32) -> Vec2 {
        polar_to_cartesian(self.launch_speed(power), aim_angle)
    }
}
