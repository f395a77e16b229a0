//! Dessert Drop - a merge arcade game simulation core
//!
//! Core modules:
//! - `sim`: Game simulation (tiers, launcher, merging, overflow detection, tick loop)
//! - `physics`: Reference rigid-body world implementing the `sim::PhysicsWorld` contract
//! - `config`: Data-driven game tuning

pub mod config;
pub mod physics;
pub mod sim;

pub use config::{ConfigError, GameConfig};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz)
    pub const SIM_DT_MS: f32 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Straight up in screen space (y grows downward)
    pub const AIM_UP: f32 = -std::f32::consts::FRAC_PI_2;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(PI) + PI).abs() < 1e-6);
        assert!((normalize_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-5);
        assert!((normalize_angle(-0.5) + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_polar_straight_up_is_negative_y() {
        let v = polar_to_cartesian(10.0, consts::AIM_UP);
        assert!(v.x.abs() < 1e-5);
        assert!((v.y + 10.0).abs() < 1e-5);
    }
}
