//! Contact geometry for circles against circles and straight walls

use glam::Vec2;

/// Result of a contact check
#[derive(Debug, Clone, Copy)]
pub struct CollisionResult {
    /// Whether the shapes overlap
    pub hit: bool,
    /// Contact point (on the surface being hit)
    pub point: Vec2,
    /// Surface normal pointing toward the circle being tested
    pub normal: Vec2,
    /// Overlap depth; negative values are the remaining gap
    pub penetration: f32,
}

impl CollisionResult {
    /// Within `slop` of touching (used for contact bookkeeping, not response)
    #[inline]
    pub fn touching(&self, slop: f32) -> bool {
        self.penetration > -slop
    }
}

/// A static wall: the play side satisfies `p·normal >= offset`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfPlane {
    pub normal: Vec2,
    pub offset: f32,
}

impl HalfPlane {
    pub fn new(normal: Vec2, offset: f32) -> Self {
        Self {
            normal: normal.normalize_or_zero(),
            offset,
        }
    }

    /// Signed distance from the wall surface (positive on the play side)
    #[inline]
    pub fn distance(&self, point: Vec2) -> f32 {
        point.dot(self.normal) - self.offset
    }
}

/// Circle A against circle B; the normal points from B toward A
pub fn circle_circle_collision(pos_a: Vec2, radius_a: f32, pos_b: Vec2, radius_b: f32) -> CollisionResult {
    let delta = pos_a - pos_b;
    let dist = delta.length();
    // Coincident centers: push straight up the screen
    let normal = if dist > 1e-6 { delta / dist } else { Vec2::NEG_Y };
    let penetration = radius_a + radius_b - dist;
    CollisionResult {
        hit: penetration > 0.0,
        point: pos_b + normal * radius_b,
        normal,
        penetration,
    }
}

/// Circle against a wall half-plane; the normal is the wall's inward normal
pub fn circle_wall_collision(pos: Vec2, radius: f32, wall: &HalfPlane) -> CollisionResult {
    let dist = wall.distance(pos);
    let penetration = radius - dist;
    CollisionResult {
        hit: penetration > 0.0,
        point: pos - wall.normal * dist,
        normal: wall.normal,
        penetration,
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Bounce off a surface, keeping `restitution` of the normal component
#[inline]
pub fn bounce_velocity(velocity: Vec2, normal: Vec2, restitution: f32) -> Vec2 {
    let vn = velocity.dot(normal);
    if vn >= 0.0 {
        return velocity;
    }
    let reflected = reflect_velocity(velocity, normal);
    // reflect flips the normal part at full strength; scale it back down
    reflected - normal * (-vn) * (1.0 - restitution)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_circle_overlap() {
        let r = circle_circle_collision(Vec2::new(30.0, 0.0), 20.0, Vec2::ZERO, 20.0);
        assert!(r.hit);
        assert!((r.penetration - 10.0).abs() < 1e-5);
        assert!((r.normal - Vec2::X).length() < 1e-6);
    }

    #[test]
    fn test_circle_circle_gap() {
        let r = circle_circle_collision(Vec2::new(50.0, 0.0), 20.0, Vec2::ZERO, 20.0);
        assert!(!r.hit);
        assert!(!r.touching(5.0));
        assert!(r.touching(11.0));
    }

    #[test]
    fn test_circle_top_wall() {
        // Top wall at y = 40, play area below it
        let wall = HalfPlane::new(Vec2::Y, 40.0);
        let r = circle_wall_collision(Vec2::new(100.0, 50.0), 22.0, &wall);
        assert!(r.hit);
        assert!((r.penetration - 12.0).abs() < 1e-5);
        assert_eq!(r.point, Vec2::new(100.0, 40.0));

        let r = circle_wall_collision(Vec2::new(100.0, 80.0), 22.0, &wall);
        assert!(!r.hit);
    }

    #[test]
    fn test_reflect_velocity() {
        // Ball moving right, hits vertical wall (normal pointing left)
        let velocity = Vec2::new(100.0, 0.0);
        let normal = Vec2::new(-1.0, 0.0);

        let reflected = reflect_velocity(velocity, normal);
        assert!((reflected.x - (-100.0)).abs() < 0.001);
        assert!(reflected.y.abs() < 0.001);
    }

    #[test]
    fn test_bounce_keeps_restitution_share() {
        let v = bounce_velocity(Vec2::new(3.0, -10.0), Vec2::Y, 0.5);
        assert!((v.y - 5.0).abs() < 1e-5);
        assert!((v.x - 3.0).abs() < 1e-5);

        // Already separating: untouched
        let v = bounce_velocity(Vec2::new(0.0, 4.0), Vec2::Y, 0.5);
        assert_eq!(v, Vec2::new(0.0, 4.0));
    }
}
