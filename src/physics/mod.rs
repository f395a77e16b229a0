//! Reference rigid-body world
//!
//! A small circle-only engine that honors the `PhysicsWorld` contract:
//! static half-plane walls, gravity, air friction, restitution impulses,
//! simple tangential friction and buffered collision-start reporting. Good
//! enough to run a session headlessly and exercise the core end to end.

pub mod collision;

use std::collections::HashSet;

use glam::Vec2;

use crate::sim::world::{
    BodyId, BodyLabel, BodySnapshot, Boundaries, CircleBodyDesc, CollisionGroup, CollisionPair,
    ContactBody, PhysicsWorld, WallSide,
};
use collision::{HalfPlane, bounce_velocity, circle_circle_collision, circle_wall_collision};

/// Separation passes per step
pub const POSITION_ITERATIONS: usize = 6;
/// Gap still counted as "touching" for collision-start bookkeeping
pub const CONTACT_SLOP: f32 = 0.5;

#[derive(Debug, Clone)]
struct Wall {
    id: BodyId,
    side: WallSide,
    plane: HalfPlane,
}

#[derive(Debug, Clone)]
struct Circle {
    id: BodyId,
    position: Vec2,
    velocity: Vec2,
    angle: f32,
    angular_velocity: f32,
    radius: f32,
    inverse_mass: f32,
    restitution: f32,
    friction: f32,
    friction_air: f32,
    group: CollisionGroup,
}

impl Circle {
    fn contact(&self) -> ContactBody {
        ContactBody {
            id: self.id,
            label: BodyLabel::Item,
            position: self.position,
            velocity: self.velocity,
        }
    }
}

/// Unordered pair key
fn pair_key(a: BodyId, b: BodyId) -> (BodyId, BodyId) {
    if a <= b { (a, b) } else { (b, a) }
}

#[derive(Debug, Clone)]
pub struct ArenaWorld {
    bounds: Boundaries,
    walls: Vec<Wall>,
    /// Dynamic bodies, kept sorted by id
    circles: Vec<Circle>,
    /// Pairs touching at the end of the previous step
    touching: HashSet<(BodyId, BodyId)>,
    pending: Vec<CollisionPair>,
    next_id: u32,
}

impl ArenaWorld {
    fn allocate_id(&mut self) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        id
    }

    fn circle_mut(&mut self, id: BodyId) -> Option<&mut Circle> {
        self.circles
            .binary_search_by_key(&id, |c| c.id)
            .ok()
            .map(|i| &mut self.circles[i])
    }

    pub fn body_count(&self) -> usize {
        self.circles.len()
    }

    fn wall_contact(wall: &Wall) -> ContactBody {
        ContactBody {
            id: wall.id,
            label: BodyLabel::Wall(wall.side),
            position: wall.plane.normal * wall.plane.offset,
            velocity: Vec2::ZERO,
        }
    }

    fn integrate(&mut self, dt_ms: f32) {
        let gravity = self.bounds.gravity * dt_ms * dt_ms;
        for c in &mut self.circles {
            if c.inverse_mass == 0.0 {
                continue;
            }
            c.velocity += gravity;
            c.velocity *= 1.0 - c.friction_air;
            c.position += c.velocity;
            c.angular_velocity *= 1.0 - c.friction_air;
            c.angle += c.angular_velocity;
        }
    }

    fn solve_circle_pairs(&mut self, touching: &mut HashSet<(BodyId, BodyId)>) {
        let count = self.circles.len();
        for i in 0..count {
            for j in (i + 1)..count {
                let (left, right) = self.circles.split_at_mut(j);
                let a = &mut left[i];
                let b = &mut right[0];
                if !a.group.interacts(&b.group) {
                    continue;
                }

                let result = circle_circle_collision(a.position, a.radius, b.position, b.radius);
                if result.touching(CONTACT_SLOP) {
                    touching.insert(pair_key(a.id, b.id));
                }
                if !result.hit {
                    continue;
                }

                let inv_sum = a.inverse_mass + b.inverse_mass;
                if inv_sum == 0.0 {
                    continue;
                }
                let normal = result.normal;
                a.position += normal * result.penetration * (a.inverse_mass / inv_sum);
                b.position -= normal * result.penetration * (b.inverse_mass / inv_sum);

                let relative = a.velocity - b.velocity;
                let vn = relative.dot(normal);
                if vn >= 0.0 {
                    continue;
                }
                let restitution = a.restitution.max(b.restitution);
                let impulse = -(1.0 + restitution) * vn / inv_sum;
                a.velocity += normal * impulse * a.inverse_mass;
                b.velocity -= normal * impulse * b.inverse_mass;

                // Coulomb-ish tangential friction, bounded by the normal impulse
                let tangent = normal.perp();
                let vt = relative.dot(tangent);
                let friction = (a.friction * b.friction).sqrt();
                let jt = (-vt / inv_sum).clamp(-impulse * friction, impulse * friction);
                a.velocity += tangent * jt * a.inverse_mass;
                b.velocity -= tangent * jt * b.inverse_mass;
                a.angular_velocity -= jt * a.inverse_mass / a.radius;
                b.angular_velocity -= jt * b.inverse_mass / b.radius;
            }
        }
    }

    fn solve_walls(&mut self, touching: &mut HashSet<(BodyId, BodyId)>) {
        let wall_group = CollisionGroup::WALL;
        let wall_restitution = self.bounds.wall_restitution;
        let wall_friction = self.bounds.wall_friction;
        for c in &mut self.circles {
            if !c.group.interacts(&wall_group) {
                continue;
            }
            for wall in &self.walls {
                let result = circle_wall_collision(c.position, c.radius, &wall.plane);
                if result.touching(CONTACT_SLOP) {
                    touching.insert(pair_key(wall.id, c.id));
                }
                if !result.hit {
                    continue;
                }
                c.position += result.normal * result.penetration;
                if c.velocity.dot(result.normal) < 0.0 {
                    let restitution = c.restitution.max(wall_restitution);
                    let bounced = bounce_velocity(c.velocity, result.normal, restitution);
                    let tangent = result.normal.perp();
                    let vt = bounced.dot(tangent);
                    c.velocity = bounced - tangent * vt * wall_friction;
                    c.angular_velocity += vt * wall_friction / c.radius;
                }
            }
        }
    }

    /// Queue collision-start records for pairs that were not touching last step
    fn report_new_contacts(&mut self, touching: HashSet<(BodyId, BodyId)>) {
        let mut started: Vec<_> = touching.difference(&self.touching).copied().collect();
        started.sort();
        for (first, second) in started {
            let a = self.contact_for(first);
            let b = self.contact_for(second);
            if let (Some(a), Some(b)) = (a, b) {
                self.pending.push(CollisionPair { a, b });
            }
        }
        self.touching = touching;
    }

    fn contact_for(&self, id: BodyId) -> Option<ContactBody> {
        if let Some(wall) = self.walls.iter().find(|w| w.id == id) {
            return Some(Self::wall_contact(wall));
        }
        self.circles
            .binary_search_by_key(&id, |c| c.id)
            .ok()
            .map(|i| self.circles[i].contact())
    }
}

impl PhysicsWorld for ArenaWorld {
    fn with_boundaries(bounds: &Boundaries) -> Self {
        let mut world = Self {
            bounds: *bounds,
            walls: Vec::with_capacity(4),
            circles: Vec::new(),
            touching: HashSet::new(),
            pending: Vec::new(),
            next_id: 1,
        };
        let planes = [
            (WallSide::Top, HalfPlane::new(Vec2::Y, bounds.top)),
            (WallSide::Bottom, HalfPlane::new(Vec2::NEG_Y, -bounds.bottom)),
            (WallSide::Left, HalfPlane::new(Vec2::X, bounds.left)),
            (WallSide::Right, HalfPlane::new(Vec2::NEG_X, -bounds.right)),
        ];
        for (side, plane) in planes {
            let id = world.allocate_id();
            world.walls.push(Wall { id, side, plane });
        }
        world
    }

    fn create_circle_body(&mut self, desc: &CircleBodyDesc) -> BodyId {
        let id = self.allocate_id();
        let inverse_mass = if desc.mass > 0.0 { 1.0 / desc.mass } else { 0.0 };
        // Ids only grow, so pushing keeps the list sorted
        self.circles.push(Circle {
            id,
            position: desc.position,
            velocity: Vec2::ZERO,
            angle: 0.0,
            angular_velocity: 0.0,
            radius: desc.radius,
            inverse_mass,
            restitution: desc.restitution,
            friction: desc.friction,
            friction_air: desc.friction_air,
            group: desc.group,
        });
        id
    }

    fn remove_body(&mut self, id: BodyId) {
        if let Ok(i) = self.circles.binary_search_by_key(&id, |c| c.id) {
            self.circles.remove(i);
            self.touching.retain(|&(a, b)| a != id && b != id);
        }
    }

    fn set_velocity(&mut self, id: BodyId, velocity: Vec2) {
        if let Some(c) = self.circle_mut(id) {
            c.velocity = velocity;
        }
    }

    fn set_position(&mut self, id: BodyId, position: Vec2) {
        if let Some(c) = self.circle_mut(id) {
            c.position = position;
        }
    }

    fn all_bodies(&self) -> Vec<BodySnapshot> {
        let walls = self.walls.iter().map(|w| BodySnapshot {
            id: w.id,
            position: w.plane.normal * w.plane.offset,
            velocity: Vec2::ZERO,
            angle: 0.0,
            speed: 0.0,
            label: BodyLabel::Wall(w.side),
        });
        let circles = self.circles.iter().map(|c| BodySnapshot {
            id: c.id,
            position: c.position,
            velocity: c.velocity,
            angle: c.angle,
            speed: c.velocity.length(),
            label: BodyLabel::Item,
        });
        walls.chain(circles).collect()
    }

    fn step_simulation(&mut self, dt_ms: f32) {
        self.integrate(dt_ms);
        let mut touching = HashSet::new();
        for _ in 0..POSITION_ITERATIONS {
            self.solve_circle_pairs(&mut touching);
            self.solve_walls(&mut touching);
        }
        self.report_new_contacts(touching);
    }

    fn drain_collisions(&mut self) -> Vec<CollisionPair> {
        std::mem::take(&mut self.pending)
    }
}
