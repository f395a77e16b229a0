//! Scripted physics world for tests
//!
//! Bodies move by their velocity only (no gravity, no contact response) and
//! collisions happen exactly when a test injects them.

use std::collections::BTreeMap;

use glam::Vec2;

use super::world::{
    BodyId, BodyLabel, BodySnapshot, Boundaries, CircleBodyDesc, CollisionPair, ContactBody,
    PhysicsWorld, WallSide,
};

#[derive(Debug, Clone)]
pub struct ScriptedBody {
    pub position: Vec2,
    pub velocity: Vec2,
    pub label: BodyLabel,
}

#[derive(Debug, Default)]
pub struct ScriptedWorld {
    pub bodies: BTreeMap<BodyId, ScriptedBody>,
    /// Pairs delivered on the next step
    scheduled: Vec<(BodyId, BodyId)>,
    pending: Vec<CollisionPair>,
    pub steps: u64,
    next_id: u32,
}

impl ScriptedWorld {
    /// Deliver a collision-start for these bodies on the next step
    pub fn inject_contact(&mut self, a: BodyId, b: BodyId) {
        self.scheduled.push((a, b));
    }

    pub fn wall(&self, side: WallSide) -> BodyId {
        self.bodies
            .iter()
            .find(|(_, b)| b.label == BodyLabel::Wall(side))
            .map(|(id, _)| *id)
            .unwrap()
    }

    pub fn body(&self, id: BodyId) -> Option<&ScriptedBody> {
        self.bodies.get(&id)
    }

    fn contact(&self, id: BodyId) -> Option<ContactBody> {
        self.bodies.get(&id).map(|b| ContactBody {
            id,
            label: b.label,
            position: b.position,
            velocity: b.velocity,
        })
    }

    fn insert(&mut self, body: ScriptedBody) -> BodyId {
        self.next_id += 1;
        let id = BodyId(self.next_id);
        self.bodies.insert(id, body);
        id
    }
}

impl PhysicsWorld for ScriptedWorld {
    fn with_boundaries(bounds: &Boundaries) -> Self {
        let mut world = Self::default();
        let walls = [
            (WallSide::Top, Vec2::new(0.0, bounds.top)),
            (WallSide::Bottom, Vec2::new(0.0, bounds.bottom)),
            (WallSide::Left, Vec2::new(bounds.left, 0.0)),
            (WallSide::Right, Vec2::new(bounds.right, 0.0)),
        ];
        for (side, position) in walls {
            world.insert(ScriptedBody {
                position,
                velocity: Vec2::ZERO,
                label: BodyLabel::Wall(side),
            });
        }
        world
    }

    fn create_circle_body(&mut self, desc: &CircleBodyDesc) -> BodyId {
        self.insert(ScriptedBody {
            position: desc.position,
            velocity: Vec2::ZERO,
            label: BodyLabel::Item,
        })
    }

    fn remove_body(&mut self, id: BodyId) {
        self.bodies.remove(&id);
    }

    fn set_velocity(&mut self, id: BodyId, velocity: Vec2) {
        if let Some(b) = self.bodies.get_mut(&id) {
            b.velocity = velocity;
        }
    }

    fn set_position(&mut self, id: BodyId, position: Vec2) {
        if let Some(b) = self.bodies.get_mut(&id) {
            b.position = position;
        }
    }

    fn all_bodies(&self) -> Vec<BodySnapshot> {
        self.bodies
            .iter()
            .map(|(&id, b)| BodySnapshot {
                id,
                position: b.position,
                velocity: b.velocity,
                angle: 0.0,
                speed: b.velocity.length(),
                label: b.label,
            })
            .collect()
    }

    fn step_simulation(&mut self, _dt_ms: f32) {
        self.steps += 1;
        for b in self.bodies.values_mut() {
            if b.label == BodyLabel::Item {
                b.position += b.velocity;
            }
        }
        // Stale ids are delivered too; the loop must cope with them
        for (a, b) in std::mem::take(&mut self.scheduled) {
            let contact_a = self.contact(a).unwrap_or(ContactBody {
                id: a,
                label: BodyLabel::Item,
                position: Vec2::ZERO,
                velocity: Vec2::ZERO,
            });
            let contact_b = self.contact(b).unwrap_or(ContactBody {
                id: b,
                label: BodyLabel::Item,
                position: Vec2::ZERO,
                velocity: Vec2::ZERO,
            });
            self.pending.push(CollisionPair {
                a: contact_a,
                b: contact_b,
            });
        }
    }

    fn drain_collisions(&mut self) -> Vec<CollisionPair> {
        std::mem::take(&mut self.pending)
    }
}
