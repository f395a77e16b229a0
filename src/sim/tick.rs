//! Fixed timestep simulation loop
//!
//! `Session` owns the physics world and every piece of core state. Input is
//! applied synchronously as it arrives; `tick` advances one fixed step:
//! physics, tunneling clamp, merges, overflow check.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::danger::{DangerMonitor, DangerSignal, DangerState, is_overflowing};
use super::launcher::{LauncherController, LauncherState};
use super::merge::{ItemContact, ItemPair, MergeResolver};
use super::spawn::SpawnQueue;
use super::state::{GameEvent, Item, ItemView, SessionState, Snapshot};
use super::tier::{TierCatalog, TierError};
use super::world::{
    BodyId, BodyLabel, CircleBodyDesc, CollisionGroup, ContactBody, PhysicsWorld, WallSide,
};
use crate::config::{ConfigError, GameConfig};

/// Pointer events delivered by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    /// Drag start at a play-surface position
    Down(Vec2),
    Move(Vec2),
    /// Release: fire if aiming
    Up,
    /// Pointer left the play surface
    Leave,
}

/// One game session over a physics world
pub struct Session<W: PhysicsWorld> {
    config: GameConfig,
    tiers: TierCatalog,
    world: W,
    /// Typed side table: body id -> item tag
    items: BTreeMap<BodyId, Item>,
    queue: SpawnQueue,
    launcher: LauncherController,
    danger: DangerMonitor,
    state: SessionState,
    tick: u64,
    rng: Pcg32,
    events: Vec<GameEvent>,
}

impl<W: PhysicsWorld> Session<W> {
    /// Start a session; an inconsistent config refuses to run
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let tiers = config.tier_catalog()?;
        Ok(Self::build(config, tiers, seed))
    }

    fn build(config: GameConfig, tiers: TierCatalog, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let queue = SpawnQueue::new(rng.random(), config.spawn_tier_count);
        let launcher = LauncherController::new(
            config.launch_origin(),
            config.launcher,
            config.screen_width_factor(),
        );
        let danger = DangerMonitor::new(config.grace_ticks());
        let world = W::with_boundaries(&config.boundaries());

        log::info!(
            "Session started (seed {seed}, area {}x{}, next tier {})",
            config.area.width,
            config.area.height,
            queue.peek()
        );

        let events = vec![GameEvent::NextTier { tier: queue.peek() }];
        Self {
            config,
            tiers,
            world,
            items: BTreeMap::new(),
            queue,
            launcher,
            danger,
            state: SessionState::default(),
            tick: 0,
            rng,
            events,
        }
    }

    /// Throw everything away and start over with a fresh world
    pub fn restart(&mut self) {
        let seed = self.rng.random();
        *self = Self::build(self.config.clone(), self.tiers.clone(), seed);
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn tiers(&self) -> &TierCatalog {
        &self.tiers
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn launcher_state(&self) -> LauncherState {
        self.launcher.state()
    }

    pub fn danger_state(&self) -> DangerState {
        self.danger.state()
    }

    pub fn queue(&self) -> &SpawnQueue {
        &self.queue
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn item(&self, id: BodyId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    /// Take the notifications raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Can a drag start right now?
    pub fn can_fire(&self) -> bool {
        !self.state.game_over && !self.queue.is_locked()
    }

    /// Apply one pointer event; invalid transitions are ignored
    pub fn handle_pointer(&mut self, input: PointerInput, now_ms: f64) -> Option<BodyId> {
        self.poll_cooldown(now_ms);
        match input {
            PointerInput::Down(pointer) => {
                let can_fire = self.can_fire();
                self.launcher.begin_drag(pointer, can_fire);
                None
            }
            PointerInput::Move(pointer) => {
                self.launcher.pointer_moved(pointer);
                None
            }
            PointerInput::Up => self.fire(now_ms),
            PointerInput::Leave => {
                self.launcher.abandon();
                None
            }
        }
    }

    /// Release the drag and launch the on-deck item
    fn fire(&mut self, now_ms: f64) -> Option<BodyId> {
        if !self.launcher.is_aiming() {
            return None;
        }
        if !self.can_fire() {
            self.launcher.abandon();
            return None;
        }
        let shot = self.launcher.release()?;
        let tier = self.queue.peek();
        let origin = self.launcher.origin();
        let id = match self.create_item(tier, origin, None, true) {
            Ok(id) => id,
            Err(e) => {
                log::error!("Cannot launch tier {tier}: {e}");
                return None;
            }
        };
        self.world.set_velocity(id, shot.velocity);
        self.queue.lock(now_ms + self.config.launcher.cooldown_ms);

        log::debug!(
            "Shot fired: tier {tier}, angle {:.3}, power {:.2}",
            shot.aim_angle,
            shot.power
        );
        self.events.push(GameEvent::ShotFired {
            tier,
            angle: shot.aim_angle,
            power: shot.power,
        });
        Some(id)
    }

    /// Place a resting item (scenario setup); refused once the game is over
    pub fn place_item(&mut self, tier: usize, position: Vec2) -> Result<Option<BodyId>, TierError> {
        if self.state.game_over {
            return Ok(None);
        }
        self.create_item(tier, position, None, false).map(Some)
    }

    fn create_item(
        &mut self,
        tier: usize,
        position: Vec2,
        created_at_tick: Option<u64>,
        is_projectile: bool,
    ) -> Result<BodyId, TierError> {
        let def = self.tiers.tier_at(tier)?;
        let desc = CircleBodyDesc {
            position,
            radius: def.radius,
            mass: def.mass,
            restitution: def.restitution,
            friction: self.config.physics.friction,
            friction_air: self.config.physics.friction_air,
            group: CollisionGroup::ITEM,
        };
        let body = self.world.create_circle_body(&desc);
        self.items.insert(
            body,
            Item {
                body,
                tier,
                created_at_tick,
                is_projectile,
            },
        );
        Ok(body)
    }

    fn poll_cooldown(&mut self, now_ms: f64) {
        if self.state.game_over {
            return;
        }
        if let Some(tier) = self.queue.poll(now_ms) {
            log::debug!("Queue advanced: next tier {tier}");
            self.events.push(GameEvent::NextTier { tier });
        }
    }

    /// Advance the simulation by one fixed step
    pub fn tick(&mut self, now_ms: f64) {
        if self.state.game_over {
            return;
        }
        self.poll_cooldown(now_ms);
        self.tick += 1;

        self.world.step_simulation(self.config.physics.step_ms);
        self.clamp_tunneled();
        self.resolve_collisions();
        self.check_overflow();
    }

    /// Force items that slipped through the top wall back inside
    fn clamp_tunneled(&mut self) {
        let limit = self.config.safe_top_limit();
        for body in self.world.all_bodies() {
            if !self.items.contains_key(&body.id) || body.position.y >= limit {
                continue;
            }
            log::warn!(
                "Body {:?} tunneled past the top wall at ({:.1}, {:.1}); clamping",
                body.id,
                body.position.x,
                body.position.y
            );
            self.world.set_position(body.id, Vec2::new(body.position.x, limit));
            if body.velocity.y < 0.0 {
                self.world.set_velocity(
                    body.id,
                    Vec2::new(body.velocity.x, body.velocity.y.abs() * 0.5),
                );
            }
        }
    }

    fn item_contact(&self, contact: &ContactBody) -> Option<ItemContact> {
        if contact.label != BodyLabel::Item {
            return None;
        }
        self.items.get(&contact.id).map(|item| ItemContact {
            id: contact.id,
            tier: item.tier,
            position: contact.position,
            velocity: contact.velocity,
        })
    }

    fn resolve_collisions(&mut self) {
        let pairs = self.world.drain_collisions();
        let audio = self.config.audio;
        let mut item_pairs = Vec::with_capacity(pairs.len());

        for pair in &pairs {
            match (self.item_contact(&pair.a), self.item_contact(&pair.b)) {
                (Some(a), Some(b)) => item_pairs.push(ItemPair { a, b }),
                (Some(item), None) | (None, Some(item)) => {
                    let other = if pair.a.id == item.id { &pair.b } else { &pair.a };
                    let top_wall = other.label == BodyLabel::Wall(WallSide::Top);
                    if top_wall && item.velocity.length() > audio.impact_threshold {
                        self.events.push(GameEvent::Impact {
                            intensity: audio.top_wall_volume,
                        });
                    }
                }
                // Stale ids from bodies removed earlier
                (None, None) => {}
            }
        }

        let resolver = MergeResolver::new(&self.tiers, self.config.merge, audio);
        let outcome = resolver.resolve(&item_pairs, &mut self.rng);
        self.state.score += outcome.score_delta();

        for merge in &outcome.merges {
            for id in merge.consumed {
                self.world.remove_body(id);
                self.items.remove(&id);
            }
            match self.create_item(merge.tier, merge.position, Some(self.tick), false) {
                Ok(id) => self.world.set_velocity(id, merge.velocity),
                Err(e) => log::error!("Merge produced an invalid tier: {e}"),
            }
            log::debug!(
                "Merged into tier {} at ({:.1}, {:.1}), +{} (score {})",
                merge.tier,
                merge.position.x,
                merge.position.y,
                merge.score,
                self.state.score
            );
            self.events.push(GameEvent::Merged {
                tier: merge.tier,
                position: merge.position,
                score: merge.score,
            });
        }

        for intensity in outcome.impacts {
            self.events.push(GameEvent::Impact { intensity });
        }
    }

    fn check_overflow(&mut self) {
        let settle_speed = self.config.danger.settle_speed;
        let bodies = self.world.all_bodies();

        for body in &bodies {
            if let Some(item) = self.items.get_mut(&body.id) {
                if item.is_projectile && body.speed < settle_speed {
                    item.is_projectile = false;
                }
            }
        }

        let overflowing = is_overflowing(
            bodies
                .iter()
                .filter(|b| self.items.contains_key(&b.id))
                .map(|b| (b.position, b.speed)),
            self.config.fill_line_y(),
            settle_speed,
        );

        match self.danger.evaluate(overflowing, self.tick) {
            DangerSignal::Entered => {
                log::debug!("Overflow warning at tick {}", self.tick);
                self.events.push(GameEvent::DangerStarted);
            }
            DangerSignal::Cleared => {
                log::debug!("Overflow cleared at tick {}", self.tick);
                self.events.push(GameEvent::DangerCleared);
            }
            DangerSignal::GameOver => {
                self.state.game_over = true;
                self.launcher.abandon();
                log::info!(
                    "Game over at tick {} with score {}",
                    self.tick,
                    self.state.score
                );
                self.events.push(GameEvent::GameOver {
                    score: self.state.score,
                });
            }
            DangerSignal::Safe | DangerSignal::Warning => {}
        }
    }

    /// Read-only view for presentation and audio
    pub fn snapshot(&self) -> Snapshot {
        let items = self
            .world
            .all_bodies()
            .into_iter()
            .filter_map(|body| {
                self.items.get(&body.id).map(|item| ItemView {
                    id: body.id,
                    position: body.position,
                    angle: body.angle,
                    tier: item.tier,
                    created_at_tick: item.created_at_tick,
                    is_projectile: item.is_projectile,
                })
            })
            .collect();
        let danger = self.danger.state();
        Snapshot {
            tick: self.tick,
            items,
            score: self.state.score,
            game_over: self.state.game_over,
            launcher: self.launcher.state(),
            danger,
            is_warning: danger.is_warning(),
            next_tier: self.queue.peek(),
            ready: !self.queue.is_locked(),
        }
    }
}
