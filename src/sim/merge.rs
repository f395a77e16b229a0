//! Merge rule over one step's collision batch
//!
//! Planning only: the resolver never touches the physics world. It returns
//! what to remove, what to create and how much to score; the simulation loop
//! applies the plan after iteration over the batch has finished.

use std::collections::HashSet;

use glam::Vec2;
use rand::Rng;

use super::tier::TierCatalog;
use super::world::BodyId;
use crate::config::{AudioConfig, MergeConfig};

/// An item side of a collision, tagged with its tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemContact {
    pub id: BodyId,
    pub tier: usize,
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Item/item collision-start pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemPair {
    pub a: ItemContact,
    pub b: ItemContact,
}

/// One planned merge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Merge {
    /// Bodies to remove
    pub consumed: [BodyId; 2],
    /// Tier of the new item
    pub tier: usize,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Score awarded for this merge
    pub score: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    pub merges: Vec<Merge>,
    /// Cosmetic impact intensities (0..=1) for pairs that bounced
    pub impacts: Vec<f32>,
}

impl MergeOutcome {
    pub fn score_delta(&self) -> u64 {
        self.merges.iter().map(|m| m.score).sum()
    }
}

pub struct MergeResolver<'a> {
    tiers: &'a TierCatalog,
    merge: MergeConfig,
    audio: AudioConfig,
}

impl<'a> MergeResolver<'a> {
    pub fn new(tiers: &'a TierCatalog, merge: MergeConfig, audio: AudioConfig) -> Self {
        Self { tiers, merge, audio }
    }

    /// Does a same-tier contact between these items combine?
    #[inline]
    pub fn merges(&self, a: &ItemContact, b: &ItemContact) -> bool {
        a.id != b.id && a.tier == b.tier && a.tier < self.tiers.len() && !self.tiers.is_terminal(a.tier)
    }

    /// Resolve one batch; each id takes part in at most one merge
    pub fn resolve<R: Rng>(&self, pairs: &[ItemPair], rng: &mut R) -> MergeOutcome {
        let mut consumed: HashSet<BodyId> = HashSet::new();
        let mut outcome = MergeOutcome::default();

        for pair in pairs {
            let (a, b) = (&pair.a, &pair.b);
            if consumed.contains(&a.id) || consumed.contains(&b.id) {
                log::trace!("Dropping pair {:?}/{:?}: already consumed this batch", a.id, b.id);
                continue;
            }

            if !self.merges(a, b) {
                // Equal tiers that cannot combine stay silent
                if a.tier == b.tier {
                    continue;
                }
                let relative = (a.velocity.length() - b.velocity.length()).abs();
                if relative > self.audio.impact_threshold {
                    let volume = (relative / self.audio.impact_volume_scale)
                        .min(self.audio.impact_volume_cap);
                    outcome.impacts.push(volume);
                }
                continue;
            }

            let tier = a.tier + 1;
            let Ok(next) = self.tiers.tier_at(tier) else {
                continue;
            };

            consumed.insert(a.id);
            consumed.insert(b.id);

            // Jitter keeps the new item from re-stacking in the same spot
            let jitter = (rng.random::<f32>() - 0.5) * self.merge.jitter_span;
            outcome.merges.push(Merge {
                consumed: [a.id, b.id],
                tier,
                position: (a.position + b.position) * 0.5,
                velocity: Vec2::new(jitter, -self.merge.upward_nudge),
                score: next.score,
            });
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tier::dessert_tiers;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn catalog() -> TierCatalog {
        TierCatalog::new(dessert_tiers()).unwrap()
    }

    fn item(id: u32, tier: usize, x: f32, y: f32) -> ItemContact {
        ItemContact {
            id: BodyId(id),
            tier,
            position: Vec2::new(x, y),
            velocity: Vec2::ZERO,
        }
    }

    fn pair(a: ItemContact, b: ItemContact) -> ItemPair {
        ItemPair { a, b }
    }

    #[test]
    fn test_same_tier_merges_into_next() {
        let tiers = catalog();
        let resolver = MergeResolver::new(&tiers, MergeConfig::default(), AudioConfig::default());
        let mut rng = Pcg32::seed_from_u64(1);

        for k in 0..tiers.len() - 1 {
            let outcome = resolver.resolve(
                &[pair(item(1, k, 100.0, 200.0), item(2, k, 140.0, 260.0))],
                &mut rng,
            );
            assert_eq!(outcome.merges.len(), 1);
            let merge = outcome.merges[0];
            assert_eq!(merge.tier, k + 1);
            assert_eq!(merge.consumed, [BodyId(1), BodyId(2)]);
            assert_eq!(merge.position, Vec2::new(120.0, 230.0));
            assert_eq!(outcome.score_delta(), tiers.tier_at(k + 1).unwrap().score);
        }
    }

    #[test]
    fn test_terminal_tier_never_merges() {
        let tiers = catalog();
        let resolver = MergeResolver::new(&tiers, MergeConfig::default(), AudioConfig::default());
        let mut rng = Pcg32::seed_from_u64(1);
        let outcome = resolver.resolve(&[pair(item(1, 9, 0.0, 0.0), item(2, 9, 10.0, 0.0))], &mut rng);
        assert!(outcome.merges.is_empty());
        assert_eq!(outcome.score_delta(), 0);
    }

    #[test]
    fn test_terminal_pair_bounce_is_silent() {
        let tiers = catalog();
        let resolver = MergeResolver::new(&tiers, MergeConfig::default(), AudioConfig::default());
        let mut rng = Pcg32::seed_from_u64(1);
        let mut fast = item(1, 9, 0.0, 0.0);
        fast.velocity = Vec2::new(0.0, -12.0);
        let outcome = resolver.resolve(&[pair(fast, item(2, 9, 0.0, 300.0))], &mut rng);
        assert!(outcome.merges.is_empty());
        assert!(outcome.impacts.is_empty());
    }

    #[test]
    fn test_different_tiers_pass_through() {
        let tiers = catalog();
        let resolver = MergeResolver::new(&tiers, MergeConfig::default(), AudioConfig::default());
        let mut rng = Pcg32::seed_from_u64(1);
        let outcome = resolver.resolve(&[pair(item(1, 0, 0.0, 0.0), item(2, 1, 10.0, 0.0))], &mut rng);
        assert!(outcome.merges.is_empty());
        assert!(outcome.impacts.is_empty());
    }

    #[test]
    fn test_duplicate_pair_merges_once() {
        let tiers = catalog();
        let resolver = MergeResolver::new(&tiers, MergeConfig::default(), AudioConfig::default());
        let mut rng = Pcg32::seed_from_u64(1);
        let p = pair(item(1, 2, 0.0, 0.0), item(2, 2, 10.0, 0.0));
        let outcome = resolver.resolve(&[p, p], &mut rng);
        assert_eq!(outcome.merges.len(), 1);
        assert_eq!(outcome.score_delta(), tiers.tier_at(3).unwrap().score);
    }

    #[test]
    fn test_three_way_contact_consumes_each_item_once() {
        let tiers = catalog();
        let resolver = MergeResolver::new(&tiers, MergeConfig::default(), AudioConfig::default());
        let mut rng = Pcg32::seed_from_u64(1);
        let (a, b, c) = (item(1, 0, 0.0, 0.0), item(2, 0, 10.0, 0.0), item(3, 0, 5.0, 8.0));
        let outcome = resolver.resolve(&[pair(a, b), pair(b, c), pair(a, c)], &mut rng);
        assert_eq!(outcome.merges.len(), 1);
        assert_eq!(outcome.merges[0].consumed, [BodyId(1), BodyId(2)]);
    }

    #[test]
    fn test_nudge_is_upward_with_bounded_jitter() {
        let tiers = catalog();
        let config = MergeConfig::default();
        let resolver = MergeResolver::new(&tiers, config, AudioConfig::default());
        let mut rng = Pcg32::seed_from_u64(5);
        for i in 0..50 {
            let outcome = resolver.resolve(
                &[pair(item(2 * i, 1, 0.0, 0.0), item(2 * i + 1, 1, 0.0, 0.0))],
                &mut rng,
            );
            let v = outcome.merges[0].velocity;
            assert_eq!(v.y, -config.upward_nudge);
            assert!(v.x.abs() <= config.jitter_span / 2.0);
        }
    }

    #[test]
    fn test_fast_bounce_reports_impact() {
        let tiers = catalog();
        let resolver = MergeResolver::new(&tiers, MergeConfig::default(), AudioConfig::default());
        let mut rng = Pcg32::seed_from_u64(1);
        let mut fast = item(1, 0, 0.0, 0.0);
        fast.velocity = Vec2::new(0.0, -12.0);
        let outcome = resolver.resolve(&[pair(fast, item(2, 3, 0.0, 30.0))], &mut rng);
        assert!(outcome.merges.is_empty());
        assert_eq!(outcome.impacts, vec![0.8]);
    }
}
