//! Tier table: the ordered merge progression
//!
//! Each tier defines the physical and scoring attributes of an item. Two items
//! of the same non-terminal tier merge into one item of the next tier.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One rank in the merge progression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    /// Position in the table (assigned by the catalog)
    #[serde(default)]
    pub index: usize,
    /// Display name
    pub name: String,
    /// Circle radius in pixels
    pub radius: f32,
    /// Relative mass
    pub mass: f32,
    /// Restitution coefficient (bounciness)
    pub restitution: f32,
    /// Points awarded when this tier is produced by a merge
    pub score: u64,
}

impl Tier {
    pub fn new(name: &str, radius: f32, mass: f32, restitution: f32, score: u64) -> Self {
        Self {
            index: 0,
            name: name.to_string(),
            radius,
            mass,
            restitution,
            score,
        }
    }
}

/// The reference dessert table (ten tiers)
pub fn dessert_tiers() -> Vec<Tier> {
    vec![
        Tier::new("Berry Macaron", 22.0, 1.0, 0.6, 10),
        Tier::new("Choco Cookie", 30.0, 1.5, 0.5, 20),
        Tier::new("Glazed Donut", 40.0, 2.0, 0.5, 40),
        Tier::new("Vanilla Cupcake", 50.0, 2.5, 0.4, 80),
        Tier::new("Caramel Pudding", 62.0, 3.0, 0.4, 150),
        Tier::new("Strawberry Slice", 74.0, 4.0, 0.3, 300),
        Tier::new("Fluffy Pancakes", 88.0, 5.0, 0.3, 500),
        Tier::new("Birthday Cake", 102.0, 6.0, 0.2, 800),
        Tier::new("Fruit Tart", 118.0, 8.0, 0.2, 1500),
        Tier::new("Wedding Tier", 140.0, 10.0, 0.1, 3000),
    ]
}

/// Tier field that failed the ordering check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierField {
    Radius,
    Mass,
    Score,
}

impl fmt::Display for TierField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Radius => write!(f, "radius"),
            Self::Mass => write!(f, "mass"),
            Self::Score => write!(f, "score"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TierError {
    OutOfRange { index: usize, len: usize },
    Empty,
    NotIncreasing { index: usize, field: TierField },
    RestitutionIncreasing { index: usize },
    NonPositive { index: usize },
}

impl fmt::Display for TierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { index, len } => {
                write!(f, "tier index {index} out of range (table has {len} tiers)")
            }
            Self::Empty => write!(f, "tier table is empty"),
            Self::NotIncreasing { index, field } => {
                write!(f, "tier {index}: {field} must be strictly greater than tier {}", index - 1)
            }
            Self::RestitutionIncreasing { index } => {
                write!(f, "tier {index}: restitution must not exceed tier {}", index - 1)
            }
            Self::NonPositive { index } => {
                write!(f, "tier {index}: radius and mass must be positive")
            }
        }
    }
}

impl std::error::Error for TierError {}

/// Immutable, validated tier table
#[derive(Debug, Clone)]
pub struct TierCatalog {
    tiers: Vec<Tier>,
}

impl TierCatalog {
    /// Validate and index a tier table
    pub fn new(mut tiers: Vec<Tier>) -> Result<Self, TierError> {
        if tiers.is_empty() {
            return Err(TierError::Empty);
        }
        for (index, tier) in tiers.iter_mut().enumerate() {
            tier.index = index;
        }
        for (index, tier) in tiers.iter().enumerate() {
            if tier.radius <= 0.0 || tier.mass <= 0.0 {
                return Err(TierError::NonPositive { index });
            }
            if index == 0 {
                continue;
            }
            let prev = &tiers[index - 1];
            if tier.radius <= prev.radius {
                return Err(TierError::NotIncreasing { index, field: TierField::Radius });
            }
            if tier.mass <= prev.mass {
                return Err(TierError::NotIncreasing { index, field: TierField::Mass });
            }
            if tier.score <= prev.score {
                return Err(TierError::NotIncreasing { index, field: TierField::Score });
            }
            if tier.restitution > prev.restitution {
                return Err(TierError::RestitutionIncreasing { index });
            }
        }
        Ok(Self { tiers })
    }

    pub fn tier_at(&self, index: usize) -> Result<&Tier, TierError> {
        self.tiers.get(index).ok_or(TierError::OutOfRange {
            index,
            len: self.tiers.len(),
        })
    }

    /// Terminal tier items never merge
    #[inline]
    pub fn is_terminal(&self, index: usize) -> bool {
        index + 1 == self.tiers.len()
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn desserts() -> TierCatalog {
        TierCatalog::new(dessert_tiers()).unwrap()
    }

    #[test]
    fn test_reference_table_is_valid() {
        let catalog = desserts();
        assert_eq!(catalog.len(), 10);
        for i in 0..catalog.len() - 1 {
            let a = catalog.tier_at(i).unwrap();
            let b = catalog.tier_at(i + 1).unwrap();
            assert!(a.radius < b.radius);
            assert!(a.score < b.score);
            assert!(a.mass < b.mass);
            assert!(a.restitution >= b.restitution);
            assert_eq!(a.index, i);
        }
    }

    #[test]
    fn test_out_of_range() {
        let catalog = desserts();
        assert_eq!(
            catalog.tier_at(10),
            Err(TierError::OutOfRange { index: 10, len: 10 })
        );
    }

    #[test]
    fn test_terminal_only_last() {
        let catalog = desserts();
        assert!(catalog.is_terminal(9));
        assert!(!catalog.is_terminal(8));
        assert!(!catalog.is_terminal(0));
    }

    #[test]
    fn test_rejects_malformed_tables() {
        assert_eq!(TierCatalog::new(Vec::new()).unwrap_err(), TierError::Empty);

        let mut tiers = dessert_tiers();
        tiers[3].radius = tiers[2].radius;
        assert_eq!(
            TierCatalog::new(tiers).unwrap_err(),
            TierError::NotIncreasing { index: 3, field: TierField::Radius }
        );

        let mut tiers = dessert_tiers();
        tiers[5].score = 1;
        assert_eq!(
            TierCatalog::new(tiers).unwrap_err(),
            TierError::NotIncreasing { index: 5, field: TierField::Score }
        );

        let mut tiers = dessert_tiers();
        tiers[1].restitution = 0.9;
        assert_eq!(
            TierCatalog::new(tiers).unwrap_err(),
            TierError::RestitutionIncreasing { index: 1 }
        );
    }

    proptest! {
        #[test]
        fn prop_generated_increasing_tables_validate(
            steps in prop::collection::vec((0.5f32..20.0, 0.1f32..3.0, 1u64..500), 1..12)
        ) {
            let mut radius = 10.0;
            let mut mass = 1.0;
            let mut score = 5;
            let tiers: Vec<Tier> = steps
                .iter()
                .map(|&(dr, dm, ds)| {
                    radius += dr;
                    mass += dm;
                    score += ds;
                    Tier::new("t", radius, mass, 0.5, score)
                })
                .collect();
            let n = tiers.len();
            let catalog = TierCatalog::new(tiers).unwrap();
            prop_assert!(catalog.is_terminal(n - 1));
            prop_assert!(catalog.tier_at(n).is_err());
        }
    }
}
