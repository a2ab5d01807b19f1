use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Catalog identifier of a meal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MealId(pub u32);

impl fmt::Display for MealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "meal_{}", self.0)
    }
}

impl From<u32> for MealId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A dish on the weekly menu. Never mutated once the catalog is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: MealId,
    pub name: String,
    pub description: String,
    pub base_price: Decimal,
    pub calories: u32,
    pub protein_grams: u32,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub allergens: BTreeSet<String>,
    #[serde(default)]
    pub image_ref: String,
}

impl Meal {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Image references to try in order: the stored reference, then the same
    /// stem as `.svg`, `.png` and `.jpg`. Duplicates are skipped.
    pub fn image_candidates(&self) -> Vec<String> {
        let mut candidates = Vec::new();
        if self.image_ref.is_empty() {
            return candidates;
        }
        candidates.push(self.image_ref.clone());

        let stem = match self.image_ref.rsplit_once('.') {
            Some((stem, ext)) if !ext.contains('/') => stem,
            _ => self.image_ref.as_str(),
        };
        for ext in ["svg", "png", "jpg"] {
            let candidate = format!("{stem}.{ext}");
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
        candidates
    }
}

/// Portion chosen for a cart line. Scales the meal's base price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortionSize {
    Small,
    #[default]
    Regular,
    Large,
}

impl PortionSize {
    pub fn multiplier(self) -> Decimal {
        match self {
            PortionSize::Small => Decimal::new(85, 2),
            PortionSize::Regular => Decimal::ONE,
            PortionSize::Large => Decimal::new(125, 2),
        }
    }
}

impl fmt::Display for PortionSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PortionSize::Small => "Small",
            PortionSize::Regular => "Regular",
            PortionSize::Large => "Large",
        };
        f.write_str(label)
    }
}
