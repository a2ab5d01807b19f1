//! Dietary-preference and allergen filtering for the menu page.

use crate::model::Meal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What the visitor asked to see.
///
/// `dietary` widens the selection: a meal carrying any of the tags is kept.
/// `excluded_allergens` is absolute: a meal containing any of them is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub dietary: BTreeSet<String>,
    pub excluded_allergens: BTreeSet<String>,
}

impl Preferences {
    pub fn new<D, A>(dietary: D, excluded_allergens: A) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self {
            dietary: dietary.into_iter().map(Into::into).collect(),
            excluded_allergens: excluded_allergens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dietary.is_empty() && self.excluded_allergens.is_empty()
    }

    pub fn matches(&self, meal: &Meal) -> bool {
        let wanted = self.dietary.is_empty() || self.dietary.iter().any(|tag| meal.has_tag(tag));
        wanted && self.excluded_allergens.is_disjoint(&meal.allergens)
    }
}

/// Keeps the meals matching `prefs`, in input order. An empty result is a
/// normal "no matches" outcome.
pub fn apply(meals: &[Meal], prefs: &Preferences) -> Vec<Meal> {
    meals.iter().filter(|meal| prefs.matches(meal)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::model::MealId;

    fn ids(meals: &[Meal]) -> Vec<u32> {
        meals.iter().map(|m| m.id.0).collect()
    }

    #[test]
    fn test_no_preferences_keeps_everything() {
        let catalog = Catalog::weekly_menu();
        let shown = apply(catalog.list(), &Preferences::default());
        assert_eq!(ids(&shown), vec![1, 2, 3]);
    }

    #[test]
    fn test_dietary_tags_are_a_union() {
        let catalog = Catalog::weekly_menu();
        let protein = apply(catalog.list(), &Preferences::new(["High-Protein"], Vec::<String>::new()));
        assert_eq!(ids(&protein), vec![1, 2]);

        let wider = apply(
            catalog.list(),
            &Preferences::new(["High-Protein", "Vegetarian"], Vec::<String>::new()),
        );
        assert_eq!(ids(&wider), vec![1, 2, 3]);
        assert!(ids(&protein).iter().all(|id| ids(&wider).contains(id)));
    }

    #[test]
    fn test_allergen_exclusion_wins() {
        let catalog = Catalog::weekly_menu();
        let prefs = Preferences::new(["High-Protein"], ["Dairy"]);
        assert!(apply(catalog.list(), &prefs).is_empty());

        let prefs = Preferences::new(Vec::<String>::new(), ["Fish"]);
        let shown = apply(catalog.list(), &prefs);
        assert_eq!(ids(&shown), vec![2, 3]);
        assert!(shown.iter().all(|m| !m.allergens.contains("Fish")));
    }

    #[test]
    fn test_filter_is_idempotent_and_exact() {
        let catalog = Catalog::weekly_menu();
        let prefs = Preferences::new(["vegetarian"], Vec::<String>::new());
        assert!(catalog.filtered(&prefs).is_empty());

        let prefs = Preferences::new(["Vegetarian"], Vec::<String>::new());
        let once = catalog.filtered(&prefs);
        let twice = apply(&once, &prefs);
        assert_eq!(once, twice);
        assert_eq!(once[0].id, MealId(3));
    }
}
