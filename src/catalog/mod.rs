//! The weekly menu and the dietary filter applied to it for display.

pub mod error;
pub mod filter;

pub use error::*;
pub use filter::*;

use crate::model::{Meal, MealId};
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashSet};

/// Immutable list of meals in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    meals: Vec<Meal>,
}

impl Catalog {
    /// Rejects a zero id, duplicate ids and non-positive prices.
    pub fn new(meals: Vec<Meal>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for meal in &meals {
            if meal.id.0 == 0 {
                return Err(CatalogError::InvalidId(meal.id));
            }
            if !seen.insert(meal.id) {
                return Err(CatalogError::DuplicateMeal(meal.id));
            }
            if meal.base_price <= Decimal::ZERO {
                return Err(CatalogError::InvalidPrice(meal.id));
            }
        }
        Ok(Self { meals })
    }

    /// Parses a JSON array of meals.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let meals: Vec<Meal> = serde_json::from_str(json)?;
        Self::new(meals)
    }

    pub fn list(&self) -> &[Meal] {
        &self.meals
    }

    pub fn get(&self, id: MealId) -> Result<&Meal, CatalogError> {
        self.meals
            .iter()
            .find(|meal| meal.id == id)
            .ok_or(CatalogError::NotFound(id))
    }

    /// Meals matching `prefs`, in catalog order.
    pub fn filtered(&self, prefs: &Preferences) -> Vec<Meal> {
        apply(&self.meals, prefs)
    }

    /// The storefront's current menu.
    pub fn weekly_menu() -> Self {
        let meals = vec![
            Meal {
                id: MealId(1),
                name: "Tuscan Salmon & Creamed Spinach".into(),
                description: "Crispy salmon with creamy garlic spinach. A perfectly balanced meal that's both elegant and satisfying.".into(),
                base_price: Decimal::new(1200, 2),
                calories: 480,
                protein_grams: 38,
                tags: set(&["High-Protein", "Gluten-Free"]),
                allergens: set(&["Fish", "Dairy"]),
                image_ref: "/images/meals/Herb-Crusted Salmon with Garlic Spinach Cream.jpeg".into(),
            },
            Meal {
                id: MealId(2),
                name: "Mediterranean Chopped Steak Salad".into(),
                description: "Garlic-herb steak strips with vegetables, feta & oregano dressing. Fresh, flavorful, and protein-packed.".into(),
                base_price: Decimal::new(1200, 2),
                calories: 460,
                protein_grams: 42,
                tags: set(&["High-Protein"]),
                allergens: set(&["Dairy"]),
                image_ref: "/images/meals/mediterraneanChoppedSteakSalad.jpeg".into(),
            },
            Meal {
                id: MealId(3),
                name: "Roasted Vegetable Pesto Orzo".into(),
                description: "Orzo, zucchini, peppers & tomatoes with basil pesto. A vibrant, plant-based meal that's both hearty and delicious.".into(),
                base_price: Decimal::new(1200, 2),
                calories: 420,
                protein_grams: 18,
                tags: set(&["Vegetarian", "Plant-Based"]),
                allergens: BTreeSet::new(),
                image_ref: "/images/meals/Vegetarian Mediterranean Powerbowl.png".into(),
            },
        ];
        Self { meals }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::weekly_menu()
    }
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekly_menu_lookup() {
        let catalog = Catalog::weekly_menu();
        assert_eq!(catalog.list().len(), 3);
        assert_eq!(catalog.get(MealId(2)).unwrap().protein_grams, 42);
        assert!(matches!(
            catalog.get(MealId(99)),
            Err(CatalogError::NotFound(MealId(99)))
        ));
        // The built-in menu passes its own construction checks.
        assert!(Catalog::new(catalog.list().to_vec()).is_ok());
    }

    #[test]
    fn test_rejects_duplicates_and_free_meals() {
        let mut meals = Catalog::weekly_menu().list().to_vec();
        meals[1].id = MealId(1);
        assert!(matches!(
            Catalog::new(meals),
            Err(CatalogError::DuplicateMeal(MealId(1)))
        ));

        let mut meals = Catalog::weekly_menu().list().to_vec();
        meals[2].base_price = Decimal::ZERO;
        assert!(matches!(
            Catalog::new(meals),
            Err(CatalogError::InvalidPrice(MealId(3)))
        ));

        let mut meals = Catalog::weekly_menu().list().to_vec();
        meals[0].id = MealId(0);
        assert!(matches!(
            Catalog::new(meals),
            Err(CatalogError::InvalidId(MealId(0)))
        ));

        let json = r#"[{"id": 0, "name": "Broth", "description": "", "base_price": 4,
                        "calories": 50, "protein_grams": 5}]"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::InvalidId(MealId(0)))
        ));
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {"id": 7, "name": "Lentil Soup", "description": "Warm", "base_price": 9.5,
             "calories": 350, "protein_grams": 20, "tags": ["Vegetarian"]}
        ]"#;
        let catalog = Catalog::from_json(json).unwrap();
        let soup = catalog.get(MealId(7)).unwrap();
        assert_eq!(soup.base_price, Decimal::new(95, 1));
        assert!(soup.has_tag("Vegetarian"));
        assert!(soup.allergens.is_empty());

        assert!(matches!(
            Catalog::from_json("{not json"),
            Err(CatalogError::Parse(_))
        ));
    }
}
