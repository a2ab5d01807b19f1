//! Error types for the catalog.

use crate::model::MealId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Meal not found: {0}")]
    NotFound(MealId),

    /// Meal ids start at 1.
    #[error("Invalid meal id: {0}")]
    InvalidId(MealId),

    #[error("Duplicate meal id: {0}")]
    DuplicateMeal(MealId),

    /// Base prices must be strictly positive.
    #[error("Invalid price for {0}")]
    InvalidPrice(MealId),

    #[error("Invalid menu file: {0}")]
    Parse(#[from] serde_json::Error),
}
