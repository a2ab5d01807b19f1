use crate::model::DietaryIntake;
use serde::{Deserialize, Serialize};

/// A mailing-list signup as entered on the landing page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub first_name: String,
    pub email: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub preferences: Option<DietaryIntake>,
}

impl Subscription {
    pub fn new(first_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_preferences(mut self, preferences: DietaryIntake) -> Self {
        self.preferences = Some(preferences);
        self
    }
}
