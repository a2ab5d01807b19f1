//! The checkout questionnaire.
//!
//! Only [`ContactInfo`] and [`DeliveryDetails`] are validated at checkout.
//! [`DietaryIntake`] is forwarded to the kitchen as entered.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactChannel {
    #[default]
    Text,
    Email,
    Phone,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub preferred_contact: ContactChannel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimeSlot::Morning => "Morning (9AM - 12PM)",
            TimeSlot::Afternoon => "Afternoon (12PM - 5PM)",
            TimeSlot::Evening => "Evening (5PM - 8PM)",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryDetails {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub date: Option<NaiveDate>,
    pub time_slot: Option<TimeSlot>,
    pub special_instructions: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllergySeverity {
    Mild,
    Moderate,
    Severe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TexturePreference {
    Crispy,
    Soft,
    SensitiveToMixedTextures,
    NoPreference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpiceLevel {
    MildOnly,
    Medium,
    Spicy,
    #[default]
    TrustChef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReligiousRule {
    #[default]
    None,
    Halal,
    KosherStyle,
    NoPork,
    NoBeef,
    FastingDays,
    Other,
}

/// Long-form dietary questionnaire. Also accepted with a mailing-list signup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DietaryIntake {
    pub allergies: Vec<String>,
    pub other_allergies: String,
    pub allergy_severity: Option<AllergySeverity>,
    pub cross_contamination: bool,
    pub eating_style: String,
    pub avoids: Vec<String>,
    pub food_dislikes: String,
    pub texture: Option<TexturePreference>,
    pub spice_level: SpiceLevel,
    pub religious_rule: ReligiousRule,
    pub religious_notes: String,
    pub medical_needs: String,
    pub medical_ingredients: String,
    pub allow_substitutions: bool,
    pub additional_notes: String,
}

impl Default for DietaryIntake {
    fn default() -> Self {
        Self {
            allergies: Vec::new(),
            other_allergies: String::new(),
            allergy_severity: None,
            cross_contamination: false,
            eating_style: "no-specific-diet".to_string(),
            avoids: Vec::new(),
            food_dislikes: String::new(),
            texture: None,
            spice_level: SpiceLevel::default(),
            religious_rule: ReligiousRule::default(),
            religious_notes: String::new(),
            medical_needs: String::new(),
            medical_ingredients: String::new(),
            allow_substitutions: true,
            additional_notes: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub contact: ContactInfo,
    pub delivery: DeliveryDetails,
    pub dietary: DietaryIntake,
}

impl CustomerProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.contact.first_name.trim(), self.contact.last_name.trim())
    }
}
