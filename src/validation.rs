//! Field validation for the checkout form and the mailing-list signup.
//!
//! Validation is total: every failing field is reported, in form order.

use crate::model::{CustomerProfile, Subscription};
use chrono::NaiveDate;
use regex_lite::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Phone,
    Street,
    City,
    State,
    Zip,
    DeliveryDate,
    DeliveryTime,
}

impl Field {
    fn label(self) -> &'static str {
        match self {
            Field::FirstName => "First name",
            Field::LastName => "Last name",
            Field::Email => "Email",
            Field::Phone => "Phone number",
            Field::Street => "Address",
            Field::City => "City",
            Field::State => "State",
            Field::Zip => "Zip code",
            Field::DeliveryDate => "Delivery date",
            Field::DeliveryTime => "Delivery time",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Required,
    Invalid,
}

/// A user-facing message attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub kind: ErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn required(field: Field) -> Self {
        Self {
            field,
            kind: ErrorKind::Required,
            message: format!("{} is required", field.label()),
        }
    }

    pub fn invalid(field: Field) -> Self {
        Self {
            field,
            kind: ErrorKind::Invalid,
            message: format!("{} is invalid", field.label()),
        }
    }

    fn with_message(mut self, message: &str) -> Self {
        self.message = message.to_string();
        self
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"))
}

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\d\s\-()]+$").expect("phone pattern"))
}

fn zip_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("zip pattern"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_re().is_match(email)
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn required(errors: &mut Vec<FieldError>, field: Field, value: &str) {
    if blank(value) {
        errors.push(FieldError::required(field));
    }
}

fn formatted(errors: &mut Vec<FieldError>, field: Field, value: &str, re: &Regex) {
    if blank(value) {
        errors.push(FieldError::required(field));
    } else if !re.is_match(value) {
        errors.push(FieldError::invalid(field));
    }
}

/// Checks the contact and delivery sections. `today` is the caller's local
/// date; deliveries must be scheduled strictly after it.
pub fn validate_profile(profile: &CustomerProfile, today: NaiveDate) -> Vec<FieldError> {
    let contact = &profile.contact;
    let delivery = &profile.delivery;
    let mut errors = Vec::new();

    required(&mut errors, Field::FirstName, &contact.first_name);
    required(&mut errors, Field::LastName, &contact.last_name);
    formatted(&mut errors, Field::Email, &contact.email, email_re());
    formatted(&mut errors, Field::Phone, &contact.phone, phone_re());
    required(&mut errors, Field::Street, &delivery.street);
    required(&mut errors, Field::City, &delivery.city);
    required(&mut errors, Field::State, &delivery.state);
    formatted(&mut errors, Field::Zip, &delivery.zip, zip_re());

    match delivery.date {
        None => errors.push(FieldError::required(Field::DeliveryDate)),
        Some(date) if date <= today => errors.push(
            FieldError::invalid(Field::DeliveryDate)
                .with_message("Delivery date must be after today"),
        ),
        Some(_) => {}
    }
    if delivery.time_slot.is_none() {
        errors.push(FieldError::required(Field::DeliveryTime));
    }

    errors
}

/// Checks a mailing-list signup: first name and a well-formed email.
pub fn validate_subscription(subscription: &Subscription) -> Vec<FieldError> {
    let mut errors = Vec::new();
    required(&mut errors, Field::FirstName, &subscription.first_name);
    if blank(&subscription.email) {
        errors.push(FieldError::required(Field::Email));
    } else if !is_valid_email(&subscription.email) {
        errors.push(
            FieldError::invalid(Field::Email).with_message("Please enter a valid email address"),
        );
    }
    errors
}
