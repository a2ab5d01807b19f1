use crate::model::{CartLine, CustomerProfile, PriceBreakdown};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an order session hosted by the session actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u32);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session_{}", self.0)
    }
}

impl From<u32> for SessionId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// `ORD-<unix millis>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    pub fn from_millis(millis: i64) -> Self {
        Self(format!("ORD-{millis}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated order, frozen at the moment checkout passed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_number: OrderNumber,
    pub customer: CustomerProfile,
    pub lines: Vec<CartLine>,
    pub price: PriceBreakdown,
    pub submitted_at: DateTime<Utc>,
}

/// Acknowledgement from the notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub accepted: bool,
    pub reference_id: Option<String>,
}

impl Receipt {
    pub fn accepted(reference_id: impl Into<String>) -> Self {
        Self {
            accepted: true,
            reference_id: Some(reference_id.into()),
        }
    }
}
