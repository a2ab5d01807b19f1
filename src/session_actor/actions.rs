//! Custom actions for the order session actor.
//!
//! Cart edits and the checkout phases are actions; the customer profile goes
//! through the regular update path ([`ProfileUpdate`](super::ProfileUpdate)).

use crate::model::{MealId, Order, PortionSize, PriceBreakdown, Receipt};
use crate::session_actor::AttemptId;
use chrono::{DateTime, NaiveDate, Utc};

#[derive(Debug, Clone)]
pub enum SessionAction {
    /// Adds one unit of a meal. Portion only applies to a new line.
    AddLine { meal_id: MealId, portion: PortionSize },
    /// Zero or less removes the line; an absent line is left alone.
    SetQuantity { meal_id: MealId, quantity: i32 },
    RemoveLine { meal_id: MealId },
    Price,
    /// Validates and freezes the order under the caller's `attempt`. Moves
    /// the session to `Submitting`.
    BeginCheckout {
        attempt: AttemptId,
        today: NaiveDate,
        submitted_at: DateTime<Utc>,
    },
    ConfirmSubmission { attempt: AttemptId, receipt: Receipt },
    /// Returns the session to `Editing` with a retry notice.
    FailSubmission { attempt: AttemptId, reason: String },
    /// Empties the cart and starts a new order. Keeps the profile.
    Reset,
}

/// A frozen order waiting for the notifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub attempt: AttemptId,
    pub order: Order,
}

/// Results from SessionActions - variants match 1:1 with SessionAction
#[derive(Debug, Clone)]
pub enum SessionActionResult {
    /// The line's quantity after the add.
    AddLine(u32),
    SetQuantity(bool),
    /// Whether a line was removed.
    RemoveLine(bool),
    Price(PriceBreakdown),
    BeginCheckout(Submission),
    ConfirmSubmission(Order),
    FailSubmission(()),
    Reset(()),
}
