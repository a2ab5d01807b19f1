//! [`ActorEntity`] implementation for [`OrderSession`].
//!
//! The checkout state machine:
//!
//! ```text
//! Editing --BeginCheckout--> Validating --ok--> Submitting --Confirm--> Confirmed (cart emptied)
//!    ^                            |                  |                      |
//!    +------- field errors -------+                  |                      |
//!    +------------------ FailSubmission -------------+                      |
//!    +--------------------------------- Reset ------------------------------+
//! ```
//!
//! `Validating` is never stored: validation runs inside a single action, so
//! it is only visible in the transition logs.

use crate::catalog::{Catalog, CatalogError};
use crate::framework::ActorEntity;
use crate::model::{
    Cart, ContactInfo, CustomerProfile, DeliveryDetails, DietaryIntake, Order, PriceBreakdown,
    Receipt, SessionId,
};
use crate::session_actor::{
    OrderNumberGenerator, SessionAction, SessionActionResult, SessionError, Submission,
};
use crate::validation::{validate_profile, Field, FieldError};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Identifies one trip through `Submitting`. Completions must quote it.
///
/// Chosen by the caller before `BeginCheckout` is sent, so the caller can
/// fail the attempt even if it never sees the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AttemptId(pub u64);

impl AttemptId {
    /// A process-wide unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attempt_{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckoutPhase {
    Editing,
    Validating,
    Submitting,
    Confirmed,
}

impl fmt::Display for CheckoutPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckoutPhase::Editing => "editing",
            CheckoutPhase::Validating => "validating",
            CheckoutPhase::Submitting => "submitting",
            CheckoutPhase::Confirmed => "confirmed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutState {
    Editing {
        errors: Vec<FieldError>,
        notice: Option<String>,
    },
    Submitting {
        attempt: AttemptId,
        order: Order,
    },
    Confirmed {
        order: Order,
        receipt: Receipt,
    },
}

impl Default for CheckoutState {
    fn default() -> Self {
        CheckoutState::Editing {
            errors: Vec::new(),
            notice: None,
        }
    }
}

impl CheckoutState {
    pub fn phase(&self) -> CheckoutPhase {
        match self {
            CheckoutState::Editing { .. } => CheckoutPhase::Editing,
            CheckoutState::Submitting { .. } => CheckoutPhase::Submitting,
            CheckoutState::Confirmed { .. } => CheckoutPhase::Confirmed,
        }
    }

    /// Field errors from the last failed validation.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            CheckoutState::Editing { errors, .. } => errors,
            _ => &[],
        }
    }

    /// Retry notice left by a failed submission.
    pub fn notice(&self) -> Option<&str> {
        match self {
            CheckoutState::Editing { notice, .. } => notice.as_deref(),
            _ => None,
        }
    }
}

/// One visitor's cart, profile and checkout progress.
#[derive(Debug, Clone)]
pub struct OrderSession {
    pub id: SessionId,
    pub cart: Cart,
    pub profile: CustomerProfile,
    pub state: CheckoutState,
}

impl OrderSession {
    pub fn phase(&self) -> CheckoutPhase {
        self.state.phase()
    }

    pub fn price(&self) -> PriceBreakdown {
        self.cart.price()
    }

    fn ensure_editing(&self) -> Result<(), SessionError> {
        match self.phase() {
            CheckoutPhase::Editing => Ok(()),
            phase => Err(SessionError::NotEditing(phase)),
        }
    }

    fn transition(&mut self, to: CheckoutState) {
        let from = self.phase();
        self.state = to;
        info!(session_id = %self.id, %from, to = %self.phase(), "Checkout transition");
    }

    fn begin_checkout(
        &mut self,
        attempt: AttemptId,
        today: chrono::NaiveDate,
        submitted_at: chrono::DateTime<chrono::Utc>,
        ctx: &SessionContext,
    ) -> Result<Submission, SessionError> {
        if self.cart.is_empty() {
            return Err(SessionError::EmptyCart);
        }
        match self.phase() {
            CheckoutPhase::Submitting => return Err(SessionError::SubmissionInProgress),
            CheckoutPhase::Confirmed => return Err(SessionError::NotEditing(CheckoutPhase::Confirmed)),
            _ => {}
        }

        info!(session_id = %self.id, from = %CheckoutPhase::Editing, to = %CheckoutPhase::Validating, "Checkout transition");
        let errors = validate_profile(&self.profile, today);
        if !errors.is_empty() {
            self.state = CheckoutState::Editing {
                errors: errors.clone(),
                notice: None,
            };
            info!(
                session_id = %self.id,
                from = %CheckoutPhase::Validating,
                to = %CheckoutPhase::Editing,
                errors = errors.len(),
                "Checkout transition"
            );
            return Err(SessionError::Validation(errors));
        }

        let order = Order {
            order_number: ctx.order_numbers.next(submitted_at.timestamp_millis()),
            customer: self.profile.clone(),
            lines: self.cart.lines().to_vec(),
            price: self.cart.price(),
            submitted_at,
        };
        self.state = CheckoutState::Submitting {
            attempt,
            order: order.clone(),
        };
        info!(
            session_id = %self.id,
            from = %CheckoutPhase::Validating,
            to = %CheckoutPhase::Submitting,
            order_number = %order.order_number,
            %attempt,
            "Checkout transition"
        );
        Ok(Submission { attempt, order })
    }

    fn current_attempt(&self, attempt: AttemptId) -> Result<&Order, SessionError> {
        match &self.state {
            CheckoutState::Submitting { attempt: current, order } if *current == attempt => Ok(order),
            _ => Err(SessionError::StaleSubmission(attempt)),
        }
    }
}

/// Creation payload. A returning visitor may bring a saved profile.
#[derive(Debug, Clone, Default)]
pub struct SessionCreate {
    pub profile: Option<CustomerProfile>,
}

/// Replaces whole sections of the customer profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub contact: Option<ContactInfo>,
    pub delivery: Option<DeliveryDetails>,
    pub dietary: Option<DietaryIntake>,
}

/// Dependencies injected into every session hook.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub catalog: Arc<Catalog>,
    pub order_numbers: Arc<OrderNumberGenerator>,
}

impl SessionContext {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            order_numbers: Arc::new(OrderNumberGenerator::new()),
        }
    }
}

fn is_contact_field(field: Field) -> bool {
    matches!(
        field,
        Field::FirstName | Field::LastName | Field::Email | Field::Phone
    )
}

fn lookup(catalog: &Catalog, meal_id: crate::model::MealId) -> Result<&crate::model::Meal, SessionError> {
    catalog.get(meal_id).map_err(|e| match e {
        CatalogError::NotFound(id) => SessionError::MealNotFound(id),
        other => SessionError::ActorCommunicationError(other.to_string()),
    })
}

#[async_trait]
impl ActorEntity for OrderSession {
    type Id = SessionId;
    type Create = SessionCreate;
    type Update = ProfileUpdate;
    type Action = SessionAction;
    type ActionResult = SessionActionResult;
    type Context = SessionContext;
    type Error = SessionError;

    fn from_create_params(id: SessionId, params: SessionCreate) -> Result<Self, Self::Error> {
        Ok(Self {
            id,
            cart: Cart::new(),
            profile: params.profile.unwrap_or_default(),
            state: CheckoutState::default(),
        })
    }

    /// Editing a section clears the field errors that belong to it.
    async fn on_update(
        &mut self,
        update: ProfileUpdate,
        _ctx: &SessionContext,
    ) -> Result<(), Self::Error> {
        self.ensure_editing()?;

        let contact_changed = update.contact.is_some();
        let delivery_changed = update.delivery.is_some();
        if let Some(contact) = update.contact {
            self.profile.contact = contact;
        }
        if let Some(delivery) = update.delivery {
            self.profile.delivery = delivery;
        }
        if let Some(dietary) = update.dietary {
            self.profile.dietary = dietary;
        }

        if let CheckoutState::Editing { errors, .. } = &mut self.state {
            errors.retain(|e| {
                let contact = is_contact_field(e.field);
                !(contact && contact_changed || !contact && delivery_changed)
            });
        }
        Ok(())
    }

    async fn on_delete(&self, _ctx: &SessionContext) -> Result<(), Self::Error> {
        if let CheckoutState::Submitting { order, .. } = &self.state {
            warn!(session_id = %self.id, order_number = %order.order_number, "Session abandoned during submission");
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: SessionAction,
        ctx: &SessionContext,
    ) -> Result<SessionActionResult, Self::Error> {
        match action {
            SessionAction::AddLine { meal_id, portion } => {
                self.ensure_editing()?;
                let meal = lookup(&ctx.catalog, meal_id)?;
                Ok(SessionActionResult::AddLine(self.cart.add(meal, portion)))
            }
            SessionAction::SetQuantity { meal_id, quantity } => {
                self.ensure_editing()?;
                Ok(SessionActionResult::SetQuantity(
                    self.cart.set_quantity(meal_id, quantity),
                ))
            }
            SessionAction::RemoveLine { meal_id } => {
                self.ensure_editing()?;
                Ok(SessionActionResult::RemoveLine(self.cart.remove(meal_id)))
            }
            SessionAction::Price => Ok(SessionActionResult::Price(self.cart.price())),
            SessionAction::BeginCheckout {
                attempt,
                today,
                submitted_at,
            } => self
                .begin_checkout(attempt, today, submitted_at, ctx)
                .map(SessionActionResult::BeginCheckout),
            SessionAction::ConfirmSubmission { attempt, receipt } => {
                let order = self.current_attempt(attempt)?.clone();
                self.cart.clear();
                self.transition(CheckoutState::Confirmed {
                    order: order.clone(),
                    receipt,
                });
                Ok(SessionActionResult::ConfirmSubmission(order))
            }
            SessionAction::FailSubmission { attempt, reason } => {
                self.current_attempt(attempt)?;
                warn!(session_id = %self.id, %attempt, %reason, "Submission failed");
                self.transition(CheckoutState::Editing {
                    errors: Vec::new(),
                    notice: Some(format!(
                        "We couldn't submit your order ({reason}). Please try again."
                    )),
                });
                Ok(SessionActionResult::FailSubmission(()))
            }
            SessionAction::Reset => {
                self.cart.clear();
                self.transition(CheckoutState::default());
                Ok(SessionActionResult::Reset(()))
            }
        }
    }
}
