//! # Session Client
//!
//! High-level API for the order session actor. Cart and profile calls are a
//! single round trip each. [`SessionClient::submit_order`] drives the whole
//! checkout: it freezes the order inside the actor, calls the notifier outside
//! the actor loop under a timeout, then reports the outcome back.

use crate::clients::actor_client::ActorClient;
use crate::framework::{FrameworkError, ResourceClient};
use crate::model::{CustomerProfile, MealId, Order, PortionSize, PriceBreakdown, SessionId};
use crate::notify::Notifier;
use crate::session_actor::{
    AttemptId, OrderSession, ProfileUpdate, SessionAction, SessionActionResult, SessionCreate,
    SessionError, Submission,
};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Default bound on a single notifier call.
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Clone)]
pub struct SessionClient {
    inner: ResourceClient<OrderSession>,
    notifier: Arc<dyn Notifier>,
    submit_timeout: Duration,
}

#[async_trait]
impl ActorClient<OrderSession> for SessionClient {
    type Error = SessionError;

    fn inner(&self) -> &ResourceClient<OrderSession> {
        &self.inner
    }

    /// Recovers the session's own error when the actor sent one back.
    fn map_error(e: FrameworkError) -> Self::Error {
        match e.downcast_entity::<SessionError>() {
            Ok(session_error) => session_error,
            Err(FrameworkError::NotFound(id)) => SessionError::NotFound(id),
            Err(other) => SessionError::ActorCommunicationError(other.to_string()),
        }
    }
}

fn unexpected(result: SessionActionResult) -> SessionError {
    SessionError::ActorCommunicationError(format!("unexpected response: {result:?}"))
}

impl SessionClient {
    pub fn new(
        inner: ResourceClient<OrderSession>,
        notifier: Arc<dyn Notifier>,
        submit_timeout: Duration,
    ) -> Self {
        Self {
            inner,
            notifier,
            submit_timeout,
        }
    }

    async fn action(
        &self,
        id: SessionId,
        action: SessionAction,
    ) -> Result<SessionActionResult, SessionError> {
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn open_session(&self) -> Result<SessionId, SessionError> {
        debug!("Sending request");
        self.inner
            .create(SessionCreate::default())
            .await
            .map_err(Self::map_error)
    }

    /// Opens a session pre-filled with a returning customer's profile.
    #[instrument(skip(self, profile))]
    pub async fn open_session_with(
        &self,
        profile: CustomerProfile,
    ) -> Result<SessionId, SessionError> {
        self.inner
            .create(SessionCreate {
                profile: Some(profile),
            })
            .await
            .map_err(Self::map_error)
    }

    /// Current snapshot of the session.
    pub async fn session(&self, id: SessionId) -> Result<OrderSession, SessionError> {
        self.get(id)
            .await?
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn add_line(
        &self,
        id: SessionId,
        meal_id: MealId,
        portion: PortionSize,
    ) -> Result<u32, SessionError> {
        match self
            .action(id, SessionAction::AddLine { meal_id, portion })
            .await?
        {
            SessionActionResult::AddLine(quantity) => Ok(quantity),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        id: SessionId,
        meal_id: MealId,
        quantity: i32,
    ) -> Result<bool, SessionError> {
        match self
            .action(id, SessionAction::SetQuantity { meal_id, quantity })
            .await?
        {
            SessionActionResult::SetQuantity(changed) => Ok(changed),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn remove_line(&self, id: SessionId, meal_id: MealId) -> Result<bool, SessionError> {
        match self.action(id, SessionAction::RemoveLine { meal_id }).await? {
            SessionActionResult::RemoveLine(removed) => Ok(removed),
            other => Err(unexpected(other)),
        }
    }

    pub async fn price(&self, id: SessionId) -> Result<PriceBreakdown, SessionError> {
        match self.action(id, SessionAction::Price).await? {
            SessionActionResult::Price(price) => Ok(price),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self, update))]
    pub async fn update_profile(
        &self,
        id: SessionId,
        update: ProfileUpdate,
    ) -> Result<OrderSession, SessionError> {
        debug!(?update, "update_profile called");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    /// Clears the cart and starts a new order. Any submission in flight
    /// becomes stale.
    #[instrument(skip(self))]
    pub async fn reset(&self, id: SessionId) -> Result<(), SessionError> {
        match self.action(id, SessionAction::Reset).await? {
            SessionActionResult::Reset(()) => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Drops the session. Its cart is discarded.
    pub async fn abandon(&self, id: SessionId) -> Result<(), SessionError> {
        self.delete(id).await
    }

    /// Validates the session, hands the frozen order to the notifier and
    /// records the outcome.
    ///
    /// On success the session is `Confirmed` and the order is returned. On
    /// notifier failure, rejection or timeout the session is back in
    /// `Editing` with a retry notice and [`SessionError::Submission`] is
    /// returned. If this future is dropped mid-flight the attempt is reported
    /// as abandoned.
    #[instrument(skip(self))]
    pub async fn submit_order(&self, id: SessionId, today: NaiveDate) -> Result<Order, SessionError> {
        let attempt = AttemptId::next();
        let checkout = SessionAction::BeginCheckout {
            attempt,
            today,
            submitted_at: Utc::now(),
        };
        // Armed before the send: the session may enter `Submitting` even if
        // this future never sees the reply.
        let mut guard = SubmissionGuard::new(self.inner.clone(), id, attempt);
        let order = match self.action(id, checkout).await {
            Ok(SessionActionResult::BeginCheckout(Submission { order, .. })) => order,
            Ok(other) => {
                guard.disarm();
                return Err(unexpected(other));
            }
            Err(e) => {
                guard.disarm();
                return Err(e);
            }
        };
        info!(order_number = %order.order_number, %attempt, "Submitting order");

        let outcome =
            tokio::time::timeout(self.submit_timeout, self.notifier.submit_order(&order)).await;

        let reason = match outcome {
            Ok(Ok(receipt)) if receipt.accepted => {
                let confirmed = self
                    .action(id, SessionAction::ConfirmSubmission { attempt, receipt })
                    .await;
                guard.disarm();
                return match confirmed? {
                    SessionActionResult::ConfirmSubmission(order) => {
                        info!(order_number = %order.order_number, "Order confirmed");
                        Ok(order)
                    }
                    other => Err(unexpected(other)),
                };
            }
            Ok(Ok(_)) => "the order was not accepted".to_string(),
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("no response within {}s", self.submit_timeout.as_secs()),
        };

        warn!(%attempt, %reason, "Order submission failed");
        let failed = self
            .action(
                id,
                SessionAction::FailSubmission {
                    attempt,
                    reason: reason.clone(),
                },
            )
            .await;
        guard.disarm();
        failed?;
        Err(SessionError::Submission(reason))
    }
}

/// Reports an in-flight attempt as abandoned if the submitting future is
/// dropped before the outcome is recorded.
struct SubmissionGuard {
    client: Option<ResourceClient<OrderSession>>,
    id: SessionId,
    attempt: AttemptId,
}

impl SubmissionGuard {
    fn new(client: ResourceClient<OrderSession>, id: SessionId, attempt: AttemptId) -> Self {
        Self {
            client: Some(client),
            id,
            attempt,
        }
    }

    fn disarm(&mut self) {
        self.client = None;
    }
}

impl Drop for SubmissionGuard {
    fn drop(&mut self) {
        let Some(client) = self.client.take() else {
            return;
        };
        let (id, attempt) = (self.id, self.attempt);
        warn!(session_id = %id, %attempt, "Submission abandoned");
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                let action = SessionAction::FailSubmission {
                    attempt,
                    reason: "submission abandoned".to_string(),
                };
                if let Err(e) = client.perform_action(id, action).await {
                    debug!(session_id = %id, error = %e, "Abandoned attempt already settled");
                }
            });
        }
    }
}
