//! # Subscription Client
//!
//! Mailing-list signups. No actor is involved: a signup is validated and
//! handed straight to the notifier.

use crate::model::{Receipt, Subscription};
use crate::notify::{Notifier, NotifyError};
use crate::validation::{validate_subscription, FieldError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("Invalid signup: {}", .0.iter().map(|e| e.message.as_str()).collect::<Vec<_>>().join("; "))]
    Validation(Vec<FieldError>),

    #[error("Signup was not accepted")]
    NotAccepted,

    #[error("Signup failed: {0}")]
    Notify(#[from] NotifyError),
}

#[derive(Clone)]
pub struct SubscriptionClient {
    notifier: Arc<dyn Notifier>,
}

impl SubscriptionClient {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Validates the signup and sends it. Name, email and city are trimmed
    /// before sending; a blank city is dropped.
    #[instrument(skip(self, subscription), fields(email = %subscription.email))]
    pub async fn subscribe(&self, subscription: Subscription) -> Result<Receipt, SubscriptionError> {
        debug!(?subscription, "subscribe called");
        let errors = validate_subscription(&subscription);
        if !errors.is_empty() {
            warn!(errors = errors.len(), "Signup rejected");
            return Err(SubscriptionError::Validation(errors));
        }

        let cleaned = Subscription {
            first_name: subscription.first_name.trim().to_string(),
            email: subscription.email.trim().to_string(),
            city: subscription
                .city
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            preferences: subscription.preferences,
        };

        let receipt = self.notifier.subscribe(&cleaned).await?;
        if !receipt.accepted {
            return Err(SubscriptionError::NotAccepted);
        }
        info!(reference_id = ?receipt.reference_id, "Subscribed");
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DietaryIntake;
    use crate::notify::mock::MockNotifier;
    use crate::validation::Field;

    #[tokio::test]
    async fn test_valid_signup_is_sent_once() {
        let notifier = MockNotifier::new();
        notifier.expect_subscription(Ok(Receipt::accepted("email_9")));
        let client = SubscriptionClient::new(Arc::new(notifier.clone()));

        let signup = Subscription::new(" Jasmine ", "jas@example.com")
            .with_city("  ")
            .with_preferences(DietaryIntake::default());
        let receipt = client.subscribe(signup).await.unwrap();
        assert_eq!(receipt.reference_id.as_deref(), Some("email_9"));

        let sent = notifier.subscriptions();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].first_name, "Jasmine");
        assert_eq!(sent[0].city, None);
        assert!(sent[0].preferences.is_some());
        notifier.verify();
    }

    #[tokio::test]
    async fn test_invalid_signup_never_reaches_notifier() {
        let notifier = MockNotifier::new();
        let client = SubscriptionClient::new(Arc::new(notifier.clone()));

        let result = client.subscribe(Subscription::new("", "not-an-email")).await;
        let Err(SubscriptionError::Validation(errors)) = result else {
            panic!("expected validation errors");
        };
        let fields: Vec<Field> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec![Field::FirstName, Field::Email]);
        assert!(notifier.subscriptions().is_empty());
        notifier.verify();
    }

    #[tokio::test]
    async fn test_notifier_failure_surfaces() {
        let notifier = MockNotifier::new();
        notifier.expect_subscription(Err(NotifyError::Unavailable("down".into())));
        let client = SubscriptionClient::new(Arc::new(notifier.clone()));

        let result = client.subscribe(Subscription::new("Al", "al@example.com")).await;
        assert!(matches!(result, Err(SubscriptionError::Notify(NotifyError::Unavailable(_)))));
    }
}
