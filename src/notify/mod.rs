//! The outbound collaborator that receives finalized orders and mailing-list
//! signups.
//!
//! - [`ResendNotifier`] - sends email through the Resend REST API
//! - [`LogNotifier`] - logs and accepts, for local runs without an API key
//! - [`mock::MockNotifier`] - scripted test double

pub mod log;
pub mod mock;
pub mod resend;

pub use self::log::LogNotifier;
pub use self::resend::{ResendConfig, ResendNotifier};

use crate::model::{Order, Receipt, Subscription};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("Rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Notifier unavailable: {0}")]
    Unavailable(String),
}

/// Delivers orders and signups. Called once per attempt; never retried here.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn submit_order(&self, order: &Order) -> Result<Receipt, NotifyError>;

    async fn subscribe(&self, subscription: &Subscription) -> Result<Receipt, NotifyError>;
}
