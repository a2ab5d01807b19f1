use crate::model::{Order, Receipt, Subscription};
use crate::notify::{Notifier, NotifyError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Accepts everything after an optional artificial delay.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier {
    latency: Duration,
}

impl LogNotifier {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn submit_order(&self, order: &Order) -> Result<Receipt, NotifyError> {
        debug!(?order, "submit_order called");
        tokio::time::sleep(self.latency).await;
        info!(
            order_number = %order.order_number,
            lines = order.lines.len(),
            total = %order.price.total,
            "Order accepted"
        );
        Ok(Receipt::accepted(order.order_number.to_string()))
    }

    async fn subscribe(&self, subscription: &Subscription) -> Result<Receipt, NotifyError> {
        debug!(?subscription, "subscribe called");
        tokio::time::sleep(self.latency).await;
        info!(first_name = %subscription.first_name, "Subscriber accepted");
        Ok(Receipt::accepted(format!("subscriber:{}", subscription.email)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_waits_for_latency_then_accepts() {
        let notifier = LogNotifier::new(Duration::from_millis(20));
        let started = tokio::time::Instant::now();

        let receipt = notifier
            .subscribe(&Subscription::new("Mae", "mae@example.com"))
            .await
            .unwrap();

        assert!(receipt.accepted);
        assert_eq!(receipt.reference_id.as_deref(), Some("subscriber:mae@example.com"));
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
