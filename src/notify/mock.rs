//! Scripted [`Notifier`] for tests.
//!
//! Responses are queued per call kind and consumed in order. Every order and
//! subscription received is recorded. A call with nothing queued fails with
//! [`NotifyError::Unavailable`] and is reported by [`MockNotifier::verify`].

use crate::model::{Order, Receipt, Subscription};
use crate::notify::{Notifier, NotifyError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

enum Scripted {
    Respond(Result<Receipt, NotifyError>),
    /// Sleeps before answering, for timeout tests.
    Delay(Duration, Result<Receipt, NotifyError>),
}

#[derive(Default)]
struct MockState {
    orders: VecDeque<Scripted>,
    subscriptions: VecDeque<Scripted>,
    received_orders: Vec<Order>,
    received_subscriptions: Vec<Subscription>,
    unexpected: Vec<String>,
}

#[derive(Clone, Default)]
pub struct MockNotifier {
    state: Arc<Mutex<MockState>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_order(&self, response: Result<Receipt, NotifyError>) {
        self.lock().orders.push_back(Scripted::Respond(response));
    }

    pub fn expect_order_after(&self, delay: Duration, response: Result<Receipt, NotifyError>) {
        self.lock().orders.push_back(Scripted::Delay(delay, response));
    }

    pub fn expect_subscription(&self, response: Result<Receipt, NotifyError>) {
        self.lock()
            .subscriptions
            .push_back(Scripted::Respond(response));
    }

    pub fn orders(&self) -> Vec<Order> {
        self.lock().received_orders.clone()
    }

    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.lock().received_subscriptions.clone()
    }

    /// Panics if a call arrived unscripted or a scripted response is unused.
    pub fn verify(&self) {
        let state = self.lock();
        if !state.unexpected.is_empty() {
            panic!("Notifier received unexpected calls: {:?}", state.unexpected);
        }
        let remaining = state.orders.len() + state.subscriptions.len();
        if remaining > 0 {
            panic!("Not all notifier expectations were met. {remaining} remaining");
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

async fn play(scripted: Option<Scripted>) -> Result<Receipt, NotifyError> {
    match scripted {
        Some(Scripted::Respond(response)) => response,
        Some(Scripted::Delay(delay, response)) => {
            tokio::time::sleep(delay).await;
            response
        }
        None => Err(NotifyError::Unavailable("no response scripted".into())),
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn submit_order(&self, order: &Order) -> Result<Receipt, NotifyError> {
        let scripted = {
            let mut state = self.lock();
            state.received_orders.push(order.clone());
            let next = state.orders.pop_front();
            if next.is_none() {
                state.unexpected.push(format!("submit_order {}", order.order_number));
            }
            next
        };
        play(scripted).await
    }

    async fn subscribe(&self, subscription: &Subscription) -> Result<Receipt, NotifyError> {
        let scripted = {
            let mut state = self.lock();
            state.received_subscriptions.push(subscription.clone());
            let next = state.subscriptions.pop_front();
            if next.is_none() {
                state.unexpected.push(format!("subscribe {}", subscription.email));
            }
            next
        };
        play(scripted).await
    }
}
