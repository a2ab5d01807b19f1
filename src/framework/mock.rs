//! # Mock Client
//!
//! [`MockClient`] hands out a real [`ResourceClient`] whose requests are answered
//! from a queue of expectations instead of by a [`ResourceActor`](super::ResourceActor).
//! It is used to test client-side orchestration (for example the checkout flow
//! in `SessionClient`) without running the session actor.
//!
//! ```rust
//! use meal_order::framework::mock::MockClient;
//! use meal_order::model::SessionId;
//! use meal_order::session_actor::{OrderSession, SessionAction, SessionActionResult};
//! use meal_order::model::PriceBreakdown;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockClient::<OrderSession>::new();
//!     mock.expect_action(SessionId(1))
//!         .return_ok(SessionActionResult::Price(PriceBreakdown::zero()));
//!
//!     let client = mock.client();
//!     let price = client.perform_action(SessionId(1), SessionAction::Price).await.unwrap();
//!     assert!(matches!(price, SessionActionResult::Price(_)));
//!     mock.verify();
//! }
//! ```
//!
//! Mismatches (a request arriving with no matching expectation, or for a
//! different id) are collected and reported by [`MockClient::verify`]; the
//! caller of the mismatched request sees [`FrameworkError::ActorDropped`].

use crate::framework::{ActorEntity, FrameworkError, ResourceClient, ResourceRequest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

enum Expectation<T: ActorEntity> {
    Get {
        id: T::Id,
        response: Result<Option<T>, FrameworkError>,
    },
    Create {
        response: Result<T::Id, FrameworkError>,
    },
    Update {
        id: T::Id,
        response: Result<T, FrameworkError>,
    },
    Delete {
        id: T::Id,
        response: Result<(), FrameworkError>,
    },
    Action {
        id: T::Id,
        response: Result<T::ActionResult, FrameworkError>,
    },
}

struct MockState<T: ActorEntity> {
    expectations: VecDeque<Expectation<T>>,
    actions: Vec<T::Action>,
    failures: Vec<String>,
}

/// A scripted stand-in for a [`ResourceActor`](super::ResourceActor).
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    state: Arc<Mutex<MockState<T>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a mock with no expectations. Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let state = Arc::new(Mutex::new(MockState {
            expectations: VecDeque::new(),
            actions: Vec::new(),
            failures: Vec::new(),
        }));
        let shared = state.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let mut guard = match shared.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                let expectation = guard.expectations.pop_front();

                match (request, expectation) {
                    (ResourceRequest::Get { id, respond_to }, Some(Expectation::Get { id: want, response }))
                        if id == want =>
                    {
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::Create { respond_to, .. }, Some(Expectation::Create { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Update { id, respond_to, .. },
                        Some(Expectation::Update { id: want, response }),
                    ) if id == want => {
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::Delete { id, respond_to }, Some(Expectation::Delete { id: want, response }))
                        if id == want =>
                    {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Action {
                            id,
                            action,
                            respond_to,
                        },
                        Some(Expectation::Action { id: want, response }),
                    ) if id == want => {
                        guard.actions.push(action);
                        let _ = respond_to.send(response);
                    }
                    (request, _) => {
                        let failure = format!("unexpected request: {}", describe(&request));
                        guard.failures.push(failure);
                        // Dropping `request` drops its responder.
                    }
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            state,
            _handle: handle,
        }
    }

    /// A client wired to this mock.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    pub fn expect_get(&mut self, id: T::Id) -> ExpectationBuilder<T, Option<T>> {
        self.builder(move |response| Expectation::Get { id, response })
    }

    pub fn expect_create(&mut self) -> ExpectationBuilder<T, T::Id> {
        self.builder(|response| Expectation::Create { response })
    }

    pub fn expect_update(&mut self, id: T::Id) -> ExpectationBuilder<T, T> {
        self.builder(move |response| Expectation::Update { id, response })
    }

    pub fn expect_delete(&mut self, id: T::Id) -> ExpectationBuilder<T, ()> {
        self.builder(move |response| Expectation::Delete { id, response })
    }

    pub fn expect_action(&mut self, id: T::Id) -> ExpectationBuilder<T, T::ActionResult> {
        self.builder(move |response| Expectation::Action { id, response })
    }

    /// Actions received so far, in arrival order.
    pub fn take_actions(&self) -> Vec<T::Action> {
        std::mem::take(&mut self.lock().actions)
    }

    /// Panics if an expectation is left over or a request did not match.
    pub fn verify(&self) {
        let state = self.lock();
        if !state.failures.is_empty() {
            panic!("Mock received unexpected requests: {:?}", state.failures);
        }
        if !state.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                state.expectations.len()
            );
        }
    }

    fn builder<R: 'static>(
        &mut self,
        make: impl FnOnce(Result<R, FrameworkError>) -> Expectation<T> + Send + 'static,
    ) -> ExpectationBuilder<T, R> {
        ExpectationBuilder {
            state: self.state.clone(),
            make: Box::new(make),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState<T>> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Completes an expectation with the response the mock should send.
pub struct ExpectationBuilder<T: ActorEntity, R> {
    state: Arc<Mutex<MockState<T>>>,
    make: Box<dyn FnOnce(Result<R, FrameworkError>) -> Expectation<T> + Send>,
}

impl<T: ActorEntity, R> ExpectationBuilder<T, R> {
    pub fn return_ok(self, value: R) {
        self.push(Ok(value));
    }

    pub fn return_err(self, error: FrameworkError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<R, FrameworkError>) {
        let expectation = (self.make)(response);
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.expectations.push_back(expectation);
    }
}

fn describe<T: ActorEntity>(request: &ResourceRequest<T>) -> String {
    match request {
        ResourceRequest::Create { params, .. } => format!("Create {params:?}"),
        ResourceRequest::Get { id, .. } => format!("Get {id}"),
        ResourceRequest::Update { id, update, .. } => format!("Update {id} {update:?}"),
        ResourceRequest::Delete { id, .. } => format!("Delete {id}"),
        ResourceRequest::Action { id, action, .. } => format!("Action {id} {action:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Clone, Debug, PartialEq)]
    struct Ticket {
        id: u32,
        seat: String,
    }

    #[derive(Debug)]
    struct TicketCreate;

    #[derive(Debug)]
    enum TicketAction {
        Upgrade,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("ticket error")]
    struct TicketError;

    #[async_trait]
    impl ActorEntity for Ticket {
        type Id = u32;
        type Create = TicketCreate;
        type Update = ();
        type Action = TicketAction;
        type ActionResult = String;
        type Context = ();
        type Error = TicketError;

        fn from_create_params(id: u32, _: TicketCreate) -> Result<Self, Self::Error> {
            Ok(Self {
                id,
                seat: "12A".into(),
            })
        }

        async fn on_update(&mut self, _: (), _: &()) -> Result<(), Self::Error> {
            Ok(())
        }

        async fn handle_action(&mut self, _: TicketAction, _: &()) -> Result<String, Self::Error> {
            Ok(self.seat.clone())
        }
    }

    #[tokio::test]
    async fn test_mock_answers_in_order() {
        let mut mock = MockClient::<Ticket>::new();
        mock.expect_create().return_ok(7);
        mock.expect_get(7).return_ok(Some(Ticket {
            id: 7,
            seat: "1C".into(),
        }));
        mock.expect_action(7).return_ok("1A".into());

        let client = mock.client();
        assert_eq!(client.create(TicketCreate).await.unwrap(), 7);
        assert_eq!(client.get(7).await.unwrap().unwrap().seat, "1C");
        assert_eq!(client.perform_action(7, TicketAction::Upgrade).await.unwrap(), "1A");

        assert!(matches!(mock.take_actions().as_slice(), [TicketAction::Upgrade]));
        mock.verify();
    }

    #[tokio::test]
    async fn test_mock_injects_errors() {
        let mut mock = MockClient::<Ticket>::new();
        mock.expect_get(1).return_err(FrameworkError::ActorClosed);

        let result = mock.client().get(1).await;
        assert!(matches!(result, Err(FrameworkError::ActorClosed)));
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "unexpected request")]
    async fn test_mock_reports_wrong_id() {
        let mut mock = MockClient::<Ticket>::new();
        mock.expect_get(1).return_ok(None);

        let result = mock.client().get(2).await;
        assert!(matches!(result, Err(FrameworkError::ActorDropped)));
        mock.verify();
    }
}
