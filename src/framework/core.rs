//! # Core Actor Framework
//!
//! Generic building blocks for hosting stateful entities behind a message loop.
//! The storefront uses them to host every visitor's order session.
//!
//! ## Key Types
//!
//! - [`ActorEntity`]: The trait an entity implements to be hosted.
//! - [`ResourceActor`]: The task that owns the entities and processes requests one at a time.
//! - [`ResourceClient`]: The cloneable handle used to talk to the actor.
//! - [`FrameworkError`]: Transport errors plus the boxed entity error.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

// =============================================================================
// 1. THE ABSTRACTION
// =============================================================================

/// Trait that any entity must implement to be managed by [`ResourceActor`].
///
/// Associated types pin down the payload of every request, so a session can
/// only ever receive session actions and session profile updates.
///
/// # Async & Context
/// Hooks are `async` and receive the `Context` handed to [`ResourceActor::run`].
/// Dependencies (the catalog, the order-number source) are bound when the loop
/// starts rather than when the actor is constructed.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// Identifier generated by the actor from a running `u32` counter.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + From<u32>;

    /// Payload used to create a new instance.
    type Create: Send + Sync + Debug;

    /// Payload used to update an existing instance.
    type Update: Send + Sync + Debug;

    /// Entity-specific operations.
    type Action: Send + Sync + Debug;

    /// Result of an [`ActorEntity::Action`].
    type ActionResult: Send + Sync + Debug;

    /// Dependencies injected into every hook. Use `()` when there are none.
    type Context: Send + Sync;

    /// One error enum for the whole entity.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Build the entity from its id and creation payload.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Called after construction, before the entity is stored.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Apply an update. Changes made before an error is returned are kept.
    async fn on_update(&mut self, update: Self::Update, ctx: &Self::Context)
        -> Result<(), Self::Error>;

    /// Called before the entity is removed.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Handle an entity-specific action. Like [`ActorEntity::on_update`], an
    /// action may record state and still fail.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}

// =============================================================================
// 2. MESSAGES & ERRORS
// =============================================================================

/// Errors surfaced by [`ResourceClient`].
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
}

impl FrameworkError {
    /// Recover the entity's own error type.
    ///
    /// Returns `Err(self)` for transport errors and for entity errors of a
    /// different type.
    pub fn downcast_entity<E>(self) -> Result<E, FrameworkError>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        match self {
            FrameworkError::EntityError(inner) => match inner.downcast::<E>() {
                Ok(typed) => Ok(*typed),
                Err(other) => Err(FrameworkError::EntityError(other)),
            },
            other => Err(other),
        }
    }
}

/// One-shot reply channel.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Requests accepted by a [`ResourceActor`]: the CRUD lifecycle plus `Action`.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}

// =============================================================================
// 3. THE ACTOR
// =============================================================================

/// Owns a store of entities and processes requests sequentially.
///
/// Because a single task owns `store`, no entity is ever touched by two
/// requests at once and no lock is needed.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_id: u32,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates the actor and its client. `buffer_size` bounds the request queue.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id: 1,
        };
        (actor, ResourceClient::new(sender))
    }

    /// Runs the event loop until every client has been dropped.
    pub async fn run(mut self, context: T::Context) {
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let id = T::Id::from(self.next_id);
                    self.next_id += 1;

                    let created = match T::from_create_params(id.clone(), params) {
                        Ok(mut item) => item.on_create(&context).await.map(|()| item),
                        Err(e) => Err(e),
                    };
                    match created {
                        Ok(item) => {
                            self.store.insert(id.clone(), item);
                            info!(entity_type, %id, size = self.store.len(), "Created");
                            let _ = respond_to.send(Ok(id));
                        }
                        Err(e) => {
                            warn!(entity_type, error = %e, "Create failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        }
                    }
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    debug!(entity_type, %id, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?update, "Update");
                    let Some(item) = self.store.get_mut(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    match item.on_update(update, &context).await {
                        Ok(()) => {
                            info!(entity_type, %id, "Updated");
                            let _ = respond_to.send(Ok(item.clone()));
                        }
                        Err(e) => {
                            warn!(entity_type, %id, error = %e, "Update failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        }
                    }
                }
                ResourceRequest::Delete { id, respond_to } => {
                    debug!(entity_type, %id, "Delete");
                    let Some(item) = self.store.get(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    if let Err(e) = item.on_delete(&context).await {
                        warn!(entity_type, %id, error = %e, "on_delete failed");
                        let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        continue;
                    }
                    self.store.remove(&id);
                    info!(entity_type, %id, size = self.store.len(), "Deleted");
                    let _ = respond_to.send(Ok(()));
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    let Some(item) = self.store.get_mut(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    let result = item
                        .handle_action(action, &context)
                        .await
                        .map_err(|e| FrameworkError::EntityError(Box::new(e)));
                    match &result {
                        Ok(_) => info!(entity_type, %id, "Action ok"),
                        Err(e) => warn!(entity_type, %id, error = %e, "Action failed"),
                    }
                    let _ = respond_to.send(result);
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }
}

// =============================================================================
// 4. THE CLIENT
// =============================================================================

/// Cloneable handle for a [`ResourceActor`]. Holds only the sender half.
#[derive(Clone)]
pub struct ResourceClient<T: ActorEntity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: ActorEntity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, params: T::Create) -> Result<T::Id, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Create { params, respond_to })
            .await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to })
            .await
    }

    pub async fn update(&self, id: T::Id, update: T::Update) -> Result<T, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Update {
            id,
            update,
            respond_to,
        })
        .await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to })
            .await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Action {
            id,
            action,
            respond_to,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Counter {
        id: u32,
        label: String,
        value: i64,
    }

    #[derive(Debug)]
    struct CounterCreate {
        label: String,
    }

    #[derive(Debug)]
    struct CounterUpdate {
        label: Option<String>,
    }

    #[derive(Debug)]
    enum CounterAction {
        Add(i64),
        FailAfterAdd(i64),
    }

    #[derive(Debug, thiserror::Error, PartialEq)]
    enum CounterError {
        #[error("label must not be empty")]
        EmptyLabel,
        #[error("rejected after recording {0}")]
        Rejected(i64),
    }

    #[async_trait]
    impl ActorEntity for Counter {
        type Id = u32;
        type Create = CounterCreate;
        type Update = CounterUpdate;
        type Action = CounterAction;
        type ActionResult = i64;
        type Context = ();
        type Error = CounterError;

        fn from_create_params(id: u32, params: CounterCreate) -> Result<Self, Self::Error> {
            if params.label.is_empty() {
                return Err(CounterError::EmptyLabel);
            }
            Ok(Self {
                id,
                label: params.label,
                value: 0,
            })
        }

        async fn on_update(&mut self, update: CounterUpdate, _ctx: &()) -> Result<(), Self::Error> {
            if let Some(label) = update.label {
                self.label = label;
            }
            Ok(())
        }

        async fn handle_action(&mut self, action: CounterAction, _ctx: &()) -> Result<i64, Self::Error> {
            match action {
                CounterAction::Add(n) => {
                    self.value += n;
                    Ok(self.value)
                }
                CounterAction::FailAfterAdd(n) => {
                    self.value += n;
                    Err(CounterError::Rejected(self.value))
                }
            }
        }
    }

    #[tokio::test]
    async fn test_resource_actor_lifecycle() {
        let (actor, client) = ResourceActor::<Counter>::new(8);
        tokio::spawn(actor.run(()));

        let id = client
            .create(CounterCreate {
                label: "cart".into(),
            })
            .await
            .unwrap();
        assert_eq!(id, 1);

        assert_eq!(client.perform_action(id, CounterAction::Add(2)).await.unwrap(), 2);

        let updated = client
            .update(id, CounterUpdate {
                label: Some("basket".into()),
            })
            .await
            .unwrap();
        assert_eq!(updated.label, "basket");
        assert_eq!(updated.value, 2);

        client.delete(id).await.unwrap();
        assert!(client.get(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_action_keeps_recorded_state() {
        let (actor, client) = ResourceActor::<Counter>::new(8);
        tokio::spawn(actor.run(()));

        let id = client
            .create(CounterCreate {
                label: "cart".into(),
            })
            .await
            .unwrap();

        let err = client
            .perform_action(id, CounterAction::FailAfterAdd(5))
            .await
            .unwrap_err();
        assert_eq!(err.downcast_entity::<CounterError>().unwrap(), CounterError::Rejected(5));

        let stored = client.get(id).await.unwrap().unwrap();
        assert_eq!(stored.value, 5);
    }

    #[tokio::test]
    async fn test_create_error_and_unknown_id() {
        let (actor, client) = ResourceActor::<Counter>::new(8);
        tokio::spawn(actor.run(()));

        let err = client
            .create(CounterCreate {
                label: String::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.downcast_entity::<CounterError>().unwrap(), CounterError::EmptyLabel);

        let err = client
            .perform_action(42, CounterAction::Add(1))
            .await
            .unwrap_err();
        assert!(matches!(err, FrameworkError::NotFound(ref id) if id == "42"));
        assert!(matches!(
            err.downcast_entity::<CounterError>(),
            Err(FrameworkError::NotFound(_))
        ));
    }
}
