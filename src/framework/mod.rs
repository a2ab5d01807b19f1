//! Generic actor framework hosting the storefront's order sessions.
//!
//! - [`ActorEntity`] - Trait an entity implements to be hosted
//! - [`ResourceActor`] - Sequential actor owning the entities
//! - [`ResourceClient`] - Cloneable, typed handle to the actor
//! - [`FrameworkError`] - Transport and entity errors
//!
//! See [`mock`] for testing clients without running an actor.

pub mod core;
pub mod mock;

pub use core::*;
