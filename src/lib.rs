//! # meal-order
//!
//! Core of a small meal-delivery storefront: the weekly menu and its dietary
//! filter, per-visitor order sessions with cart pricing and a checkout state
//! machine, and mailing-list signups.
//!
//! ## Layers
//!
//! - [`framework`]: generic sequential actor ([`ResourceActor`](framework::ResourceActor))
//!   and its typed client, plus a mock for tests.
//! - [`session_actor`]: [`OrderSession`](session_actor::OrderSession), the only
//!   entity. Cart edits and checkout phases are actions on it.
//! - [`clients`]: [`SessionClient`](clients::SessionClient) runs the checkout
//!   against a [`Notifier`](notify::Notifier);
//!   [`SubscriptionClient`](clients::SubscriptionClient) handles signups.
//! - [`lifecycle`]: [`Storefront`](lifecycle::Storefront) wires it all up and
//!   shuts it down.
//! - [`catalog`], [`model`], [`validation`]: plain data and pure functions.
//!
//! Each session is owned by the actor task and changed one message at a time.
//! The notifier call is the only slow step and runs in the caller's task, so a
//! slow email provider never stalls other visitors.

pub mod catalog;
pub mod clients;
pub mod config;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod notify;
pub mod session_actor;
pub mod validation;
