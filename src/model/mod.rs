//! Plain data shared by the catalog, the session actor and the notifier.
//!
//! Nothing in here talks to an actor. [`OrderSession`](crate::session_actor::OrderSession)
//! is the only entity; these are the values it holds and hands out.

pub mod cart;
pub mod customer;
pub mod meal;
pub mod order;
pub mod subscription;

pub use cart::*;
pub use customer::*;
pub use meal::*;
pub use order::*;
pub use subscription::*;
