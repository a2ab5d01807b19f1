//! Order session resource: the cart, the customer profile and the checkout
//! state machine of one storefront visitor.

mod actions;
pub mod entity;
pub mod error;
mod order_number;

pub use actions::*;
pub use entity::*;
pub use error::*;
pub use order_number::*;

use crate::framework::ResourceActor;

/// Creates a new session actor and its generic client.
///
/// The client is wrapped into a [`SessionClient`](crate::clients::SessionClient)
/// by the caller, which also supplies the notifier.
pub fn new() -> (
    ResourceActor<OrderSession>,
    crate::framework::ResourceClient<OrderSession>,
) {
    ResourceActor::new(64)
}
