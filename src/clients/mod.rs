//! Typed front ends for the storefront: the session actor's client and the
//! mailing-list signup client.

pub mod actor_client;
pub mod session_client;
pub mod subscription_client;

pub use actor_client::ActorClient;
pub use session_client::*;
pub use subscription_client::*;
