use crate::catalog::Catalog;
use crate::clients::{SessionClient, SubscriptionClient, DEFAULT_SUBMIT_TIMEOUT};
use crate::notify::{LogNotifier, Notifier};
use crate::session_actor::SessionContext;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// The running storefront: the session actor plus the clients that front it.
///
/// # Example
///
/// ```ignore
/// let store = Storefront::new();
/// let session = store.session_client.open_session().await?;
/// store.session_client.add_line(session, MealId(1), PortionSize::Regular).await?;
/// store.shutdown().await?;
/// ```
pub struct Storefront {
    pub session_client: SessionClient,
    pub subscription_client: SubscriptionClient,
    pub catalog: Arc<Catalog>,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl Default for Storefront {
    fn default() -> Self {
        Self::new()
    }
}

impl Storefront {
    /// Weekly menu, log-only notifier, default submit timeout.
    pub fn new() -> Self {
        Self::start(
            Catalog::weekly_menu(),
            Arc::new(LogNotifier::default()),
            DEFAULT_SUBMIT_TIMEOUT,
        )
    }

    /// Spawns the session actor with `catalog` injected into its context.
    /// Must be called inside a Tokio runtime.
    pub fn start(catalog: Catalog, notifier: Arc<dyn Notifier>, submit_timeout: Duration) -> Self {
        let catalog = Arc::new(catalog);
        let (session_actor, generic_client) = crate::session_actor::new();
        let handle = tokio::spawn(session_actor.run(SessionContext::new(catalog.clone())));

        info!(meals = catalog.list().len(), ?submit_timeout, "Storefront started");
        Self {
            session_client: SessionClient::new(generic_client, notifier.clone(), submit_timeout),
            subscription_client: SubscriptionClient::new(notifier),
            catalog,
            handles: vec![handle],
        }
    }

    /// Drops the clients so the actor loop ends, then waits for it.
    ///
    /// Clones of `session_client` held elsewhere keep the actor alive; drop
    /// them first.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down storefront...");
        drop(self.session_client);
        drop(self.subscription_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("Storefront shutdown complete.");
        Ok(())
    }
}
