//! Command-line and environment configuration for the storefront.

use crate::catalog::{Catalog, CatalogError};
use crate::catalog::Preferences;
use crate::notify::{LogNotifier, Notifier, ResendConfig, ResendNotifier};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Meal-ordering storefront: browse the weekly menu, place an order and join
/// the mailing list.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Config {
    /// Resend API key. Without it orders and signups are only logged.
    #[arg(long, env = "RESEND_API_KEY", hide_env_values = true)]
    pub resend_api_key: Option<String>,

    /// Sender address for outgoing email
    #[arg(
        long,
        env = "RESEND_FROM_EMAIL",
        default_value = "HoneyByJasmine <onboarding@resend.dev>"
    )]
    pub from_email: String,

    /// Store inbox notified of every order and signup
    #[arg(long, env = "RESEND_NOTIFICATION_EMAIL")]
    pub notification_email: Option<String>,

    /// Shop owner's address, notified alongside the store inbox
    #[arg(long, env = "RESEND_JASMINE_EMAIL")]
    pub owner_email: Option<String>,

    #[arg(long, env = "RESEND_API_URL", default_value = "https://api.resend.com")]
    pub resend_api_url: String,

    /// Seconds to wait for the notifier before failing a submission
    #[arg(long, env = "SUBMIT_TIMEOUT_SECS", default_value_t = 20)]
    pub submit_timeout_secs: u64,

    /// Artificial delay for the log-only notifier, in milliseconds
    #[arg(long, env = "SIMULATED_LATENCY_MS", default_value_t = 0)]
    pub simulated_latency_ms: u64,

    /// JSON file with the menu. Defaults to the built-in weekly menu.
    #[arg(long)]
    pub menu: Option<PathBuf>,

    /// Only show meals with this dietary tag (repeatable, any match)
    #[arg(long = "prefer")]
    pub prefer: Vec<String>,

    /// Hide meals containing this allergen (repeatable)
    #[arg(long = "avoid")]
    pub avoid: Vec<String>,

    /// Also sign this address up for the mailing list
    #[arg(long)]
    pub subscribe_email: Option<String>,

    /// Enable verbose logging{n}[SETS env: RUST_LOG=debug]
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Fills in `RUST_LOG` when unset: `debug` with `--verbose`, else `info`.
    /// Call before [`setup_tracing`](crate::lifecycle::setup_tracing).
    pub fn apply_log_level(&self) {
        if self.verbose && std::env::var_os("RUST_LOG").is_none() {
            std::env::set_var("RUST_LOG", "debug");
        } else if std::env::var_os("RUST_LOG").is_none() {
            std::env::set_var("RUST_LOG", "info");
        }
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs)
    }

    pub fn preferences(&self) -> Preferences {
        Preferences::new(self.prefer.iter().cloned(), self.avoid.iter().cloned())
    }

    pub fn catalog(&self) -> Result<Catalog, String> {
        let Some(path) = &self.menu else {
            return Ok(Catalog::weekly_menu());
        };
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read menu {}: {e}", path.display()))?;
        Catalog::from_json(&json).map_err(|e: CatalogError| e.to_string())
    }

    /// Addresses notified of every order and signup, store inbox first.
    /// Blank values are skipped.
    pub fn owner_recipients(&self) -> Vec<String> {
        [&self.notification_email, &self.owner_email]
            .into_iter()
            .flatten()
            .map(|address| address.trim())
            .filter(|address| !address.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Resend when an API key is configured, otherwise the log notifier.
    pub fn notifier(&self) -> Arc<dyn Notifier> {
        match &self.resend_api_key {
            Some(api_key) if !api_key.trim().is_empty() => {
                Arc::new(ResendNotifier::new(ResendConfig {
                    api_key: api_key.clone(),
                    base_url: self.resend_api_url.clone(),
                    from: self.from_email.clone(),
                    owners: self.owner_recipients(),
                }))
            }
            _ => Arc::new(LogNotifier::new(Duration::from_millis(
                self.simulated_latency_ms,
            ))),
        }
    }
}
