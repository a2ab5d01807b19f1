//! # Logging
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered
//! by `RUST_LOG`. Targets are hidden; the actor tags its lines with
//! `entity_type` and the session id instead.
//!
//! ```bash
//! RUST_LOG=info cargo run
//! RUST_LOG=debug cargo run   # full payloads at client entry points
//! ```
//!
//! With `info`, one checkout reads roughly:
//!
//! ```text
//! INFO Created id=session_1 size=1
//! INFO Action ok id=session_1
//! INFO Checkout transition session_id=session_1 from=editing to=validating
//! INFO Checkout transition session_id=session_1 from=validating to=submitting order_number=ORD-1736000000000 attempt=attempt_1
//! INFO submit_order: Order accepted order_number=ORD-1736000000000 lines=2 total=31.91
//! INFO Checkout transition session_id=session_1 from=submitting to=confirmed
//! ```

pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
