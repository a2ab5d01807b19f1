use crate::model::OrderNumber;
use std::sync::atomic::{AtomicI64, Ordering};

/// Hands out `ORD-<unix millis>` numbers that never repeat within the process,
/// even when two orders are placed in the same millisecond.
#[derive(Debug, Default)]
pub struct OrderNumberGenerator {
    last: AtomicI64,
}

impl OrderNumberGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `now_millis` unless it is not after the last number issued.
    pub fn next(&self, now_millis: i64) -> OrderNumber {
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now_millis.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        OrderNumber::from_millis(now_millis.max(previous + 1))
    }
}
