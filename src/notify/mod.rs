//! Best-effort notification publication.
//!
//! Selected transitions (club created, member added, event spawned) publish a
//! message to a sink. Delivery is fire-and-forget: the trait is infallible by
//! signature so a failing sink can never fail the primary operation.

use serde_json::Value;

/// Receives engine notifications on selected transitions.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, channel: &str, message: Value);
}

/// Default sink: emits notifications to the tracing log.
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn publish(&self, channel: &str, message: Value) {
        tracing::debug!(channel, %message, "notification published");
    }
}
