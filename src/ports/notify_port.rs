//! Notification delivery port.

/// Best-effort, fire-and-forget message delivery.
///
/// The signature is infallible on purpose: adapters log delivery problems
/// on their side and never propagate them into core logic.
pub trait NotificationSink {
    fn send(&self, text: &str);
}
