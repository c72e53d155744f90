//! Stderr notification sink.
//!
//! Stand-in for a push-message delivery channel. Writing to stderr cannot
//! meaningfully fail, which matches the best-effort contract: a real
//! messaging adapter would log its own delivery failures here too.

use crate::ports::notify_port::NotificationSink;

#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl NotificationSink for ConsoleNotifier {
    fn send(&self, text: &str) {
        eprintln!("[notify] {text}");
    }
}
