//! User-facing notifications.
//!
//! The cart store reports failures through [`Notifier`] and never returns
//! them to the caller. The web layer drains the queued messages on the next
//! render pass and shows them as transient toast fragments.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// Fire-and-forget sink for user-visible error messages.
pub trait Notifier: Send + Sync {
    /// Surface a transient error message to the user.
    fn error(&self, message: &str);
}

/// Queue of pending toast messages, drained by the view on re-render.
#[derive(Debug, Default)]
pub struct ToastQueue {
    pending: Mutex<VecDeque<String>>,
}

impl ToastQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all pending messages, oldest first.
    pub fn drain(&self) -> Vec<String> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }
}

impl Notifier for ToastQueue {
    fn error(&self, message: &str) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_returns_messages_in_order() {
        let toasts = ToastQueue::new();
        toasts.error("first");
        toasts.error("second");

        assert_eq!(toasts.drain(), vec!["first", "second"]);
    }

    #[test]
    fn test_drain_empties_the_queue() {
        let toasts = ToastQueue::new();
        toasts.error("only once");

        assert_eq!(toasts.drain().len(), 1);
        assert!(toasts.drain().is_empty());
    }
}
