//! Transient notifications.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::time::Instant;

/// How long a toast stays on screen.
pub const TOAST_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
struct Shown {
    message: String,
    until: Instant,
}

/// A single-slot, self-dismissing notification.
///
/// Showing a new message replaces the current one and restarts the clock.
/// Dismissal is implied by time passing, so nothing has to be scheduled.
#[derive(Debug, Clone, Default)]
pub struct Toast {
    slot: Arc<RwLock<Option<Shown>>>,
}

impl Toast {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `message` for [`TOAST_DURATION`].
    pub fn show(&self, message: impl Into<String>) {
        self.show_for(message, TOAST_DURATION);
    }

    /// Show `message` for a custom duration.
    pub fn show_for(&self, message: impl Into<String>, duration: Duration) {
        let shown = Shown {
            message: message.into(),
            until: Instant::now() + duration,
        };
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(shown);
    }

    /// The message currently on screen, if it has not expired.
    #[must_use]
    pub fn visible(&self) -> Option<String> {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .filter(|shown| Instant::now() < shown.until)
            .map(|shown| shown.message.clone())
    }

    /// Dismiss the current message early.
    pub fn dismiss(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_toast_auto_dismisses_after_three_seconds() {
        let toast = Toast::new();
        toast.show("Login successful");
        assert_eq!(toast.visible().as_deref(), Some("Login successful"));

        tokio::time::advance(Duration::from_millis(2_999)).await;
        assert!(toast.visible().is_some());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(toast.visible().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_message_restarts_clock() {
        let toast = Toast::new();
        toast.show("first");
        tokio::time::advance(Duration::from_secs(2)).await;

        toast.show("second");
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(toast.visible().as_deref(), Some("second"));

        toast.dismiss();
        assert!(toast.visible().is_none());
    }
}
