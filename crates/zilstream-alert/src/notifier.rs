//! Notification sinks.

use tracing::info;

use zilstream_core::Notification;

/// Receives fired alert notifications.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Logs notifications. History is kept by the store.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        info!(
            title = %notification.title,
            token = ?notification.token_address.as_ref().map(|a| a.as_str()),
            "{}",
            notification.body
        );
    }
}
