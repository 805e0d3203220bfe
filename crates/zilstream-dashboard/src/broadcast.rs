//! WebSocket broadcast.
//!
//! Collects a snapshot at a fixed interval and sends it to every connected
//! client. New notifications are pushed as their own message first.

use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::state::DashboardState;
use crate::types::DashboardMessage;

pub async fn run_broadcaster(
    state: DashboardState,
    tx: broadcast::Sender<String>,
    every: Duration,
) {
    let mut interval = tokio::time::interval(every);
    let mut last_notification = state.latest_notification().map(|n| n.created_at);

    loop {
        interval.tick().await;

        if let Some(n) = state.latest_notification() {
            if last_notification != Some(n.created_at) {
                last_notification = Some(n.created_at);
                send(
                    &tx,
                    &DashboardMessage::Notification {
                        timestamp_ms: n.created_at.timestamp_millis(),
                        title: n.title,
                        body: n.body,
                    },
                );
            }
        }

        let snapshot = state.collect_snapshot();
        send(
            &tx,
            &DashboardMessage::Update {
                timestamp_ms: snapshot.timestamp_ms,
                portfolio: snapshot.portfolio,
                alerts: Some(snapshot.alerts),
            },
        );
    }
}

fn send(tx: &broadcast::Sender<String>, msg: &DashboardMessage) {
    match serde_json::to_string(msg) {
        Ok(json) => match tx.send(json) {
            Ok(n) => trace!(receivers = n, "Broadcast update sent"),
            // No receivers while no client is connected
            Err(_) => trace!("No WebSocket receivers connected"),
        },
        Err(e) => debug!(error = %e, "Failed to serialize dashboard update"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zilstream_core::Notification;
    use zilstream_store::{Action, StoreHandle};

    #[tokio::test]
    async fn test_broadcaster_sends_notification_then_update() {
        let store = StoreHandle::default();
        let state = DashboardState::new(store.clone());
        let (tx, mut rx) = broadcast::channel::<String>(16);

        let task = tokio::spawn(run_broadcaster(state, tx, Duration::from_millis(10)));

        let first = rx.recv().await.unwrap();
        assert!(first.contains("\"type\":\"update\""));

        store.dispatch(Action::NotificationPushed(Notification::new("GZIL: 6 ZIL", "body")));
        loop {
            let msg = rx.recv().await.unwrap();
            if msg.contains("\"type\":\"notification\"") {
                assert!(msg.contains("GZIL: 6 ZIL"));
                break;
            }
        }
        task.abort();
    }
}
