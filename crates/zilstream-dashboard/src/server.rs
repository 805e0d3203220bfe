//! HTTP server implementation using axum.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures_util::stream::StreamExt;
use futures_util::SinkExt;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use zilstream_telemetry::encode_metrics;

use crate::config::{DashboardAuth, DashboardConfig};
use crate::state::DashboardState;
use crate::types::{DashboardMessage, DashboardSnapshot};

/// Caps concurrent WebSocket connections.
pub struct ConnectionLimiter {
    current: AtomicUsize,
    max: usize,
}

impl ConnectionLimiter {
    pub fn new(max: usize) -> Self {
        Self {
            current: AtomicUsize::new(0),
            max,
        }
    }

    /// Take a slot; released when the guard drops.
    pub fn try_acquire(self: &Arc<Self>) -> Option<ConnectionGuard> {
        loop {
            let current = self.current.load(Ordering::Acquire);
            if current >= self.max {
                return None;
            }
            if self
                .current
                .compare_exchange(current, current + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return Some(ConnectionGuard {
                    limiter: Arc::clone(self),
                });
            }
        }
    }

    pub fn current_count(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }
}

pub struct ConnectionGuard {
    limiter: Arc<ConnectionLimiter>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.limiter.current.fetch_sub(1, Ordering::Release);
    }
}

/// Shared application state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    dashboard_state: DashboardState,
    broadcast_tx: broadcast::Sender<String>,
    connection_limiter: Arc<ConnectionLimiter>,
    config: DashboardConfig,
}

impl AppState {
    pub fn new(
        dashboard_state: DashboardState,
        broadcast_tx: broadcast::Sender<String>,
        config: DashboardConfig,
    ) -> Self {
        Self {
            dashboard_state,
            broadcast_tx,
            connection_limiter: Arc::new(ConnectionLimiter::new(config.max_clients)),
            config,
        }
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        match &self.config.auth {
            Some(auth) if !check_basic_auth(headers, auth) => Err(unauthorized_response()),
            _ => Ok(()),
        }
    }
}

/// Create the axum router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/api/snapshot", get(get_snapshot))
        .route("/metrics", get(get_metrics))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

async fn serve_index(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Html<&'static str>, Response> {
    state.authorize(&headers)?;
    Ok(Html(include_str!("../static/index.html")))
}

async fn get_snapshot(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DashboardSnapshot>, Response> {
    state.authorize(&headers)?;
    Ok(Json(state.dashboard_state.collect_snapshot()))
}

/// Prometheus text exposition.
async fn get_metrics(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }
    match encode_metrics() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics unavailable").into_response()
        }
    }
}

async fn ws_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    if let Err(resp) = state.authorize(&headers) {
        return resp;
    }

    let Some(guard) = state.connection_limiter.try_acquire() else {
        warn!(
            current = state.connection_limiter.current_count(),
            max = state.config.max_clients,
            "WebSocket connection limit reached"
        );
        return (StatusCode::SERVICE_UNAVAILABLE, "Too many connections").into_response();
    };

    info!(
        connections = state.connection_limiter.current_count(),
        "New WebSocket connection"
    );

    ws.on_upgrade(move |socket| handle_ws_connection(socket, state, guard))
}

async fn handle_ws_connection(socket: WebSocket, state: AppState, _guard: ConnectionGuard) {
    let (mut sender, mut receiver) = socket.split();
    let mut broadcast_rx = state.broadcast_tx.subscribe();

    let initial = DashboardMessage::Snapshot(state.dashboard_state.collect_snapshot());
    if let Ok(json) = serde_json::to_string(&initial) {
        if sender.send(Message::Text(json.into())).await.is_err() {
            debug!("Failed to send initial snapshot, client disconnected");
            return;
        }
    }

    // Pings are answered by axum; only watch for close.
    let mut incoming_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Close(_)) => {
                    debug!("Client sent close frame");
                    break;
                }
                Err(e) => {
                    debug!(error = %e, "WebSocket receive error");
                    break;
                }
                _ => {}
            }
        }
    });

    loop {
        tokio::select! {
            result = broadcast_rx.recv() => {
                match result {
                    Ok(msg) => {
                        if sender.send(Message::Text(msg.into())).await.is_err() {
                            debug!("Failed to send message, client disconnected");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "WebSocket client lagged, catching up");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Broadcast channel closed");
                        break;
                    }
                }
            }
            _ = &mut incoming_task => {
                debug!("Incoming task completed, closing connection");
                break;
            }
        }
    }

    incoming_task.abort();
    info!(
        connections = state.connection_limiter.current_count().saturating_sub(1),
        "WebSocket connection closed"
    );
}

fn check_basic_auth(headers: &HeaderMap, auth: &DashboardAuth) -> bool {
    let Some(auth_str) = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        return false;
    };

    let Some(encoded) = auth_str.strip_prefix("Basic ") else {
        return false;
    };

    let decoded = match STANDARD.decode(encoded.trim()) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    decoded == auth.credentials().as_bytes()
}

fn unauthorized_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Basic realm=\"ZilStream\"")],
        "Unauthorized",
    )
        .into_response()
}

/// Run the dashboard HTTP server.
pub async fn run_server(
    dashboard_state: DashboardState,
    config: DashboardConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Slow clients can fall this many updates behind before lagging.
    let (broadcast_tx, _) = broadcast::channel::<String>(32);

    let state = AppState::new(
        dashboard_state.clone(),
        broadcast_tx.clone(),
        config.clone(),
    );
    let app = create_router(state);

    let push_interval = config.push_interval();
    tokio::spawn(async move {
        crate::broadcast::run_broadcaster(dashboard_state, broadcast_tx, push_interval).await;
    });

    let addr = config.socket_addr();
    info!(%addr, "Starting dashboard server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zilstream_store::StoreHandle;

    async fn spawn(config: DashboardConfig) -> String {
        let (tx, _) = broadcast::channel::<String>(4);
        let state = AppState::new(DashboardState::new(StoreHandle::default()), tx, config);
        let app = create_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_connection_limiter() {
        let limiter = Arc::new(ConnectionLimiter::new(2));
        let a = limiter.try_acquire().unwrap();
        let _b = limiter.try_acquire().unwrap();
        assert!(limiter.try_acquire().is_none());
        assert_eq!(limiter.current_count(), 2);

        drop(a);
        assert_eq!(limiter.current_count(), 1);
        assert!(limiter.try_acquire().is_some());
    }

    #[test]
    fn test_basic_auth() {
        let auth = DashboardAuth::new("admin", "secret");
        let mut headers = HeaderMap::new();
        assert!(!check_basic_auth(&headers, &auth));

        let good = format!("Basic {}", STANDARD.encode("admin:secret"));
        headers.insert(header::AUTHORIZATION, good.parse().unwrap());
        assert!(check_basic_auth(&headers, &auth));

        let bad = format!("Basic {}", STANDARD.encode("admin:wrong"));
        headers.insert(header::AUTHORIZATION, bad.parse().unwrap());
        assert!(!check_basic_auth(&headers, &auth));
    }

    #[tokio::test]
    async fn test_snapshot_endpoint() {
        let base = spawn(DashboardConfig::default()).await;
        let body: serde_json::Value = reqwest::get(format!("{base}/api/snapshot"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["network"], "mainnet");
        assert!(body["portfolio"]["balances"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_auth_required_when_configured() {
        let base = spawn(DashboardConfig {
            auth: Some(DashboardAuth::new("admin", "secret")),
            ..Default::default()
        })
        .await;

        let client = reqwest::Client::new();
        let denied = client.get(format!("{base}/api/snapshot")).send().await.unwrap();
        assert_eq!(denied.status(), reqwest::StatusCode::UNAUTHORIZED);

        let allowed = client
            .get(format!("{base}/api/snapshot"))
            .basic_auth("admin", Some("secret"))
            .send()
            .await
            .unwrap();
        assert!(allowed.status().is_success());
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        zilstream_telemetry::Metrics::tokens_tracked(3);
        let base = spawn(DashboardConfig::default()).await;
        let text = reqwest::get(format!("{base}/metrics"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(text.contains("zilstream_tokens_tracked 3"));
    }
}
