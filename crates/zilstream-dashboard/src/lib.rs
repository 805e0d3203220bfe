//! zilstream-dashboard - live portfolio view for zilstream.
//!
//! - REST API for the current portfolio snapshot
//! - WebSocket with periodic updates
//! - Prometheus metrics endpoint
//! - Static HTML page
//!
//! ```text
//!   StoreHandle ──► DashboardState ──► axum server (127.0.0.1:8080)
//!                                        GET /              static page
//!                                        GET /api/snapshot  JSON snapshot
//!                                        GET /metrics       Prometheus text
//!                                        GET /ws            snapshot + updates
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use zilstream_dashboard::{run_server, DashboardConfig, DashboardState};
//!
//! let state = DashboardState::new(store.clone());
//! tokio::spawn(async move {
//!     if let Err(e) = run_server(state, DashboardConfig::default()).await {
//!         tracing::error!(error = %e, "Dashboard server failed");
//!     }
//! });
//! ```

mod broadcast;
mod config;
mod server;
mod state;
mod types;

pub use config::{DashboardAuth, DashboardConfig};
pub use server::{create_router, run_server, AppState};
pub use state::DashboardState;
pub use types::{AlertSnapshot, DashboardMessage, DashboardSnapshot};
