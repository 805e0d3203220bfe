//! ZilStream portfolio tracker.
//!
//! Main application that orchestrates all components:
//! - Wallet connection through the configured providers
//! - Scheduled token, rate, block height and balance polling
//! - The single dispatch loop owning the state store
//! - Price alert evaluation and notifications
//! - Local persistence of account, alerts, settings and favorites
//! - CLI tables and the dashboard server

pub mod app;
pub mod config;
pub mod error;
pub mod render;
pub mod scheduler;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use scheduler::Scheduler;
