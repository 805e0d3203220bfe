//! Price alerts for ZilStream.
//!
//! `AlertEvaluator` checks untriggered alerts against current token rates
//! after every token refresh and hands fired alerts to a `Notifier`.

pub mod evaluator;
pub mod notifier;

pub use evaluator::{alert_notification, current_value, AlertEvaluator, FiredAlert};
pub use notifier::{Notifier, TracingNotifier};
