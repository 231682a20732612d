//! Low-battery detection and notification service
//!
//! This crate implements the battery monitor: a check service that scans
//! all known entity states for battery sensors at or below a configurable
//! threshold and sends one batched, templated notification through a
//! configurable notify service. Repeat notifications for the same entity
//! are suppressed for a configurable cooldown interval.
//!
//! The pipeline runs Scanner -> Gate -> Dispatcher synchronously per
//! invocation of `battery_monitor.check_batteries`:
//!
//! - [`scanner`] filters the state snapshot down to valid battery sensors
//! - [`cooldown`] applies the threshold and per-entity cooldown bookkeeping
//! - [`notify`] renders the title/message templates and makes the single
//!   notify service call
//!
//! Cooldown state lives in a [`NotificationLog`], volatile process-wide
//! memory keyed by entity id. Invocations are expected to be serialized by
//! the host; the log is only read and written inside the gate.

pub mod config;
pub mod cooldown;
mod error;
pub mod notify;
pub mod scanner;
pub mod service;

use std::sync::Arc;

use bm_service_registry::ServiceRegistry;
use bm_state_store::StateStore;
use bm_template::TemplateEngine;

pub use config::CheckConfig;
pub use cooldown::NotificationLog;
pub use error::CheckError;
pub use scanner::BatteryDevice;

/// Domain under which the check service is registered
pub const DOMAIN: &str = "battery_monitor";

/// Name of the check service
pub const SERVICE_CHECK_BATTERIES: &str = "check_batteries";

/// Set up the battery monitor
///
/// Creates the notification log and template engine and registers the
/// `battery_monitor.check_batteries` service on the registry. Returns the
/// notification log so callers (and tests) can inspect or seed cooldown
/// state.
pub fn setup(states: Arc<StateStore>, services: &Arc<ServiceRegistry>) -> Arc<NotificationLog> {
    let engine = Arc::new(TemplateEngine::new());
    let log = Arc::new(NotificationLog::new());

    service::register_check_service(services, states, engine, log.clone());

    log
}

/// Tear down the battery monitor, unregistering the check service
pub fn teardown(services: &ServiceRegistry) -> bool {
    services.unregister(DOMAIN, SERVICE_CHECK_BATTERIES)
}
