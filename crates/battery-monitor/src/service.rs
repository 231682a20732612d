//! Registration and handler for the check service

use std::sync::{Arc, Weak};

use bm_core::{ServiceCall, SupportsResponse};
use bm_service_registry::{
    ServiceDescription, ServiceError, ServiceRegistry, ServiceResult,
};
use bm_state_store::StateStore;
use bm_template::TemplateEngine;
use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};

use crate::config::CheckConfig;
use crate::cooldown::{self, NotificationLog};
use crate::{notify, scanner, DOMAIN, SERVICE_CHECK_BATTERIES};

/// Register `battery_monitor.check_batteries` on the service registry
pub fn register_check_service(
    services: &Arc<ServiceRegistry>,
    states: Arc<StateStore>,
    engine: Arc<TemplateEngine>,
    log: Arc<NotificationLog>,
) {
    // The handler dispatches notifications back through the registry it is
    // registered on; hold it weakly so the registry doesn't own itself.
    let registry = Arc::downgrade(services);

    services.register_with_description(
        ServiceDescription {
            domain: DOMAIN.to_string(),
            service: SERVICE_CHECK_BATTERIES.to_string(),
            name: Some("Check batteries".to_string()),
            description: Some(
                "Scan battery sensors and notify about levels at or below the threshold"
                    .to_string(),
            ),
            schema: Some(json!({
                "battery_threshold": {"selector": {"number": {"min": 0, "max": 100}}},
                "notification_interval": {"selector": {"number": {"min": 0}}},
                "filter_regex": {"selector": {"text": {}}},
                "notification_service": {"selector": {"text": {}}},
                "notification_title": {"selector": {"text": {}}},
                "notification_message": {"selector": {"text": {"multiline": true}}},
            })),
            supports_response: SupportsResponse::None,
        },
        move |call: ServiceCall| {
            let states = states.clone();
            let engine = engine.clone();
            let log = log.clone();
            let registry = registry.clone();
            async move { handle_check_batteries(call, states, engine, log, registry).await }
        },
    );

    info!("Battery check service registered");
}

/// Handle one check invocation: Scanner -> Gate -> Dispatcher
async fn handle_check_batteries(
    call: ServiceCall,
    states: Arc<StateStore>,
    engine: Arc<TemplateEngine>,
    log: Arc<NotificationLog>,
    registry: Weak<ServiceRegistry>,
) -> ServiceResult {
    let config =
        CheckConfig::from_call(&call).map_err(|e| ServiceError::InvalidData(e.to_string()))?;
    let filter = config
        .filter()
        .map_err(|e| ServiceError::InvalidData(e.to_string()))?;

    let now = Utc::now();
    let interval = config.interval();

    // Expired records gate identically to missing ones, so this never
    // changes the outcome; it just bounds the log.
    let pruned = log.prune(now, interval);
    if pruned > 0 {
        debug!(pruned, "Pruned expired notification records");
    }

    let snapshot = states.all();
    let candidates = scanner::scan(&snapshot, filter.as_ref());
    let due = cooldown::gate(candidates, config.battery_threshold, interval, &log, now);

    if due.is_empty() {
        debug!("No devices due for notification");
        return Ok(None);
    }

    let registry = registry
        .upgrade()
        .ok_or_else(|| ServiceError::CallFailed("service registry dropped".to_string()))?;

    notify::dispatch(&due, &config, &engine, &registry, call.context.child())
        .await
        .map_err(|e| ServiceError::CallFailed(e.to_string()))?;

    Ok(None)
}
