//! Common test utilities for the battery monitor
//!
//! Provides an isolated runtime with the battery monitor set up against a
//! real state store and service registry, plus a capturing notify service
//! for assertions.

use battery_monitor::NotificationLog;
use bm_core::{Context, EntityId, ServiceCall, SupportsResponse};
use bm_service_registry::{ServiceRegistry, ServiceResult};
use bm_state_store::StateStore;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A test runtime with captured notifications
pub struct TestRuntime {
    /// State store for entity states
    pub states: Arc<StateStore>,
    /// Service registry with the check service registered
    pub services: Arc<ServiceRegistry>,
    /// The monitor's notification log, for seeding cooldown state
    pub log: Arc<NotificationLog>,
    /// Captured notify.mobile_app calls
    notifications: Arc<Mutex<Vec<ServiceCall>>>,
}

impl TestRuntime {
    /// Create a runtime with the monitor set up and `notify.mobile_app`
    /// registered as a capturing sink
    pub fn new() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let states = Arc::new(StateStore::new());
        let services = Arc::new(ServiceRegistry::new());
        let log = battery_monitor::setup(states.clone(), &services);

        let notifications = Arc::new(Mutex::new(Vec::new()));
        let captured = notifications.clone();
        services.register(
            "notify",
            "mobile_app",
            move |call: ServiceCall| {
                let captured = captured.clone();
                async move {
                    captured.lock().unwrap().push(call);
                    Ok(None)
                }
            },
            None,
            SupportsResponse::None,
        );

        Self {
            states,
            services,
            log,
            notifications,
        }
    }

    /// Set an entity state with arbitrary attributes
    pub fn set_state(
        &self,
        entity_id: &str,
        value: &str,
        attributes: HashMap<String, serde_json::Value>,
    ) {
        let entity_id: EntityId = entity_id.parse().expect("invalid entity_id");
        self.states.set(entity_id, value, attributes, Context::new());
    }

    /// Set a battery sensor state with an optional friendly name
    pub fn set_battery(&self, entity_id: &str, value: &str, friendly_name: Option<&str>) {
        let mut attributes =
            HashMap::from([("device_class".to_string(), json!("battery"))]);
        if let Some(name) = friendly_name {
            attributes.insert("friendly_name".to_string(), json!(name));
        }
        self.set_state(entity_id, value, attributes);
    }

    /// Invoke battery_monitor.check_batteries with the given payload
    pub async fn check(&self, payload: serde_json::Value) -> ServiceResult {
        self.check_with_context(payload, Context::new()).await
    }

    /// Invoke the check service with a specific context
    pub async fn check_with_context(
        &self,
        payload: serde_json::Value,
        context: Context,
    ) -> ServiceResult {
        self.services
            .call(
                battery_monitor::DOMAIN,
                battery_monitor::SERVICE_CHECK_BATTERIES,
                payload,
                context,
                false,
            )
            .await
    }

    /// All captured notify calls, in dispatch order
    pub fn notifications(&self) -> Vec<ServiceCall> {
        self.notifications.lock().unwrap().clone()
    }
}

impl Default for TestRuntime {
    fn default() -> Self {
        Self::new()
    }
}
