//! Typed configuration for the check service
//!
//! The service payload is deserialized once at the boundary into
//! [`CheckConfig`], with defaults applied by serde. Unrecognized fields are
//! ignored.

use bm_core::ServiceCall;
use chrono::Duration;
use regex::Regex;
use serde::Deserialize;

use crate::error::CheckError;

/// Default battery threshold (percent)
pub const DEFAULT_THRESHOLD: f64 = 20.0;

/// Default notification cooldown (hours)
pub const DEFAULT_INTERVAL_HOURS: f64 = 24.0;

/// Default notification title
pub const DEFAULT_TITLE: &str = "Low Battery Alert";

/// Default notification message: one bullet line per device
pub const DEFAULT_MESSAGE: &str = "\
The following devices have low battery levels:
{% for device in devices %}
- {{ device.name }}: {{ device.battery_level }}%
{% endfor %}";

/// Configuration of one check invocation
#[derive(Debug, Clone, Deserialize)]
pub struct CheckConfig {
    /// Levels at or below this percentage count as low
    #[serde(default = "default_threshold")]
    pub battery_threshold: f64,

    /// Cooldown between notifications for the same entity, in hours
    #[serde(default = "default_interval")]
    pub notification_interval: f64,

    /// Optional regex restricting which entity ids are considered
    #[serde(default)]
    pub filter_regex: Option<String>,

    /// Target notify service as "domain.service"; required once there is
    /// something to send
    #[serde(default)]
    pub notification_service: Option<String>,

    /// Title template
    #[serde(default = "default_title")]
    pub notification_title: String,

    /// Message template, rendered against `{ devices: [...] }`
    #[serde(default = "default_message")]
    pub notification_message: String,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_interval() -> f64 {
    DEFAULT_INTERVAL_HOURS
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_message() -> String {
    DEFAULT_MESSAGE.to_string()
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            battery_threshold: default_threshold(),
            notification_interval: default_interval(),
            filter_regex: None,
            notification_service: None,
            notification_title: default_title(),
            notification_message: default_message(),
        }
    }
}

impl CheckConfig {
    /// Deserialize the configuration from a service call payload
    pub fn from_call(call: &ServiceCall) -> Result<Self, CheckError> {
        Ok(serde_json::from_value(call.service_data.clone())?)
    }

    /// Compile the entity id filter, if one was supplied
    pub fn filter(&self) -> Result<Option<Regex>, CheckError> {
        match &self.filter_regex {
            Some(pattern) => Ok(Some(Regex::new(pattern)?)),
            None => Ok(None),
        }
    }

    /// The notification cooldown as a duration
    pub fn interval(&self) -> Duration {
        Duration::milliseconds((self.notification_interval * 3_600_000.0) as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bm_core::Context;
    use serde_json::json;

    fn call_with(data: serde_json::Value) -> ServiceCall {
        ServiceCall::new("battery_monitor", "check_batteries", data, Context::new())
    }

    #[test]
    fn test_defaults() {
        let config = CheckConfig::from_call(&call_with(json!({}))).unwrap();

        assert_eq!(config.battery_threshold, 20.0);
        assert_eq!(config.notification_interval, 24.0);
        assert_eq!(config.filter_regex, None);
        assert_eq!(config.notification_service, None);
        assert_eq!(config.notification_title, "Low Battery Alert");
        assert!(config.notification_message.contains("{% for device in devices %}"));
        assert_eq!(config.interval(), Duration::hours(24));
    }

    #[test]
    fn test_full_payload() {
        let config = CheckConfig::from_call(&call_with(json!({
            "battery_threshold": 15,
            "notification_interval": 6.5,
            "filter_regex": "^sensor\\.kitchen",
            "notification_service": "notify.mobile_app",
            "notification_title": "Batteries",
            "notification_message": "{{ devices | length }} low",
        })))
        .unwrap();

        assert_eq!(config.battery_threshold, 15.0);
        assert_eq!(config.notification_interval, 6.5);
        assert_eq!(config.filter_regex.as_deref(), Some("^sensor\\.kitchen"));
        assert_eq!(config.notification_service.as_deref(), Some("notify.mobile_app"));
        assert_eq!(config.interval(), Duration::minutes(390));
    }

    #[test]
    fn test_unrecognized_fields_ignored() {
        let config = CheckConfig::from_call(&call_with(json!({
            "battery_threshold": 30,
            "something_else": true,
        })))
        .unwrap();

        assert_eq!(config.battery_threshold, 30.0);
    }

    #[test]
    fn test_wrong_type_is_an_error() {
        let result = CheckConfig::from_call(&call_with(json!({
            "battery_threshold": "twenty",
        })));

        assert!(matches!(result, Err(CheckError::InvalidData(_))));
    }

    #[test]
    fn test_filter_compiles_once() {
        let config = CheckConfig::from_call(&call_with(json!({
            "filter_regex": "^sensor\\.",
        })))
        .unwrap();

        let filter = config.filter().unwrap().unwrap();
        assert!(filter.is_match("sensor.phone_battery"));
        assert!(!filter.is_match("light.kitchen"));
    }

    #[test]
    fn test_invalid_filter_is_an_error() {
        let config = CheckConfig::from_call(&call_with(json!({
            "filter_regex": "([unclosed",
        })))
        .unwrap();

        assert!(matches!(config.filter(), Err(CheckError::InvalidFilter(_))));
    }
}
