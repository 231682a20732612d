//! Battery Scanner: filter the state snapshot down to battery sensor candidates

use bm_core::{State, ATTR_DEVICE_CLASS, ATTR_FRIENDLY_NAME, ATTR_NAME, DEVICE_CLASS_BATTERY};
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

/// A battery sensor candidate derived from one entity state
///
/// Serializes directly into the template context, so field names are what
/// the notification templates see.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatteryDevice {
    /// The entity this device was derived from
    pub entity_id: String,
    /// Display name: friendly_name or name attribute if present, else the entity id
    pub name: String,
    /// Parsed battery level; 0-100 expected but not clamped
    pub battery_level: f64,
}

/// Scan a state snapshot for battery sensors
///
/// Iterates the snapshot in the given order and emits one [`BatteryDevice`]
/// per entity that:
/// - is not unavailable or unknown,
/// - carries the battery device class,
/// - matches `filter` (partial match anywhere in the id) when one is given,
/// - has a state value that parses as a number.
///
/// Entities with unparseable values are skipped with a warning; a bad
/// sensor never aborts the scan. Output preserves input order.
pub fn scan(states: &[State], filter: Option<&Regex>) -> Vec<BatteryDevice> {
    let mut devices = Vec::new();

    for state in states {
        if state.is_unavailable() || state.is_unknown() {
            continue;
        }

        if state.attribute::<String>(ATTR_DEVICE_CLASS).as_deref() != Some(DEVICE_CLASS_BATTERY) {
            continue;
        }

        let entity_id = state.entity_id.to_string();
        if let Some(re) = filter {
            if !re.is_match(&entity_id) {
                debug!(entity_id = %entity_id, "Entity filtered out by regex");
                continue;
            }
        }

        let battery_level = match state.state.trim().parse::<f64>() {
            Ok(level) => level,
            Err(_) => {
                warn!(
                    entity_id = %entity_id,
                    value = %state.state,
                    "Entity has invalid battery level"
                );
                continue;
            }
        };

        debug!(entity_id = %entity_id, battery_level, "Found battery sensor");

        let name = state
            .attribute::<String>(ATTR_FRIENDLY_NAME)
            .or_else(|| state.attribute::<String>(ATTR_NAME))
            .unwrap_or_else(|| entity_id.clone());

        devices.push(BatteryDevice {
            entity_id,
            name,
            battery_level,
        });
    }

    devices
}
