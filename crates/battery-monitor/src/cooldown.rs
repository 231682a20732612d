//! Notification Gate: threshold check and per-entity cooldown bookkeeping

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;

use crate::scanner::BatteryDevice;

/// Per-entity record of when a notification last went out
///
/// The log is process-wide volatile state keyed by entity id. It is only
/// read and written by the gate, under the host's one-invocation-at-a-time
/// contract; nothing here persists across restarts.
pub struct NotificationLog {
    entries: DashMap<String, DateTime<Utc>>,
}

impl NotificationLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// When the entity was last notified, if ever
    pub fn last_notified(&self, entity_id: &str) -> Option<DateTime<Utc>> {
        self.entries.get(entity_id).map(|e| *e)
    }

    /// Record that the entity is being notified at `at`
    pub fn mark_notified(&self, entity_id: impl Into<String>, at: DateTime<Utc>) {
        self.entries.insert(entity_id.into(), at);
    }

    /// Drop records older than `max_age`, returning how many were removed
    ///
    /// A record older than the cooldown gates identically to a missing
    /// record, so pruning with the cooldown as `max_age` never changes
    /// gate results.
    pub fn prune(&self, now: DateTime<Utc>, max_age: Duration) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, last| now - *last <= max_age);
        before - self.entries.len()
    }

    /// Number of entities with a record
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log has no records
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Select the devices due for notification now
///
/// Applied per device in scan order:
/// - levels above `threshold` are excluded with no record change
///   (a level exactly equal to the threshold counts as low),
/// - devices with no record, or whose record is older than `interval`,
///   are included and their record is set to `now`,
/// - devices still within the cooldown are excluded (strict comparison:
///   a record exactly `interval` old does not yet re-trigger).
///
/// Record update and inclusion in the result are two sides of the same
/// decision; a device appears in the output only if its record was just
/// set to `now`.
pub fn gate(
    devices: Vec<BatteryDevice>,
    threshold: f64,
    interval: Duration,
    log: &NotificationLog,
    now: DateTime<Utc>,
) -> Vec<BatteryDevice> {
    let mut due = Vec::new();

    for device in devices {
        if device.battery_level > threshold {
            continue;
        }

        let expired = match log.last_notified(&device.entity_id) {
            None => true,
            Some(last) => now - last > interval,
        };

        if expired {
            debug!(
                entity_id = %device.entity_id,
                battery_level = device.battery_level,
                "Adding device to notification list"
            );
            log.mark_notified(device.entity_id.clone(), now);
            due.push(device);
        }
    }

    debug!(count = due.len(), threshold, "Devices due for notification");

    due
}
