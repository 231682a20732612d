//! Core types for the battery monitor
//!
//! This crate provides the fundamental types shared by the battery monitor
//! crates: EntityId, State, Context, and ServiceCall, plus the state-value
//! and attribute constants the scanner keys off.

mod context;
mod entity_id;
mod service_call;
mod state;

pub use context::Context;
pub use entity_id::{EntityId, EntityIdError};
pub use service_call::{ServiceCall, SupportsResponse};
pub use state::State;

/// State value reported while an entity cannot be reached
pub const STATE_UNAVAILABLE: &str = "unavailable";

/// State value reported before an entity has a real value
pub const STATE_UNKNOWN: &str = "unknown";

/// Attribute key classifying what kind of value an entity reports
pub const ATTR_DEVICE_CLASS: &str = "device_class";

/// Attribute key carrying an entity's display name
pub const ATTR_FRIENDLY_NAME: &str = "friendly_name";

/// Fallback attribute key for an entity's display name
pub const ATTR_NAME: &str = "name";

/// Device class identifying a battery charge percentage sensor
pub const DEVICE_CLASS_BATTERY: &str = "battery";
