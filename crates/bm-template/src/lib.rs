//! Jinja2-compatible template rendering for battery notifications
//!
//! This crate provides a template engine built on minijinja for rendering
//! notification titles and messages against an explicit context (typically
//! `{ devices: [...] }` with each device exposing `name` and
//! `battery_level`).
//!
//! # Example
//!
//! ```ignore
//! use bm_template::TemplateEngine;
//!
//! let engine = TemplateEngine::new();
//! let message = engine.render_with_context(
//!     "{% for device in devices %}- {{ device.name }}: {{ device.battery_level }}%\n{% endfor %}",
//!     serde_json::json!({"devices": [{"name": "Phone", "battery_level": 15.0}]}),
//! )?;
//! ```
//!
//! # Filters
//!
//! - `| round(2)` - Round to precision
//! - `| int` / `| float` - Type conversion
//! - `| abs` - Absolute value
//! - `| slugify` - Convert to slug
//! - `| to_json` / `| from_json` - JSON serialization
//! - `| regex_replace(pattern, replacement)` - Regex substitution
//! - `| regex_match(pattern)` - Regex test
//!
//! Rendering is strict: referencing an undefined variable or attribute is an
//! error, not an empty string, so a broken notification template fails the
//! invocation instead of sending a half-rendered message.

mod engine;
mod error;
mod filters;
mod globals;

pub use engine::TemplateEngine;
pub use error::{TemplateError, TemplateResult};
pub use globals::DateTimeWrapper;

// Re-export minijinja Value for convenience
pub use minijinja::Value;
