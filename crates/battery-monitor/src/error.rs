//! Error type for the check pipeline

use thiserror::Error;

/// Errors that fail a check invocation outright
///
/// Per-entity problems (unparseable battery levels) are not represented
/// here; the scanner recovers from those locally and logs a warning.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The service payload could not be deserialized
    #[error("invalid service data: {0}")]
    InvalidData(#[from] serde_json::Error),

    /// The filter_regex field is not a valid regular expression
    #[error("invalid filter_regex: {0}")]
    InvalidFilter(#[from] regex::Error),

    /// Devices qualified but no notification_service was configured
    #[error("no notification_service configured")]
    MissingNotifyService,

    /// The notification_service identifier has no domain separator
    #[error("invalid notification_service '{0}': expected 'domain.service'")]
    InvalidNotifyService(String),

    /// Title or message template failed to render
    #[error(transparent)]
    Template(#[from] bm_template::TemplateError),

    /// The notify service call itself failed
    #[error("notification dispatch failed: {0}")]
    Dispatch(#[from] bm_service_registry::ServiceError),
}
