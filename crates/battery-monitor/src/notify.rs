//! Notification Dispatcher: render templates and make the notify call

use bm_core::Context;
use bm_service_registry::ServiceRegistry;
use bm_template::TemplateEngine;
use serde_json::json;
use tracing::debug;

use crate::config::CheckConfig;
use crate::error::CheckError;
use crate::scanner::BatteryDevice;

/// Send one batched notification for the given devices
///
/// Renders the title and message templates against `{ devices: [...] }`,
/// resolves the configured `domain.service` target, and makes exactly one
/// service call with a `{title, message}` payload regardless of device
/// count. Render failures and a missing or malformed target are fatal for
/// the invocation; nothing partial is sent.
pub async fn dispatch(
    devices: &[BatteryDevice],
    config: &CheckConfig,
    engine: &TemplateEngine,
    services: &ServiceRegistry,
    context: Context,
) -> Result<(), CheckError> {
    let template_data = json!({ "devices": devices });

    let title = engine.render_with_context(&config.notification_title, &template_data)?;
    let message = engine.render_with_context(&config.notification_message, &template_data)?;

    let target = config
        .notification_service
        .as_deref()
        .ok_or(CheckError::MissingNotifyService)?;
    let (domain, service) = target
        .split_once('.')
        .ok_or_else(|| CheckError::InvalidNotifyService(target.to_string()))?;

    debug!(domain, service, title = %title, "Sending notification");

    services
        .call(
            domain,
            service,
            json!({ "title": title, "message": message }),
            context,
            false,
        )
        .await?;

    Ok(())
}
