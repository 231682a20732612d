//! Template engine for rendering notification titles and messages

use crate::error::TemplateResult;
use crate::filters;
use crate::globals;
use minijinja::{Environment, UndefinedBehavior, Value};
use tracing::debug;

/// Template engine for notification templates
///
/// The engine renders logic-enabled templates (loops, conditionals,
/// attribute access) against an explicit context. Undefined variables are
/// strict errors: a template referencing a missing field fails instead of
/// producing a half-rendered notification.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine
    pub fn new() -> Self {
        let mut env = Environment::new();

        env.set_debug(true);
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        Self::register_filters(&mut env);
        Self::register_globals(&mut env);

        Self { env }
    }

    fn register_filters(env: &mut Environment<'static>) {
        // String filters
        env.add_filter("slugify", filters::slugify);
        env.add_filter("regex_replace", filters::regex_replace);
        env.add_filter("regex_match", filters::regex_match);

        // Type conversion
        env.add_filter("float", filters::to_float);
        env.add_filter("int", filters::to_int);

        // Math
        env.add_filter("round", filters::round_filter);
        env.add_filter("abs", filters::abs_filter);

        // JSON
        env.add_filter("to_json", filters::to_json);
        env.add_filter("from_json", filters::from_json);
    }

    fn register_globals(env: &mut Environment<'static>) {
        env.add_function("now", globals::now);
        env.add_function("utcnow", globals::utcnow);
    }

    /// Render a template string without additional context
    pub fn render(&self, template: &str) -> TemplateResult<String> {
        self.render_with_context(template, ())
    }

    /// Render a template with context variables
    pub fn render_with_context(
        &self,
        template: &str,
        context: impl serde::Serialize,
    ) -> TemplateResult<String> {
        debug!(template, "Rendering template");

        let tmpl = self.env.template_from_str(template)?;
        let result = tmpl.render(context)?;
        Ok(result)
    }

    /// Evaluate a template expression with context and return the value
    pub fn evaluate_with_context(
        &self,
        template: &str,
        context: impl serde::Serialize,
    ) -> TemplateResult<Value> {
        let expr = self.env.compile_expression(template)?;
        let result = expr.eval(context)?;
        Ok(result)
    }

    /// Check if a string contains template syntax
    pub fn is_template(template: &str) -> bool {
        template.contains("{{") || template.contains("{%") || template.contains("{#")
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TemplateError;
    use serde_json::json;

    fn device_context() -> serde_json::Value {
        json!({
            "devices": [
                {"entity_id": "sensor.phone_battery", "name": "Phone", "battery_level": 15.0},
                {"entity_id": "sensor.door_battery", "name": "Door Sensor", "battery_level": 7.5},
            ]
        })
    }

    #[test]
    fn test_plain_text_passthrough() {
        let engine = TemplateEngine::new();
        let result = engine.render("Low Battery Alert").unwrap();
        assert_eq!(result, "Low Battery Alert");
    }

    #[test]
    fn test_variable_substitution() {
        let engine = TemplateEngine::new();
        let result = engine
            .render_with_context("Hello, {{ name }}!", json!({"name": "Test"}))
            .unwrap();
        assert_eq!(result, "Hello, Test!");
    }

    #[test]
    fn test_device_loop() {
        let engine = TemplateEngine::new();
        let template =
            "{% for device in devices %}- {{ device.name }}: {{ device.battery_level }}%\n{% endfor %}";
        let result = engine
            .render_with_context(template, device_context())
            .unwrap();
        assert_eq!(result, "- Phone: 15.0%\n- Door Sensor: 7.5%\n");
    }

    #[test]
    fn test_undefined_variable_is_an_error() {
        let engine = TemplateEngine::new();
        let result = engine.render_with_context("{{ nonexistent }}", json!({}));
        assert!(matches!(
            result,
            Err(TemplateError::UndefinedVariable { .. })
        ));
    }

    #[test]
    fn test_missing_attribute_is_an_error() {
        let engine = TemplateEngine::new();
        let result = engine.render_with_context(
            "{% for device in devices %}{{ device.charge }}{% endfor %}",
            device_context(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_syntax_error() {
        let engine = TemplateEngine::new();
        let result = engine.render_with_context("{% for device in %}", json!({}));
        assert!(matches!(result, Err(TemplateError::SyntaxError { .. })));
    }

    #[test]
    fn test_round_filter() {
        let engine = TemplateEngine::new();
        assert_eq!(engine.render("{{ 3.14159 | round(2) }}").unwrap(), "3.14");
    }

    #[test]
    fn test_int_and_float_filters() {
        let engine = TemplateEngine::new();
        assert_eq!(engine.render("{{ '15.4' | float }}").unwrap(), "15.4");
        assert_eq!(engine.render("{{ '15' | int }}").unwrap(), "15");
    }

    #[test]
    fn test_abs_filter() {
        let engine = TemplateEngine::new();
        assert_eq!(engine.render("{{ -5 | abs }}").unwrap(), "5.0");
    }

    #[test]
    fn test_slugify_filter() {
        let engine = TemplateEngine::new();
        assert_eq!(
            engine.render("{{ 'Phone Battery' | slugify }}").unwrap(),
            "phone_battery"
        );
    }

    #[test]
    fn test_regex_filters() {
        let engine = TemplateEngine::new();
        assert_eq!(
            engine
                .render("{{ 'hello world' | regex_replace('\\\\s+', '-') }}")
                .unwrap(),
            "hello-world"
        );
        assert_eq!(
            engine
                .render("{{ 'sensor.phone_battery' | regex_match('^sensor\\\\.') }}")
                .unwrap(),
            "true"
        );
    }

    #[test]
    fn test_to_json_filter() {
        let engine = TemplateEngine::new();
        let result = engine
            .render_with_context("{{ data | to_json }}", json!({"data": {"key": "value"}}))
            .unwrap();
        assert!(result.contains("key"));
        assert!(result.contains("value"));
    }

    #[test]
    fn test_conditional_on_battery_level() {
        let engine = TemplateEngine::new();
        let template = r#"
{%- for device in devices -%}
{%- if device.battery_level < 10 -%}
CRITICAL: {{ device.name }}
{%- endif -%}
{%- endfor -%}
"#;
        let result = engine
            .render_with_context(template, device_context())
            .unwrap();
        assert_eq!(result.trim(), "CRITICAL: Door Sensor");
    }

    #[test]
    fn test_now_and_utcnow() {
        let engine = TemplateEngine::new();
        let year: i32 = engine.render("{{ now().year }}").unwrap().parse().unwrap();
        assert!(year >= 2024);
        let year: i32 = engine
            .render("{{ utcnow().year }}")
            .unwrap()
            .parse()
            .unwrap();
        assert!(year >= 2024);
    }

    #[test]
    fn test_evaluate_expression() {
        let engine = TemplateEngine::new();
        let value = engine
            .evaluate_with_context("devices | length", device_context())
            .unwrap();
        assert_eq!(value.as_i64(), Some(2));
    }

    #[test]
    fn test_is_template() {
        assert!(TemplateEngine::is_template("{{ foo }}"));
        assert!(TemplateEngine::is_template("{% if true %}{% endif %}"));
        assert!(TemplateEngine::is_template("{# comment #}"));
        assert!(!TemplateEngine::is_template("plain text"));
    }
}
