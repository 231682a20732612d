//! Global functions and objects for notification templates

use chrono::{DateTime, Datelike, Local, Timelike, Utc};
use minijinja::value::Value;
use minijinja::{Error, ErrorKind};

// ==================== Time Functions ====================

/// Get the current local time
pub fn now() -> Value {
    Value::from_object(DateTimeWrapper(Local::now().with_timezone(&Utc)))
}

/// Get the current UTC time
pub fn utcnow() -> Value {
    Value::from_object(DateTimeWrapper(Utc::now()))
}

// ==================== DateTime Wrapper ====================

/// Wrapper exposing a DateTime to templates
#[derive(Debug, Clone)]
pub struct DateTimeWrapper(pub DateTime<Utc>);

impl std::fmt::Display for DateTimeWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S%.f%:z"))
    }
}

impl minijinja::value::Object for DateTimeWrapper {
    fn get_value(self: &std::sync::Arc<Self>, key: &Value) -> Option<Value> {
        let key = key.as_str()?;
        match key {
            "year" => Some(Value::from(self.0.year())),
            "month" => Some(Value::from(self.0.month())),
            "day" => Some(Value::from(self.0.day())),
            "hour" => Some(Value::from(self.0.hour())),
            "minute" => Some(Value::from(self.0.minute())),
            "second" => Some(Value::from(self.0.second())),
            "timestamp" => Some(Value::from(self.0.timestamp())),
            _ => None,
        }
    }

    fn call_method(
        self: &std::sync::Arc<Self>,
        _state: &minijinja::State,
        name: &str,
        args: &[Value],
    ) -> Result<Value, Error> {
        match name {
            "strftime" => {
                let format = args.first().and_then(|v| v.as_str()).ok_or_else(|| {
                    Error::new(
                        ErrorKind::InvalidOperation,
                        "strftime requires format string",
                    )
                })?;
                Ok(Value::from(self.0.format(format).to_string()))
            }
            "timestamp" => Ok(Value::from(self.0.timestamp())),
            "isoformat" => Ok(Value::from(self.0.to_rfc3339())),
            _ => Err(Error::new(
                ErrorKind::InvalidOperation,
                format!("unknown method: {}", name),
            )),
        }
    }

    fn render(self: &std::sync::Arc<Self>, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S%.f%:z"))
    }

    fn repr(self: &std::sync::Arc<Self>) -> minijinja::value::ObjectRepr {
        minijinja::value::ObjectRepr::Plain
    }
}
