//! Custom Jinja2 filters for notification templates

use minijinja::value::{Kwargs, Value};
use minijinja::{Error, ErrorKind};
use regex::Regex;
use std::convert::TryFrom;

/// Helper to convert Value to f64
fn value_to_f64(value: &Value) -> Option<f64> {
    f64::try_from(value.clone())
        .ok()
        .or_else(|| value.as_i64().map(|i| i as f64))
}

// ==================== String Filters ====================

/// Convert a string to a slug
pub fn slugify(value: &str, kwargs: Kwargs) -> Result<String, Error> {
    let separator: String = kwargs
        .get::<Option<String>>("separator")?
        .unwrap_or_else(|| "_".to_string());
    Ok(slug::slugify(value).replace('-', &separator))
}

/// Replace matches of a regex pattern with a replacement string
pub fn regex_replace(value: &str, find: &str, replace: &str) -> Result<String, Error> {
    let re = Regex::new(find)
        .map_err(|e| Error::new(ErrorKind::InvalidOperation, format!("invalid regex: {}", e)))?;
    Ok(re.replace_all(value, replace).to_string())
}

/// Test if a regex pattern matches anywhere in the value
pub fn regex_match(value: &str, pattern: &str) -> Result<bool, Error> {
    let re = Regex::new(pattern)
        .map_err(|e| Error::new(ErrorKind::InvalidOperation, format!("invalid regex: {}", e)))?;
    Ok(re.is_match(value))
}

// ==================== Type Conversion Filters ====================

/// Convert value to float with optional default
pub fn to_float(value: Value, default: Option<Value>) -> Result<Value, Error> {
    let fallback = |default: Option<Value>| match default {
        Some(d) => Ok(Value::from(value_to_f64(&d).unwrap_or(0.0))),
        None => Err(Error::new(
            ErrorKind::InvalidOperation,
            "cannot convert to float",
        )),
    };

    if value.is_undefined() || value.is_none() || value.as_str() == Some("") {
        return fallback(default.or(Some(Value::from(0.0))));
    }

    let parsed = value_to_f64(&value)
        .or_else(|| value.as_str().and_then(|s| s.trim().parse::<f64>().ok()));

    match parsed {
        Some(f) => Ok(Value::from(f)),
        None => fallback(default),
    }
}

/// Convert value to integer with optional default
pub fn to_int(value: Value, default: Option<Value>) -> Result<Value, Error> {
    let fallback = |default: Option<Value>| match default {
        Some(d) => Ok(Value::from(d.as_i64().unwrap_or(0))),
        None => Err(Error::new(
            ErrorKind::InvalidOperation,
            "cannot convert to int",
        )),
    };

    if value.is_undefined() || value.is_none() || value.as_str() == Some("") {
        return fallback(default.or(Some(Value::from(0))));
    }

    if let Some(i) = value.as_i64() {
        return Ok(Value::from(i));
    }

    let parsed = value_to_f64(&value).map(|f| f as i64).or_else(|| {
        value.as_str().and_then(|s| {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        })
    });

    match parsed {
        Some(i) => Ok(Value::from(i)),
        None => fallback(default),
    }
}

// ==================== Math Filters ====================

/// Round a number to the given precision
pub fn round_filter(value: f64, precision: Option<i32>, kwargs: Kwargs) -> Result<f64, Error> {
    let precision = precision.unwrap_or(0);
    let method: String = kwargs
        .get::<Option<String>>("method")?
        .unwrap_or_else(|| "common".to_string());

    let multiplier = 10_f64.powi(precision);
    let scaled = value * multiplier;

    let rounded = match method.as_str() {
        "ceil" => scaled.ceil(),
        "floor" => scaled.floor(),
        "half" => (scaled * 2.0).round() / 2.0,
        _ => scaled.round(),
    };

    Ok(rounded / multiplier)
}

/// Absolute value
pub fn abs_filter(value: f64) -> f64 {
    value.abs()
}

// ==================== JSON Filters ====================

/// Serialize a value to a JSON string
pub fn to_json(value: Value, kwargs: Kwargs) -> Result<String, Error> {
    let pretty: bool = kwargs.get::<Option<bool>>("pretty")?.unwrap_or(false);

    if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .map_err(|e| Error::new(ErrorKind::InvalidOperation, format!("JSON error: {}", e)))
}

/// Parse a JSON string into a value
pub fn from_json(value: &str) -> Result<Value, Error> {
    let json: serde_json::Value = serde_json::from_str(value)
        .map_err(|e| Error::new(ErrorKind::InvalidOperation, format!("invalid JSON: {}", e)))?;

    Ok(Value::from_serialize(&json))
}
