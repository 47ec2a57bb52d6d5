//! Serialization, defaulting, casting and assertion helpers.
//!
//! Truthiness is the template engine's: `none`, undefined, `false`, `0` and
//! empty strings, lists and maps are falsy. The string `"false"` is truthy;
//! use `toBool` to interpret strings coming from CSV input.

use minijinja::value::{Rest, ValueKind};
use minijinja::{Error, Value};

use super::{helper_error, invalid, FunctionRegistry};

pub(crate) fn register(registry: &mut FunctionRegistry) {
    registry.add("toJson", |v: Value| -> Result<String, Error> {
        serde_json::to_string(&v).map_err(|e| helper_error("cannot encode JSON", e))
    });
    registry.add("toPrettyJson", |v: Value| -> Result<String, Error> {
        serde_json::to_string_pretty(&v).map_err(|e| helper_error("cannot encode JSON", e))
    });
    registry.add("fromJson", |s: String| -> Result<Value, Error> {
        let parsed: serde_json::Value =
            serde_json::from_str(&s).map_err(|e| helper_error("cannot parse JSON", e))?;
        Ok(Value::from_serialize(&parsed))
    });
    registry.add("toYaml", |v: Value| -> Result<String, Error> {
        serde_yaml::to_string(&v).map_err(|e| helper_error("cannot encode YAML", e))
    });
    registry.add("fromYaml", |s: String| -> Result<Value, Error> {
        let parsed: serde_yaml::Value =
            serde_yaml::from_str(&s).map_err(|e| helper_error("cannot parse YAML", e))?;
        Ok(Value::from_serialize(&parsed))
    });
    registry.add("toXml", |root: String, v: Value| -> Result<String, Error> {
        quick_xml::se::to_string_with_root(&root, &v)
            .map_err(|e| helper_error("cannot encode XML", e))
    });

    registry.add("default", |fallback: Value, v: Option<Value>| match v {
        Some(v) if v.is_true() => v,
        _ => fallback,
    });
    registry.add("empty", |v: Option<Value>| !v.is_some_and(|v| v.is_true()));
    registry.add("coalesce", |values: Rest<Value>| {
        values
            .0
            .into_iter()
            .find(Value::is_true)
            .unwrap_or_else(|| Value::from(()))
    });
    registry.add("ternary", |yes: Value, no: Value, cond: Value| {
        if cond.is_true() {
            yes
        } else {
            no
        }
    });

    registry.add("toString", |v: Value| -> String {
        if v.is_undefined() {
            String::new()
        } else {
            v.to_string()
        }
    });
    registry.add("toInt", to_int);
    registry.add("toFloat", to_float);
    registry.add("toBool", to_bool);

    registry.add("assert", |cond: Value, message: String| -> Result<String, Error> {
        if cond.is_true() {
            Ok(String::new())
        } else {
            Err(invalid(format!("assertion failed: {}", message)))
        }
    });
    registry.add("fail", |message: String| -> Result<String, Error> {
        Err(invalid(message))
    });
}

fn to_int(v: Value) -> Result<i64, Error> {
    match v.kind() {
        ValueKind::String => {
            let s = v.as_str().unwrap_or_default().trim();
            s.parse::<i64>()
                .or_else(|_| s.parse::<f64>().map(|f| f.trunc() as i64))
                .map_err(|e| helper_error(format!("cannot convert {:?} to an integer", s), e))
        }
        ValueKind::Bool => Ok(i64::from(v.is_true())),
        ValueKind::Number => match v.as_i64() {
            Some(i) => Ok(i),
            None => Ok(f64::try_from(v)?.trunc() as i64),
        },
        _ => Err(invalid(format!("cannot convert {} to an integer", v))),
    }
}

fn to_float(v: Value) -> Result<f64, Error> {
    match v.kind() {
        ValueKind::String => {
            let s = v.as_str().unwrap_or_default().trim();
            s.parse::<f64>()
                .map_err(|e| helper_error(format!("cannot convert {:?} to a float", s), e))
        }
        ValueKind::Bool => Ok(if v.is_true() { 1.0 } else { 0.0 }),
        ValueKind::Number => f64::try_from(v),
        _ => Err(invalid(format!("cannot convert {} to a float", v))),
    }
}

fn to_bool(v: Value) -> Result<bool, Error> {
    let Some(s) = v.as_str() else {
        return Ok(v.is_true());
    };
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "f" | "false" | "no" | "n" | "off" | "" => Ok(false),
        other => Err(invalid(format!("cannot convert {:?} to a boolean", other))),
    }
}
