use serde_json::{Map, Value};

use crate::action::PrepareRequest;
use crate::error::RunConfigError;

pub const COLLECTION_ID_ATTRIBUTE: &str = "postman.collection.id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    pub key: String,
    pub value: String,
}

/// Typed view of the action configuration, validated once at prepare.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfig {
    pub collection_id: String,
    /// Environment UID or name.
    pub environment: Option<String>,
    pub env_vars: Vec<EnvVar>,
    pub verbose: bool,
    pub bail: bool,
    pub timeout_ms: i64,
    pub timeout_request_ms: i64,
    pub iterations: i64,
}

impl RunConfig {
    pub fn from_request(req: &PrepareRequest) -> Result<Self, RunConfigError> {
        let cfg = &req.config;

        let from_target = req
            .target
            .as_ref()
            .and_then(|t| t.first_attribute(COLLECTION_ID_ATTRIBUTE))
            .filter(|s| !s.trim().is_empty());
        // The config field is only consulted when the target carries no id.
        let collection_id = match from_target {
            Some(id) => id.to_string(),
            None => opt_string(cfg, "collectionId")?
                .ok_or(RunConfigError::MissingField("collectionId"))?,
        };

        let environment = match opt_string(cfg, "environmentIdOrName")? {
            Some(v) => Some(v),
            None => opt_string(cfg, "environmentId")?,
        };

        Ok(Self {
            collection_id,
            environment,
            env_vars: env_vars(cfg, "environment")?,
            verbose: flag(cfg, "verbose")?,
            bail: flag(cfg, "bail")?,
            timeout_ms: integer(cfg, "timeout")?.unwrap_or(0),
            timeout_request_ms: integer(cfg, "timeoutRequest")?.unwrap_or(0),
            iterations: integer(cfg, "iterations")?.unwrap_or(1),
        })
    }
}

fn opt_string(
    cfg: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, RunConfigError> {
    match cfg.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(_) => Err(RunConfigError::InvalidType {
            field,
            expected: "a string",
        }),
    }
}

fn flag(cfg: &Map<String, Value>, field: &'static str) -> Result<bool, RunConfigError> {
    match cfg.get(field) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(true),
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") || s.is_empty() => Ok(false),
        Some(_) => Err(RunConfigError::InvalidType {
            field,
            expected: "a boolean",
        }),
    }
}

fn integer(cfg: &Map<String, Value>, field: &'static str) -> Result<Option<i64>, RunConfigError> {
    match cfg.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return Ok(Some(i));
            }
            match n.as_f64() {
                Some(f) if f.abs() < i64::MAX as f64 => Ok(Some(f.round() as i64)),
                _ => Err(RunConfigError::OutOfRange {
                    field,
                    value: n.to_string(),
                }),
            }
        }
        Some(_) => Err(RunConfigError::InvalidType {
            field,
            expected: "a number",
        }),
    }
}

fn env_vars(cfg: &Map<String, Value>, field: &'static str) -> Result<Vec<EnvVar>, RunConfigError> {
    let invalid = RunConfigError::InvalidType {
        field,
        expected: "a list of {key, value} objects",
    };
    let items = match cfg.get(field) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(invalid),
    };

    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let Value::Object(obj) = item else {
            return Err(invalid);
        };
        let key = match obj.get("key") {
            Some(Value::String(k)) if !k.is_empty() => k.clone(),
            _ => return Err(invalid),
        };
        let value = match obj.get("value") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(v)) => v.clone(),
            Some(v @ (Value::Number(_) | Value::Bool(_))) => v.to_string(),
            Some(_) => return Err(invalid),
        };
        out.push(EnvVar { key, value });
    }
    Ok(out)
}
