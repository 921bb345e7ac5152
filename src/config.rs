//! Module arguments: loading, validation and coercion.
//!
//! Arguments arrive as a JSON object (optionally wrapped in
//! `ANSIBLE_MODULE_ARGS`). They are checked against
//! [`schema::ARGUMENT_SPEC`](crate::schema::ARGUMENT_SPEC), coerced the way
//! the harness coerces them (`"yes"` is a bool, `"a,b"` is a list), and
//! then turned into a typed [`ModuleArgs`].

use anyhow::{Context, Result};
use declarative::DesiredState;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::io::Read;
use std::path::Path;

use crate::schema::{ARGUMENT_SPEC, ArgSpec, ArgType, MODULE_NAME, REQUIRED_ONE_OF};

const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PORT: u16 = 443;

// ============================================================================
// Errors
// ============================================================================

/// Why the arguments were rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgError {
    #[error("invalid arguments document: {0}")]
    Parse(String),

    #[error("Unsupported parameters for ({MODULE_NAME}) module: {}", .0.join(", "))]
    Unsupported(Vec<String>),

    #[error("missing required arguments: {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error("one of the following is required: {}", .0.join(", "))]
    RequiredOneOf(Vec<String>),

    #[error("argument '{name}' is of type {found} and we were unable to convert to {expected}")]
    Type {
        name: String,
        found: &'static str,
        expected: &'static str,
    },

    #[error("value of {name} must be one of: {}, got: {got}", .choices.join(", "))]
    Choice {
        name: String,
        choices: Vec<String>,
        got: String,
    },

    #[error("{0}")]
    Invalid(String),
}

// ============================================================================
// Typed Arguments
// ============================================================================

/// Classic top-level connection keys, folded into `provider`
const CLASSIC_PROVIDER_KEYS: &[&str] = &["ip_address", "username", "password", "api_key", "port"];

/// Connection parameters, merged from `provider` and the classic top-level keys
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Provider {
    #[serde(default)]
    pub ip_address: String,
    #[serde(default = "default_username")]
    pub username: String,
    pub password: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    pub serial_number: Option<String>,
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Validated module arguments
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModuleArgs {
    pub provider: Provider,
    pub vsys: Option<String>,
    pub device_group: Option<String>,
    pub name: String,
    pub applications: Vec<String>,
    #[serde(default)]
    pub state: DesiredState,
    #[serde(default = "default_commit")]
    pub commit: bool,
}

const fn default_commit() -> bool {
    true
}

/// Arguments plus the harness flags that came with them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub args: ModuleArgs,
    pub check_mode: bool,
    pub diff_mode: bool,
}

/// Read the arguments document from `path`, or stdin when `None`
pub fn load(path: Option<&Path>) -> Result<Invocation> {
    let text = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Could not read arguments file {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Could not read arguments from stdin")?;
            buf
        }
    };
    Ok(parse_document(&text)?)
}

/// Parse and validate an arguments document
pub fn parse_document(text: &str) -> Result<Invocation, ArgError> {
    let value: Value = serde_json::from_str(text).map_err(|e| ArgError::Parse(e.to_string()))?;
    let Value::Object(mut map) = value else {
        return Err(ArgError::Parse("expected a JSON object".to_string()));
    };

    match map.remove("ANSIBLE_MODULE_ARGS") {
        Some(Value::Object(inner)) => map = inner,
        Some(_) => {
            return Err(ArgError::Parse(
                "ANSIBLE_MODULE_ARGS must be an object".to_string(),
            ));
        }
        None => {}
    }

    let check_mode = harness_flag(&map, "_ansible_check_mode")?;
    let diff_mode = harness_flag(&map, "_ansible_diff")?;
    map.retain(|key, _| !key.starts_with("_ansible_"));

    let mut params = validate(ARGUMENT_SPEC, &map, "")?;
    for group in REQUIRED_ONE_OF {
        if !group.iter().any(|name| params.contains_key(*name)) {
            return Err(ArgError::RequiredOneOf(
                group.iter().map(|s| (*s).to_string()).collect(),
            ));
        }
    }

    merge_provider(&mut params)?;
    let args: ModuleArgs = serde_json::from_value(Value::Object(params))
        .map_err(|e| ArgError::Invalid(e.to_string()))?;

    Ok(Invocation {
        args: args.checked()?,
        check_mode,
        diff_mode,
    })
}

fn harness_flag(map: &Map<String, Value>, key: &str) -> Result<bool, ArgError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(value) => to_bool(value).ok_or(ArgError::Type {
            name: key.to_string(),
            found: json_type(value),
            expected: "bool",
        }),
    }
}

/// Fold the classic top-level keys into `provider`; values in `provider` win.
fn merge_provider(params: &mut Map<String, Value>) -> Result<(), ArgError> {
    let mut provider = match params.remove("provider") {
        Some(Value::Object(provider)) => provider,
        _ => Map::new(),
    };
    for key in CLASSIC_PROVIDER_KEYS {
        if let Some(value) = params.remove(*key) {
            provider.entry(*key).or_insert(value);
        }
    }

    if let Some(port) = provider.get("port") {
        let valid = port
            .as_u64()
            .and_then(|p| u16::try_from(p).ok())
            .is_some_and(|p| p > 0);
        if !valid {
            return Err(ArgError::Invalid(format!(
                "port must be between 1 and 65535, got {port}"
            )));
        }
    }

    params.insert("provider".to_string(), Value::Object(provider));
    Ok(())
}

impl ModuleArgs {
    /// Rules that span several fields
    fn checked(mut self) -> Result<Self, ArgError> {
        if self.name.trim().is_empty() {
            return Err(ArgError::Invalid("name must not be empty".to_string()));
        }
        if self.provider.ip_address.is_empty() {
            return Err(ArgError::Invalid(
                "ip_address must be specified either at the top level or in provider".to_string(),
            ));
        }
        if self.provider.password.is_none() && self.provider.api_key.is_none() {
            return Err(ArgError::Invalid(
                "either api_key or password must be specified".to_string(),
            ));
        }

        self.applications = self
            .applications
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
        Ok(self)
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Check `input` against `spec`, returning coerced values with defaults filled in
fn validate(
    spec: &[ArgSpec],
    input: &Map<String, Value>,
    prefix: &str,
) -> Result<Map<String, Value>, ArgError> {
    let mut unknown: Vec<String> = input
        .keys()
        .filter(|key| !spec.iter().any(|a| a.name == key.as_str()))
        .map(|key| format!("{prefix}{key}"))
        .collect();
    if !unknown.is_empty() {
        unknown.sort();
        return Err(ArgError::Unsupported(unknown));
    }

    let missing: Vec<String> = spec
        .iter()
        .filter(|a| a.required && input.get(a.name).is_none_or(Value::is_null))
        .map(|a| format!("{prefix}{}", a.name))
        .collect();
    if !missing.is_empty() {
        return Err(ArgError::Missing(missing));
    }

    let mut out = Map::new();
    for arg in spec {
        let value = match input.get(arg.name) {
            Some(v) if !v.is_null() => v.clone(),
            _ => match arg.default {
                Some(default) => Value::String(default.to_string()),
                None => continue,
            },
        };

        let name = format!("{prefix}{}", arg.name);
        let mut value = coerce(arg.kind, &name, &value)?;

        if !arg.choices.is_empty()
            && let Some(s) = value.as_str()
            && !arg.choices.contains(&s)
        {
            return Err(ArgError::Choice {
                name,
                choices: arg.choices.iter().map(|c| (*c).to_string()).collect(),
                got: s.to_string(),
            });
        }

        if arg.kind == ArgType::Dict
            && !arg.options.is_empty()
            && let Value::Object(obj) = &value
        {
            value = Value::Object(validate(arg.options, obj, &format!("{name}."))?);
        }

        out.insert(arg.name.to_string(), value);
    }
    Ok(out)
}

/// Coerce one value to the declared type
fn coerce(kind: ArgType, name: &str, value: &Value) -> Result<Value, ArgError> {
    let type_error = || ArgError::Type {
        name: name.to_string(),
        found: json_type(value),
        expected: kind.as_str(),
    };

    match kind {
        ArgType::Str => match value {
            Value::String(_) => Ok(value.clone()),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            _ => Err(type_error()),
        },
        ArgType::Bool => to_bool(value).map(Value::Bool).ok_or_else(type_error),
        ArgType::Int => match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| type_error()),
            _ => Err(type_error()),
        },
        ArgType::List => match value {
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(_) => Ok(item.clone()),
                    Value::Number(n) => Ok(Value::String(n.to_string())),
                    Value::Bool(b) => Ok(Value::String(b.to_string())),
                    _ => Err(type_error()),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::String(s) => Ok(Value::Array(
                s.split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(|part| Value::String(part.to_string()))
                    .collect(),
            )),
            Value::Number(n) => Ok(Value::Array(vec![Value::String(n.to_string())])),
            _ => Err(type_error()),
        },
        ArgType::Dict => match value {
            Value::Object(_) => Ok(value.clone()),
            Value::String(s) => match serde_json::from_str::<Value>(s) {
                Ok(parsed @ Value::Object(_)) => Ok(parsed),
                _ => Err(type_error()),
            },
            _ => Err(type_error()),
        },
    }
}

/// Harness boolean: true/false plus the usual yes/no/on/off/1/0 spellings
fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "y" | "t" | "1" => Some(true),
            "false" | "no" | "off" | "n" | "f" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(json: &str) -> Result<Invocation, ArgError> {
        parse_document(json)
    }

    #[test]
    fn test_minimal_with_provider() {
        let inv = parse(
            r#"{"provider": {"ip_address": "192.0.2.1", "password": "secret"},
                "name": "app-group", "applications": ["dns", "paloalto-apreture"]}"#,
        )
        .unwrap();

        assert_eq!(inv.args.name, "app-group");
        assert_eq!(inv.args.applications, vec!["dns", "paloalto-apreture"]);
        assert_eq!(inv.args.state, DesiredState::Present);
        assert!(inv.args.commit);
        assert_eq!(inv.args.provider.ip_address, "192.0.2.1");
        assert_eq!(inv.args.provider.username, "admin");
        assert_eq!(inv.args.provider.port, 443);
        assert!(!inv.check_mode);
        assert!(!inv.diff_mode);
    }

    #[test]
    fn test_classic_provider() {
        let inv = parse(
            r#"{"ip_address": "fw", "username": "ops", "api_key": "K", "port": "8443",
                "name": "g", "applications": []}"#,
        )
        .unwrap();
        let provider = inv.args.provider;
        assert_eq!(provider.ip_address, "fw");
        assert_eq!(provider.username, "ops");
        assert_eq!(provider.api_key.as_deref(), Some("K"));
        assert_eq!(provider.port, 8443);
        assert!(inv.args.applications.is_empty());
    }

    #[test]
    fn test_provider_wins_over_classic() {
        let inv = parse(
            r#"{"provider": {"ip_address": "panorama", "api_key": "P", "serial_number": "0071"},
                "ip_address": "ignored", "name": "g", "applications": ["dns"]}"#,
        )
        .unwrap();
        assert_eq!(inv.args.provider.ip_address, "panorama");
        assert_eq!(inv.args.provider.serial_number.as_deref(), Some("0071"));
    }

    #[test]
    fn test_classic_keys_fill_provider_gaps() {
        let inv = parse(
            r#"{"provider": {"ip_address": "fw", "api_key": "K"},
                "port": 8443, "username": "ops", "name": "g", "applications": []}"#,
        )
        .unwrap();
        assert_eq!(inv.args.provider.port, 8443);
        assert_eq!(inv.args.provider.username, "ops");

        let inv = parse(
            r#"{"provider": {"ip_address": "fw", "api_key": "K", "port": 9443},
                "port": 8443, "name": "g", "applications": []}"#,
        )
        .unwrap();
        assert_eq!(inv.args.provider.port, 9443);
        assert_eq!(inv.args.provider.username, "admin");
    }

    #[test]
    fn test_applications_are_trimmed() {
        let inv = parse(
            r#"{"ip_address": "fw", "api_key": "K", "name": "g",
                "applications": [" dns", "", "ssl "]}"#,
        )
        .unwrap();
        assert_eq!(inv.args.applications, vec!["dns", "ssl"]);
    }

    #[test]
    fn test_wrapped_args_and_harness_flags() {
        let inv = parse(
            r#"{"ANSIBLE_MODULE_ARGS": {"ip_address": "fw", "password": "p", "name": "g",
                "applications": "dns, ssl", "state": "absent", "commit": "no",
                "_ansible_check_mode": true, "_ansible_diff": "yes",
                "_ansible_verbosity": 3}}"#,
        )
        .unwrap();
        assert!(inv.check_mode);
        assert!(inv.diff_mode);
        assert_eq!(inv.args.applications, vec!["dns", "ssl"]);
        assert_eq!(inv.args.state, DesiredState::Absent);
        assert!(!inv.args.commit);
    }

    #[test]
    fn test_missing_required() {
        let err = parse(r#"{"ip_address": "fw", "password": "p"}"#).unwrap_err();
        assert_eq!(err, ArgError::Missing(vec!["name".into(), "applications".into()]));
        assert_eq!(err.to_string(), "missing required arguments: name, applications");
    }

    #[test]
    fn test_required_one_of() {
        let err = parse(r#"{"name": "g", "applications": []}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "one of the following is required: provider, ip_address"
        );
    }

    #[test]
    fn test_unsupported_parameters() {
        let err = parse(
            r#"{"ip_address": "fw", "password": "p", "name": "g", "applications": [],
                "zeta": 1, "alpha": 2}"#,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported parameters for (panos_application_group) module: alpha, zeta"
        );
    }

    #[test]
    fn test_unsupported_provider_option() {
        let err = parse(
            r#"{"provider": {"ip_address": "fw", "password": "p", "timeout": 5},
                "name": "g", "applications": []}"#,
        )
        .unwrap_err();
        assert_eq!(err, ArgError::Unsupported(vec!["provider.timeout".into()]));
    }

    #[test]
    fn test_invalid_choice() {
        let err = parse(
            r#"{"ip_address": "fw", "password": "p", "name": "g", "applications": [],
                "state": "gone"}"#,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "value of state must be one of: present, absent, got: gone"
        );
    }

    #[test]
    fn test_invalid_bool() {
        let err = parse(
            r#"{"ip_address": "fw", "password": "p", "name": "g", "applications": [],
                "commit": "maybe"}"#,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "argument 'commit' is of type str and we were unable to convert to bool"
        );
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = parse(r#"{"ip_address": "fw", "password": "p", "name": " ", "applications": []}"#)
            .unwrap_err();
        assert_eq!(err, ArgError::Invalid("name must not be empty".into()));
    }

    #[test]
    fn test_credentials_required() {
        let err = parse(r#"{"ip_address": "fw", "name": "g", "applications": []}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "either api_key or password must be specified"
        );
    }

    #[test]
    fn test_port_range() {
        let err = parse(
            r#"{"ip_address": "fw", "password": "p", "port": 70000, "name": "g", "applications": []}"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "port must be between 1 and 65535, got 70000");
    }

    #[test]
    fn test_port_beyond_i64_is_rejected() {
        let err = parse(
            r#"{"ip_address": "fw", "password": "p", "port": 18446744073709551615,
                "name": "g", "applications": []}"#,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "port must be between 1 and 65535, got 18446744073709551615"
        );

        let err = parse(
            r#"{"ip_address": "fw", "password": "p", "port": -1, "name": "g", "applications": []}"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "port must be between 1 and 65535, got -1");
    }

    #[test]
    fn test_not_an_object() {
        assert!(matches!(parse("[]"), Err(ArgError::Parse(_))));
        assert!(matches!(parse("{nope"), Err(ArgError::Parse(_))));
    }

    #[test]
    fn test_to_bool_spellings() {
        for yes in ["yes", "On", "TRUE", "1", "y"] {
            assert_eq!(to_bool(&Value::String(yes.into())), Some(true), "{yes}");
        }
        for no in ["no", "off", "False", "0", "n"] {
            assert_eq!(to_bool(&Value::String(no.into())), Some(false), "{no}");
        }
        assert_eq!(to_bool(&Value::from(1)), Some(true));
        assert_eq!(to_bool(&Value::from(2)), None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"ip_address": "fw", "api_key": "K", "name": "g", "applications": ["dns"]}}"#
        )
        .unwrap();

        let inv = load(Some(file.path())).unwrap();
        assert_eq!(inv.args.name, "g");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(Some(dir.path().join("args.json").as_path())).unwrap_err();
        assert!(err.to_string().starts_with("Could not read arguments file"));
    }
}
