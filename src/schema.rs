//! Static module documentation and argument spec.
//!
//! The argument validator in [`crate::config`] is driven by
//! [`ARGUMENT_SPEC`], and `--describe` prints [`MODULE_DOC`].

use serde::Serialize;

/// Name the module reports in validation errors.
pub const MODULE_NAME: &str = "panos_application_group";

// ============================================================================
// Argument Spec
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    Str,
    Bool,
    Int,
    List,
    Dict,
}

impl ArgType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::List => "list",
            Self::Dict => "dict",
        }
    }
}

/// One accepted argument.
#[derive(Debug, Serialize)]
pub struct ArgSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: ArgType,
    pub required: bool,
    /// Default in its textual form; coerced like user input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    pub choices: &'static [&'static str],
    /// Value must never be echoed back.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub no_log: bool,
    pub description: &'static str,
    /// Sub-options of a `dict` argument.
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    pub options: &'static [ArgSpec],
}

impl ArgSpec {
    const fn new(name: &'static str, kind: ArgType, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            default: None,
            choices: &[],
            no_log: false,
            description,
            options: &[],
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn default(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    const fn choices(mut self, choices: &'static [&'static str]) -> Self {
        self.choices = choices;
        self
    }

    const fn no_log(mut self) -> Self {
        self.no_log = true;
        self
    }

    const fn options(mut self, options: &'static [ArgSpec]) -> Self {
        self.options = options;
        self
    }
}

/// Sub-options of `provider`.
pub static PROVIDER_OPTIONS: &[ArgSpec] = &[
    ArgSpec::new(
        "ip_address",
        ArgType::Str,
        "IP address or hostname of the firewall or Panorama.",
    ),
    ArgSpec::new(
        "username",
        ArgType::Str,
        "Username for authentication (admin when not given here or at the top level).",
    ),
    ArgSpec::new("password", ArgType::Str, "Password for authentication.").no_log(),
    ArgSpec::new(
        "api_key",
        ArgType::Str,
        "API key to use instead of username/password.",
    )
    .no_log(),
    ArgSpec::new(
        "port",
        ArgType::Int,
        "Port used to connect to the device (443 when not given here or at the top level).",
    ),
    ArgSpec::new(
        "serial_number",
        ArgType::Str,
        "Serial number of a firewall to target through Panorama.",
    ),
];

/// Every top-level argument the module accepts.
pub static ARGUMENT_SPEC: &[ArgSpec] = &[
    ArgSpec::new(
        "provider",
        ArgType::Dict,
        "Connection parameters for the firewall or Panorama.",
    )
    .options(PROVIDER_OPTIONS),
    ArgSpec::new(
        "ip_address",
        ArgType::Str,
        "Classic provider: IP address or hostname of the device.",
    ),
    ArgSpec::new("username", ArgType::Str, "Classic provider: username."),
    ArgSpec::new("password", ArgType::Str, "Classic provider: password.").no_log(),
    ArgSpec::new("api_key", ArgType::Str, "Classic provider: API key.").no_log(),
    ArgSpec::new("port", ArgType::Int, "Classic provider: port."),
    ArgSpec::new(
        "vsys",
        ArgType::Str,
        "The vsys this object belongs to (firewall only, default vsys1).",
    ),
    ArgSpec::new(
        "device_group",
        ArgType::Str,
        "The device group this object belongs to (Panorama only, default shared).",
    ),
    ArgSpec::new("name", ArgType::Str, "Name of the application group.").required(),
    ArgSpec::new(
        "applications",
        ArgType::List,
        "List of applications in the group.",
    )
    .required(),
    ArgSpec::new("state", ArgType::Str, "Desired state of the object.")
        .default("present")
        .choices(declarative::DesiredState::CHOICES),
    ArgSpec::new("commit", ArgType::Bool, "Commit if changed.").default("true"),
];

/// At least one argument of each group must be given.
pub static REQUIRED_ONE_OF: &[&[&str]] = &[&["provider", "ip_address"]];

// ============================================================================
// Module Documentation
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ModuleDoc {
    pub module: &'static str,
    pub short_description: &'static str,
    pub description: &'static [&'static str],
    pub requirements: &'static [&'static str],
    pub notes: &'static [&'static str],
    pub supports_check_mode: bool,
    pub supports_diff_mode: bool,
    pub options: &'static [ArgSpec],
    pub required_one_of: &'static [&'static [&'static str]],
    pub examples: &'static str,
    pub returns: &'static [(&'static str, &'static str)],
}

const EXAMPLES: &str = r#"- name: Create application group 'app-group'
  panos_application_group:
    provider: '{{ provider }}'
    name: 'app-group'
    applications: ["dns","paloalto-apreture"]

- name: Remove application group 'app-group'
  panos_application_group:
    provider: '{{ provider }}'
    name: 'app-group'
    applications: ["dns","paloalto-apreture"]
    state: 'absent'
"#;

pub static MODULE_DOC: ModuleDoc = ModuleDoc {
    module: MODULE_NAME,
    short_description: "create an application group",
    description: &["Create, update or remove an application group on a PAN-OS firewall or Panorama."],
    requirements: &["PAN-OS XML API reachable over HTTPS"],
    notes: &["Panorama is supported.", "Check mode is supported.", "Diff mode is supported."],
    supports_check_mode: true,
    supports_diff_mode: true,
    options: ARGUMENT_SPEC,
    required_one_of: REQUIRED_ONE_OF,
    examples: EXAMPLES,
    returns: &[
        ("changed", "whether the device configuration was changed"),
        ("msg", "human readable status"),
        ("diff", "before/after rendering of the object (diff mode only)"),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    fn arg(name: &str) -> Option<&'static ArgSpec> {
        ARGUMENT_SPEC.iter().find(|a| a.name == name)
    }

    #[test]
    fn test_required_arguments() {
        let required: Vec<&str> = ARGUMENT_SPEC
            .iter()
            .filter(|a| a.required)
            .map(|a| a.name)
            .collect();
        assert_eq!(required, vec!["name", "applications"]);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(arg("state").unwrap().default, Some("present"));
        assert_eq!(arg("commit").unwrap().default, Some("true"));
        assert_eq!(arg("state").unwrap().choices, &["present", "absent"]);
        assert!(arg("nope").is_none());
    }

    #[test]
    fn test_provider_options_have_no_defaults() {
        assert!(PROVIDER_OPTIONS.iter().all(|o| o.default.is_none()));
    }

    #[test]
    fn test_secrets_are_no_log() {
        assert!(arg("password").unwrap().no_log);
        assert!(PROVIDER_OPTIONS.iter().any(|o| o.name == "api_key" && o.no_log));
    }

    #[test]
    fn test_doc_serializes() {
        let json = serde_json::to_value(&MODULE_DOC).unwrap();
        assert_eq!(json["module"], "panos_application_group");
        assert_eq!(json["options"][0]["name"], "provider");
        assert_eq!(json["options"][0]["type"], "dict");
        assert!(json["options"][0]["options"].is_array());
        assert!(json["options"][8].get("default").is_none());
    }
}
