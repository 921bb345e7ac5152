//! Error types for PAN-OS XML API operations.
//!
//! Errors are categorized so callers can decide how to report them and
//! whether a failure is worth retrying at a higher layer.

use std::fmt;

/// Result type alias for PAN-OS operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of PAN-OS errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transport failure (connection refused, TLS, timeout).
    Network,
    /// Bad credentials or API key.
    Auth,
    /// The device rejected the request.
    Api,
    /// The device answered with something we could not parse.
    Xml,
    /// Invalid input or missing capability on our side.
    Config,
    /// A commit job failed or never finished.
    Commit,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::Auth => "Authentication failed",
            Self::Api => "Request rejected by device",
            Self::Xml => "Malformed device response",
            Self::Config => "Invalid configuration",
            Self::Commit => "Commit failed",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check that the management interface is reachable on the given port",
            Self::Auth => "Verify the username/password or regenerate the API key",
            Self::Api => "Check the object name, scope and referenced applications",
            Self::Xml => "Check that the address points at a PAN-OS management interface",
            Self::Config => "Check the module arguments",
            Self::Commit => "Inspect the job details on the device and commit manually",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while talking to a PAN-OS device.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed before an API response was received.
    #[error("HTTP request failed: {message}")]
    Http {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// The device returned `status="error"`.
    #[error("{}", format_api_error(.code.as_deref(), .message))]
    Api {
        /// PAN-OS response code, if present.
        code: Option<String>,
        /// Joined `msg/line` text.
        message: String,
    },

    /// API key generation failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Response body was not well-formed XML.
    #[error("invalid XML: {0}")]
    Xml(String),

    /// Response was well-formed but did not have the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Object name cannot be used in an xpath.
    #[error("invalid object name {name:?}: {reason}")]
    InvalidName {
        /// Offending name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Commit job finished with a failure result.
    #[error("commit job {job} failed: {details}")]
    CommitFailed {
        /// Job id.
        job: u64,
        /// Job detail lines.
        details: String,
    },

    /// Commit job did not reach `FIN` within the polling budget.
    #[error("commit job {job} did not finish after {attempts} polls")]
    CommitTimeout {
        /// Job id.
        job: u64,
        /// Number of status polls issued.
        attempts: u32,
    },

    /// The crate was built without the HTTP transport.
    #[error("PAN-OS XML API support is not available in this build (enable the `xapi` feature)")]
    Unsupported,
}

fn format_api_error(code: Option<&str>, message: &str) -> String {
    match code {
        Some(code) => format!("API error (code {code}): {message}"),
        None => format!("API error: {message}"),
    }
}

impl Error {
    /// Get the category of this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Http { .. } => ErrorCategory::Network,
            Self::Api { code, .. } if code.as_deref() == Some("403") => ErrorCategory::Auth,
            Self::Api { .. } => ErrorCategory::Api,
            Self::Auth(_) => ErrorCategory::Auth,
            Self::Xml(_) | Self::UnexpectedResponse(_) => ErrorCategory::Xml,
            Self::InvalidName { .. } | Self::Unsupported => ErrorCategory::Config,
            Self::CommitFailed { .. } | Self::CommitTimeout { .. } => ErrorCategory::Commit,
        }
    }

    /// Whether the device reported that the object does not exist.
    #[must_use]
    pub fn is_object_missing(&self) -> bool {
        matches!(self, Self::Api { code: Some(code), .. } if code == "7")
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(err.to_string())
    }
}

#[cfg(feature = "xapi")]
impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        let status = match &err {
            ureq::Error::StatusCode(code) => Some(*code),
            _ => None,
        };
        Self::Http {
            message: err.to_string(),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = Error::Api {
            code: Some("12".to_string()),
            message: "Invalid object".to_string(),
        };
        assert_eq!(err.to_string(), "API error (code 12): Invalid object");

        let err = Error::Api {
            code: None,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error: boom");
    }

    #[test]
    fn test_error_category() {
        let http = Error::Http {
            message: "connection refused".to_string(),
            status: None,
        };
        assert_eq!(http.category(), ErrorCategory::Network);

        let forbidden = Error::Api {
            code: Some("403".to_string()),
            message: "Invalid credentials.".to_string(),
        };
        assert_eq!(forbidden.category(), ErrorCategory::Auth);

        let commit = Error::CommitFailed {
            job: 4,
            details: "validation error".to_string(),
        };
        assert_eq!(commit.category(), ErrorCategory::Commit);
    }

    #[test]
    fn test_is_object_missing() {
        let missing = Error::Api {
            code: Some("7".to_string()),
            message: "Object doesn't exist".to_string(),
        };
        assert!(missing.is_object_missing());
        assert!(!Error::Unsupported.is_object_missing());
    }
}
