//! Core types for declarative resource management

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a resource should exist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    /// Resource must exist and match the declaration
    #[default]
    Present,
    /// Resource must not exist
    Absent,
}

impl DesiredState {
    /// Accepted spellings, in declaration order
    pub const CHOICES: &'static [&'static str] = &["present", "absent"];
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Absent => write!(f, "absent"),
        }
    }
}

/// Error returned when parsing an unknown state string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown state {0:?} (expected one of: present, absent)")]
pub struct ParseStateError(pub String);

impl FromStr for DesiredState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            other => Err(ParseStateError(other.to_string())),
        }
    }
}

/// Current or desired state of a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceState {
    /// Resource exists/is configured
    Present { details: Option<String> },
    /// Resource does not exist/is not configured
    Absent,
}

impl ResourceState {
    /// Details of a present resource, empty when absent
    pub fn details(&self) -> &str {
        match self {
            Self::Present { details } => details.as_deref().unwrap_or(""),
            Self::Absent => "",
        }
    }
}

/// Result of applying a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    /// No changes needed
    NoChange,
    /// Resource was created
    Created,
    /// Resource was modified
    Modified,
    /// Resource was removed
    Removed,
}

impl ApplyResult {
    /// Check if the result represents a change
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Created | Self::Modified | Self::Removed)
    }

    /// Past-tense verb for log messages
    pub fn verb(&self) -> &'static str {
        match self {
            Self::NoChange => "unchanged",
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}
