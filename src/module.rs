//! The result document and the ways a run can fail.

use serde::Serialize;
use std::io::{self, Write};

/// Before/after rendering of the managed object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleDiff {
    pub before: String,
    pub after: String,
}

/// The one JSON object written to stdout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleResult {
    pub changed: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<ModuleDiff>,
}

impl ModuleResult {
    /// Successful run
    pub fn exit(changed: bool, msg: impl Into<String>) -> Self {
        Self {
            changed,
            failed: false,
            msg: msg.into(),
            diff: None,
        }
    }

    /// Failed run; never reports a change
    pub fn fail(msg: impl Into<String>) -> Self {
        Self {
            changed: false,
            failed: true,
            msg: msg.into(),
            diff: None,
        }
    }

    pub fn with_diff(mut self, diff: Option<ModuleDiff>) -> Self {
        self.diff = diff;
        self
    }

    pub fn exit_code(&self) -> i32 {
        i32::from(self.failed)
    }

    /// Write the result as a single JSON line
    pub fn emit<W: Write>(&self, mut out: W) -> io::Result<()> {
        serde_json::to_writer(&mut out, self)?;
        writeln!(out)?;
        out.flush()
    }
}

impl From<ModuleError> for ModuleResult {
    fn from(err: ModuleError) -> Self {
        Self::fail(err.to_string())
    }
}

/// Fatal outcomes, each with the message reported to the caller
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    /// Bad arguments or a build that cannot reach devices
    #[error("{0}")]
    Config(String),

    /// Could not connect, authenticate, or resolve the scope
    #[error("{0}")]
    Connection(String),

    #[error("Failed refresh: {0}")]
    Refresh(panos::Error),

    #[error("Failed apply: {0}")]
    Apply(anyhow::Error),

    #[error("Failed commit: {0}")]
    Commit(panos::Error),
}
