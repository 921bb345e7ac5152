//! Device sessions and the [`XmlApi`] abstraction.
//!
//! [`XmlApi`] is the seam between object-level helpers and the wire:
//! [`PanDevice`] implements it over a [`Transport`], and
//! [`crate::mock::MockDevice`] implements it in memory for tests.

use crate::error::{Error, Result};
use crate::response::{parse_response, response_message};
use crate::transport::Transport;
use crate::xml::XmlNode;
use log::{debug, info};
use std::fmt;
use std::time::Duration;

/// `show system info` operational command.
pub const SHOW_SYSTEM_INFO: &str = "<show><system><info></info></system></show>";

/// Kind of PAN-OS device behind a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Firewall,
    Panorama,
}

impl DeviceKind {
    /// Classify a device from its `model` string.
    pub fn from_model(model: &str) -> Self {
        if model == "Panorama" || model.starts_with("M-") {
            Self::Panorama
        } else {
            Self::Firewall
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Firewall => write!(f, "firewall"),
            Self::Panorama => write!(f, "Panorama"),
        }
    }
}

/// Subset of `show system info` that the callers care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    pub hostname: String,
    pub model: String,
    pub serial: String,
    pub sw_version: String,
    pub kind: DeviceKind,
}

impl SystemInfo {
    /// Parse from the `<result>` of `show system info`.
    pub fn from_result(result: &XmlNode) -> Result<Self> {
        let system = result
            .child("system")
            .ok_or_else(|| Error::UnexpectedResponse("missing <system> in system info".into()))?;

        let model = system
            .text_at("model")
            .ok_or_else(|| Error::UnexpectedResponse("missing <model> in system info".into()))?
            .to_string();

        Ok(Self {
            hostname: system.text_at("hostname").unwrap_or_default().to_string(),
            serial: system.text_at("serial").unwrap_or_default().to_string(),
            sw_version: system.text_at("sw-version").unwrap_or_default().to_string(),
            kind: DeviceKind::from_model(&model),
            model,
        })
    }
}

/// Commit polling settings.
#[derive(Debug, Clone)]
pub struct CommitOptions {
    /// Delay between job status polls.
    pub poll_interval: Duration,
    /// Give up after this many polls.
    pub max_polls: u32,
}

impl Default for CommitOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            max_polls: 300,
        }
    }
}

/// What a commit request ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The candidate config had no pending changes.
    NothingToCommit,
    /// A commit job ran to completion.
    Committed { job: u64, details: Vec<String> },
}

/// Configuration and operational access to a device.
///
/// All configuration reads go against the candidate configuration.
pub trait XmlApi {
    /// Fetch the element at `xpath`. Returns `None` when it does not exist.
    fn get(&self, xpath: &str) -> Result<Option<XmlNode>>;

    /// Merge `element` under the node at `xpath`.
    fn set(&self, xpath: &str, element: &str) -> Result<()>;

    /// Replace the node at `xpath` with `element`.
    fn edit(&self, xpath: &str, element: &str) -> Result<()>;

    /// Delete the node at `xpath`.
    fn delete(&self, xpath: &str) -> Result<()>;

    /// Run an operational command and return its `<result>`.
    fn op(&self, cmd: &str) -> Result<XmlNode>;

    /// Commit the candidate configuration and wait for the job.
    fn commit(&self, opts: &CommitOptions) -> Result<CommitOutcome>;

    /// Run `show system info`.
    fn system_info(&self) -> Result<SystemInfo> {
        SystemInfo::from_result(&self.op(SHOW_SYSTEM_INFO)?)
    }
}

/// Generate an API key for the given credentials.
pub fn keygen<T: Transport>(transport: &T, username: &str, password: &str) -> Result<String> {
    let params = [("type", "keygen"), ("user", username), ("password", password)];
    let root = parse_response(&transport.request(&params)?).map_err(|e| match e {
        Error::Api { message, .. } => Error::Auth(message),
        other => other,
    })?;

    root.text_at("result/key")
        .map(str::to_string)
        .ok_or_else(|| Error::Auth("keygen response did not contain a key".to_string()))
}

/// An authenticated XML API session.
pub struct PanDevice<T: Transport> {
    transport: T,
    api_key: String,
    target: Option<String>,
}

impl<T: Transport> PanDevice<T> {
    /// Use an existing API key.
    pub fn with_key(transport: T, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            api_key: api_key.into(),
            target: None,
        }
    }

    /// Generate an API key from username and password.
    pub fn login(transport: T, username: &str, password: &str) -> Result<Self> {
        debug!("Generating API key for {}@{}", username, transport.host());
        let api_key = keygen(&transport, username, password)?;
        Ok(Self::with_key(transport, api_key))
    }

    /// Route every request through Panorama to the firewall with this serial.
    pub fn with_target(mut self, serial: Option<String>) -> Self {
        self.target = serial.filter(|s| !s.is_empty());
        self
    }

    /// Serial of the proxied firewall, if any.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Host of the underlying transport.
    pub fn host(&self) -> &str {
        self.transport.host()
    }

    fn call(&self, params: &[(&str, &str)]) -> Result<XmlNode> {
        let mut full: Vec<(&str, &str)> = Vec::with_capacity(params.len() + 2);
        full.extend_from_slice(params);
        full.push(("key", self.api_key.as_str()));
        if let Some(target) = &self.target {
            full.push(("target", target.as_str()));
        }
        parse_response(&self.transport.request(&full)?)
    }

    fn config(&self, action: &str, xpath: &str, element: Option<&str>) -> Result<XmlNode> {
        let mut params = vec![("type", "config"), ("action", action), ("xpath", xpath)];
        if let Some(element) = element {
            params.push(("element", element));
        }
        self.call(&params)
    }

    fn job_status(&self, job: u64) -> Result<XmlNode> {
        let cmd = format!("<show><jobs><id>{job}</id></jobs></show>");
        let result = self.op(&cmd)?;
        result
            .child("job")
            .cloned()
            .ok_or_else(|| Error::UnexpectedResponse(format!("no status for job {job}")))
    }

    fn wait_for_job(&self, job: u64, opts: &CommitOptions) -> Result<CommitOutcome> {
        for attempt in 1..=opts.max_polls {
            let status = self.job_status(job)?;
            let state = status.text_at("status").unwrap_or("");
            let result = status.text_at("result").unwrap_or("");
            debug!("Job {job} poll {attempt}: status={state} result={result}");

            let details = job_details(&status);
            if result == "FAIL" {
                return Err(Error::CommitFailed {
                    job,
                    details: details.join("; "),
                });
            }
            if state == "FIN" {
                return Ok(CommitOutcome::Committed { job, details });
            }
            std::thread::sleep(opts.poll_interval);
        }
        Err(Error::CommitTimeout {
            job,
            attempts: opts.max_polls,
        })
    }
}

fn job_details(job: &XmlNode) -> Vec<String> {
    job.find("details")
        .map(|d| {
            d.children_named("line")
                .map(|l| l.text.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

impl<T: Transport> XmlApi for PanDevice<T> {
    fn get(&self, xpath: &str) -> Result<Option<XmlNode>> {
        let root = match self.config("get", xpath, None) {
            Ok(root) => root,
            Err(e) if e.is_object_missing() => return Ok(None),
            Err(e) => return Err(e),
        };
        Ok(root.child("result").and_then(|r| r.children.first()).cloned())
    }

    fn set(&self, xpath: &str, element: &str) -> Result<()> {
        self.config("set", xpath, Some(element)).map(|_| ())
    }

    fn edit(&self, xpath: &str, element: &str) -> Result<()> {
        self.config("edit", xpath, Some(element)).map(|_| ())
    }

    fn delete(&self, xpath: &str) -> Result<()> {
        self.config("delete", xpath, None).map(|_| ())
    }

    fn op(&self, cmd: &str) -> Result<XmlNode> {
        let root = self.call(&[("type", "op"), ("cmd", cmd)])?;
        root.child("result")
            .cloned()
            .ok_or_else(|| Error::UnexpectedResponse("op response without <result>".to_string()))
    }

    fn commit(&self, opts: &CommitOptions) -> Result<CommitOutcome> {
        let root = self.call(&[("type", "commit"), ("cmd", "<commit></commit>")])?;

        let Some(job) = root.text_at("result/job") else {
            let msg = response_message(&root).unwrap_or_default();
            debug!("Commit returned no job: {msg}");
            return Ok(CommitOutcome::NothingToCommit);
        };

        let job: u64 = job
            .parse()
            .map_err(|_| Error::UnexpectedResponse(format!("invalid job id {job:?}")))?;
        info!("Commit job {job} enqueued on {}", self.host());
        self.wait_for_job(job, opts)
    }
}
