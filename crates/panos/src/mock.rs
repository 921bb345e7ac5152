//! In-memory device for testing without network access.
//!
//! [`MockDevice`] keeps a candidate configuration keyed by container xpath
//! and records every [`XmlApi`] call so tests can assert exactly which
//! mutations and commits were issued.
//!
//! ```
//! use panos::mock::{Call, MockDevice};
//! use panos::{ApplicationGroup, Scope, refreshall};
//!
//! let device = MockDevice::firewall();
//! let scope = Scope::firewall(None);
//! device
//!     .add_object(&scope, &ApplicationGroup::new("web", vec!["ssl".into()]))
//!     .unwrap();
//!
//! let groups: Vec<ApplicationGroup> = refreshall(&device, &scope).unwrap();
//! assert_eq!(groups.len(), 1);
//! assert!(matches!(device.calls()[0], Call::Get(_)));
//! ```

use crate::device::{CommitOptions, CommitOutcome, SHOW_SYSTEM_INFO, XmlApi};
use crate::error::{Error, Result};
use crate::objects::{PanObject, listing_xpath};
use crate::scope::{DEVICE_XPATH, Scope, entry_predicate};
use crate::xml::XmlNode;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// A recorded API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Get(String),
    Set { xpath: String, element: String },
    Edit { xpath: String, element: String },
    Delete(String),
    Op(String),
    Commit,
}

impl Call {
    /// Whether this call writes to the candidate config.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Set { .. } | Self::Edit { .. } | Self::Delete(_))
    }
}

#[derive(Debug, Default)]
struct MockState {
    containers: BTreeMap<String, Vec<XmlNode>>,
    model: String,
    calls: Vec<Call>,
    dirty: bool,
    next_job: u64,
    fail_get: Option<String>,
    fail_mutations: Option<String>,
    fail_commit: Option<String>,
}

/// Mock device backed by an in-memory candidate config.
///
/// Clones share state, so a clone can be handed to code under test while
/// the original is used for assertions.
#[derive(Debug, Clone, Default)]
pub struct MockDevice {
    state: Arc<Mutex<MockState>>,
}

impl MockDevice {
    /// A mock that reports the given model in `show system info`.
    pub fn with_model(model: &str) -> Self {
        let mock = Self::default();
        mock.state.lock().unwrap().model = model.to_string();
        mock
    }

    /// A mock firewall (`PA-VM`).
    pub fn firewall() -> Self {
        Self::with_model("PA-VM")
    }

    /// A mock Panorama.
    pub fn panorama() -> Self {
        Self::with_model("Panorama")
    }

    /// Seed an object without recording a call.
    pub fn add_object<O: PanObject>(&self, scope: &Scope, obj: &O) -> Result<()> {
        let container = listing_xpath::<O>(scope)?;
        entry_predicate(obj.name())?;
        let mut state = self.state.lock().unwrap();
        upsert(state.containers.entry(container).or_default(), obj.to_entry());
        Ok(())
    }

    /// Seed a Panorama device group.
    pub fn add_device_group(&self, name: &str) {
        let container = format!("{DEVICE_XPATH}/device-group");
        let mut state = self.state.lock().unwrap();
        upsert(
            state.containers.entry(container).or_default(),
            XmlNode::new("entry").with_attr("name", name),
        );
    }

    /// Current objects of type `O` under `scope`, without recording a call.
    pub fn objects<O: PanObject>(&self, scope: &Scope) -> Result<Vec<O>> {
        let container = listing_xpath::<O>(scope)?;
        let state = self.state.lock().unwrap();
        state
            .containers
            .get(&container)
            .map(|entries| entries.iter().map(O::from_entry).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls that wrote to the candidate config.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    /// Number of commit calls.
    pub fn commits(&self) -> usize {
        self.calls().iter().filter(|c| **c == Call::Commit).count()
    }

    /// Forget recorded calls (seeded config is kept).
    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Make every `get` fail with an API error.
    pub fn fail_get(&self, message: &str) {
        self.state.lock().unwrap().fail_get = Some(message.to_string());
    }

    /// Make every set/edit/delete fail with an API error.
    pub fn fail_mutations(&self, message: &str) {
        self.state.lock().unwrap().fail_mutations = Some(message.to_string());
    }

    /// Make every commit job fail.
    pub fn fail_commit(&self, message: &str) {
        self.state.lock().unwrap().fail_commit = Some(message.to_string());
    }

    fn record(&self, call: Call) -> std::sync::MutexGuard<'_, MockState> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state
    }
}

fn api_error(message: &str) -> Error {
    Error::Api {
        code: None,
        message: message.to_string(),
    }
}

fn split_entry_xpath(xpath: &str) -> Option<(&str, &str)> {
    let (container, rest) = xpath.rsplit_once("/entry[@name='")?;
    let name = rest.strip_suffix("']")?;
    Some((container, name))
}

fn entry_name(node: &XmlNode) -> Option<&str> {
    node.attr("name")
}

fn upsert(entries: &mut Vec<XmlNode>, entry: XmlNode) {
    match entries
        .iter_mut()
        .find(|e| entry_name(e).is_some() && entry_name(e) == entry_name(&entry))
    {
        Some(existing) => *existing = entry,
        None => entries.push(entry),
    }
}

/// `set` semantics: merge children, appending `member` values that are not present.
fn merge(existing: &mut XmlNode, incoming: XmlNode) {
    for child in incoming.children {
        if child.name == "member" {
            if !existing
                .children_named("member")
                .any(|m| m.text == child.text)
            {
                existing.children.push(child);
            }
            continue;
        }
        match existing.children.iter_mut().find(|c| c.name == child.name) {
            Some(target) => merge(target, child),
            None => existing.children.push(child),
        }
    }
}

impl XmlApi for MockDevice {
    fn get(&self, xpath: &str) -> Result<Option<XmlNode>> {
        let state = self.record(Call::Get(xpath.to_string()));
        if let Some(message) = &state.fail_get {
            return Err(api_error(message));
        }

        if let Some(entries) = state.containers.get(xpath) {
            if entries.is_empty() {
                return Ok(None);
            }
            let name = xpath.rsplit('/').next().unwrap_or(xpath);
            let mut node = XmlNode::new(name);
            node.children = entries.clone();
            return Ok(Some(node));
        }

        Ok(split_entry_xpath(xpath).and_then(|(container, name)| {
            state
                .containers
                .get(container)?
                .iter()
                .find(|e| entry_name(e) == Some(name))
                .cloned()
        }))
    }

    fn set(&self, xpath: &str, element: &str) -> Result<()> {
        let mut state = self.record(Call::Set {
            xpath: xpath.to_string(),
            element: element.to_string(),
        });
        if let Some(message) = &state.fail_mutations {
            return Err(api_error(message));
        }

        let incoming = XmlNode::parse(element)?;
        let entries = state.containers.entry(xpath.to_string()).or_default();
        match entries
            .iter_mut()
            .find(|e| entry_name(e).is_some() && entry_name(e) == entry_name(&incoming))
        {
            Some(existing) => merge(existing, incoming),
            None => entries.push(incoming),
        }
        state.dirty = true;
        Ok(())
    }

    fn edit(&self, xpath: &str, element: &str) -> Result<()> {
        let mut state = self.record(Call::Edit {
            xpath: xpath.to_string(),
            element: element.to_string(),
        });
        if let Some(message) = &state.fail_mutations {
            return Err(api_error(message));
        }

        let (container, name) = split_entry_xpath(xpath)
            .ok_or_else(|| api_error("edit xpath must address an entry"))?;
        let incoming = XmlNode::parse(element)?;
        if entry_name(&incoming) != Some(name) {
            return Err(api_error("edit element name does not match xpath"));
        }
        upsert(
            state.containers.entry(container.to_string()).or_default(),
            incoming,
        );
        state.dirty = true;
        Ok(())
    }

    fn delete(&self, xpath: &str) -> Result<()> {
        let mut state = self.record(Call::Delete(xpath.to_string()));
        if let Some(message) = &state.fail_mutations {
            return Err(api_error(message));
        }

        let (container, name) = split_entry_xpath(xpath)
            .ok_or_else(|| api_error("delete xpath must address an entry"))?;
        let removed = state.containers.get_mut(container).is_some_and(|entries| {
            let before = entries.len();
            entries.retain(|e| entry_name(e) != Some(name));
            entries.len() < before
        });
        if removed {
            state.dirty = true;
        }
        Ok(())
    }

    fn op(&self, cmd: &str) -> Result<XmlNode> {
        let state = self.record(Call::Op(cmd.to_string()));
        if cmd != SHOW_SYSTEM_INFO {
            return Err(Error::Api {
                code: Some("17".to_string()),
                message: format!("mock does not support {cmd}"),
            });
        }

        let system = XmlNode::new("system")
            .with_child(XmlNode::new("hostname").with_text("mock"))
            .with_child(XmlNode::new("model").with_text(state.model.as_str()))
            .with_child(XmlNode::new("serial").with_text("000000000000"))
            .with_child(XmlNode::new("sw-version").with_text("10.2.0"));
        Ok(XmlNode::new("result").with_child(system))
    }

    fn commit(&self, _opts: &CommitOptions) -> Result<CommitOutcome> {
        let mut state = self.record(Call::Commit);
        state.next_job += 1;
        let job = state.next_job;

        if let Some(message) = &state.fail_commit {
            return Err(Error::CommitFailed {
                job,
                details: message.clone(),
            });
        }
        if !state.dirty {
            return Ok(CommitOutcome::NothingToCommit);
        }
        state.dirty = false;
        Ok(CommitOutcome::Committed {
            job,
            details: vec!["Configuration committed successfully".to_string()],
        })
    }
}
