//! Configuration objects and the generic helpers that read and write them.

use crate::device::XmlApi;
use crate::error::{Error, Result};
use crate::scope::{Scope, entry_predicate};
use crate::xml::XmlNode;
use log::debug;
use std::collections::BTreeSet;

/// A named configuration object stored as `<ROOT><entry name="..">`.
pub trait PanObject: Sized {
    /// Container element name under the scope, e.g. `application-group`.
    const ROOT: &'static str;

    /// Object name (the `entry/@name`).
    fn name(&self) -> &str;

    /// Parse one `<entry>` element.
    fn from_entry(entry: &XmlNode) -> Result<Self>;

    /// Render as an `<entry>` element.
    fn to_entry(&self) -> XmlNode;

    /// Whether two objects are equivalent as far as the device is concerned.
    fn equal(&self, other: &Self) -> bool;

    /// Multi-line, human-readable rendering used for diffs.
    fn summary(&self) -> String;
}

/// A named collection of application identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationGroup {
    pub name: String,
    pub members: Vec<String>,
}

impl ApplicationGroup {
    /// Members are trimmed and blank ones dropped, matching what the
    /// device stores.
    pub fn new(name: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            name: name.into(),
            members: members
                .into_iter()
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    fn member_set(&self) -> BTreeSet<&str> {
        self.members.iter().map(String::as_str).collect()
    }
}

impl PanObject for ApplicationGroup {
    const ROOT: &'static str = "application-group";

    fn name(&self) -> &str {
        &self.name
    }

    fn from_entry(entry: &XmlNode) -> Result<Self> {
        let name = entry
            .attr("name")
            .ok_or_else(|| Error::UnexpectedResponse("application-group entry without a name".into()))?;

        // PAN-OS 8.0+ nests members under <members>; older releases list them directly.
        let container = entry.child("members").unwrap_or(entry);
        let members = container
            .children_named("member")
            .map(|m| m.text.clone())
            .collect();

        Ok(Self::new(name, members))
    }

    fn to_entry(&self) -> XmlNode {
        let members = self
            .members
            .iter()
            .fold(XmlNode::new("members"), |node, m| {
                node.with_child(XmlNode::new("member").with_text(m.as_str()))
            });
        XmlNode::new("entry")
            .with_attr("name", self.name.as_str())
            .with_child(members)
    }

    fn equal(&self, other: &Self) -> bool {
        self.name == other.name && self.member_set() == other.member_set()
    }

    fn summary(&self) -> String {
        let mut out = format!("name: {}\nmembers:\n", self.name);
        for member in &self.members {
            out.push_str("  - ");
            out.push_str(member);
            out.push('\n');
        }
        out
    }
}

/// Xpath of the object container for `O` under `scope`.
pub fn listing_xpath<O: PanObject>(scope: &Scope) -> Result<String> {
    Ok(format!("{}/{}", scope.xpath()?, O::ROOT))
}

/// Xpath of the named entry for `O` under `scope`.
pub fn entry_xpath<O: PanObject>(scope: &Scope, name: &str) -> Result<String> {
    Ok(format!("{}/{}", listing_xpath::<O>(scope)?, entry_predicate(name)?))
}

/// Fetch every `O` under `scope` from the candidate config.
pub fn refreshall<O: PanObject, A: XmlApi + ?Sized>(api: &A, scope: &Scope) -> Result<Vec<O>> {
    let xpath = listing_xpath::<O>(scope)?;
    let Some(container) = api.get(&xpath)? else {
        debug!("No {} objects in {scope}", O::ROOT);
        return Ok(Vec::new());
    };

    let objects = container
        .children_named("entry")
        .map(O::from_entry)
        .collect::<Result<Vec<_>>>()?;
    debug!("Fetched {} {} object(s) from {scope}", objects.len(), O::ROOT);
    Ok(objects)
}

/// Create `obj` under `scope`.
pub fn create<O: PanObject, A: XmlApi + ?Sized>(api: &A, scope: &Scope, obj: &O) -> Result<()> {
    let xpath = listing_xpath::<O>(scope)?;
    // Validate the name before sending it anywhere.
    entry_predicate(obj.name())?;
    api.set(&xpath, &obj.to_entry().to_xml()?)
}

/// Replace the existing entry named like `obj` with `obj`.
pub fn edit<O: PanObject, A: XmlApi + ?Sized>(api: &A, scope: &Scope, obj: &O) -> Result<()> {
    let xpath = entry_xpath::<O>(scope, obj.name())?;
    api.edit(&xpath, &obj.to_entry().to_xml()?)
}

/// Delete the entry named `name` under `scope`.
pub fn delete<O: PanObject, A: XmlApi + ?Sized>(api: &A, scope: &Scope, name: &str) -> Result<()> {
    let xpath = entry_xpath::<O>(scope, name)?;
    api.delete(&xpath)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(name: &str, members: &[&str]) -> ApplicationGroup {
        ApplicationGroup::new(name, members.iter().map(|m| (*m).to_string()).collect())
    }

    #[test]
    fn test_to_entry() {
        let g = group("app-group", &["dns", "paloalto-apreture"]);
        assert_eq!(
            g.to_entry().to_xml().unwrap(),
            r#"<entry name="app-group"><members><member>dns</member><member>paloalto-apreture</member></members></entry>"#
        );
    }

    #[test]
    fn test_to_entry_empty_members() {
        let g = group("empty", &[]);
        assert_eq!(g.to_entry().to_xml().unwrap(), r#"<entry name="empty"><members/></entry>"#);
    }

    #[test]
    fn test_from_entry_nested_members() {
        let node = XmlNode::parse(
            r#"<entry name="web"><members><member>ssl</member><member>web-browsing</member></members></entry>"#,
        )
        .unwrap();
        let g = ApplicationGroup::from_entry(&node).unwrap();
        assert_eq!(g, group("web", &["ssl", "web-browsing"]));
    }

    #[test]
    fn test_from_entry_legacy_layout() {
        let node =
            XmlNode::parse(r#"<entry name="old"><member>dns</member></entry>"#).unwrap();
        let g = ApplicationGroup::from_entry(&node).unwrap();
        assert_eq!(g.members, vec!["dns".to_string()]);
    }

    #[test]
    fn test_from_entry_requires_name() {
        let node = XmlNode::parse("<entry><members/></entry>").unwrap();
        assert!(ApplicationGroup::from_entry(&node).is_err());
    }

    #[test]
    fn test_equal_ignores_order_and_duplicates() {
        let a = group("g", &["dns", "ssl"]);
        assert!(a.equal(&group("g", &["ssl", "dns"])));
        assert!(a.equal(&group("g", &["dns", "ssl", "dns"])));
        assert!(!a.equal(&group("g", &["dns"])));
        assert!(!a.equal(&group("other", &["dns", "ssl"])));
    }

    #[test]
    fn test_new_normalises_members() {
        let g = group("g", &[" dns", "", "ssl ", "  "]);
        assert_eq!(g.members, vec!["dns".to_string(), "ssl".to_string()]);
    }

    #[test]
    fn test_summary() {
        let g = group("g", &["dns"]);
        assert_eq!(g.summary(), "name: g\nmembers:\n  - dns\n");
    }

    #[test]
    fn test_entry_xpath() {
        let xpath = entry_xpath::<ApplicationGroup>(&Scope::Shared, "g").unwrap();
        assert_eq!(xpath, "/config/shared/application-group/entry[@name='g']");
    }
}
