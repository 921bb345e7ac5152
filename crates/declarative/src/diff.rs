//! Diff computation for resources

use crate::resource::Resource;
use crate::types::{DesiredState, ResourceState};
use serde::{Deserialize, Serialize};

/// A diff between current and desired state of a resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDiff {
    /// Unique identifier of the resource
    pub resource_id: String,
    /// Type of the resource
    pub resource_type: String,
    /// Human-readable description
    pub description: String,
    /// Current state
    pub current: ResourceState,
    /// Desired state
    pub desired: ResourceState,
}

impl ResourceDiff {
    /// Build a diff from a declaration and the existing instance, if any
    pub fn between<R: Resource>(desired: &R, current: Option<&R>, state: DesiredState) -> Self {
        Self {
            resource_id: desired.id().to_string(),
            resource_type: desired.resource_type().to_string(),
            description: desired.description(),
            current: current.map_or(ResourceState::Absent, |c| c.present_state()),
            desired: match state {
                DesiredState::Present => desired.present_state(),
                DesiredState::Absent => ResourceState::Absent,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Tag {
        name: String,
        color: String,
    }

    impl Resource for Tag {
        fn id(&self) -> &str {
            &self.name
        }

        fn resource_type(&self) -> &'static str {
            "tag"
        }

        fn same_as(&self, other: &Self) -> bool {
            self.color == other.color
        }

        fn details(&self) -> Option<String> {
            Some(format!("color: {}", self.color))
        }
    }

    fn tag(color: &str) -> Tag {
        Tag {
            name: "web".into(),
            color: color.into(),
        }
    }

    fn present(details: &str) -> ResourceState {
        ResourceState::Present {
            details: Some(details.to_string()),
        }
    }

    #[test]
    fn test_between_missing() {
        let diff = ResourceDiff::between(&tag("red"), None, DesiredState::Present);
        assert_eq!(diff.resource_id, "web");
        assert_eq!(diff.resource_type, "tag");
        assert_eq!(diff.description, "tag 'web'");
        assert_eq!(diff.current, ResourceState::Absent);
        assert_eq!(diff.desired, present("color: red"));
    }

    #[test]
    fn test_between_existing() {
        let current = tag("blue");
        let diff = ResourceDiff::between(&tag("red"), Some(&current), DesiredState::Present);
        assert_eq!(diff.current, present("color: blue"));
        assert_eq!(diff.desired, present("color: red"));
    }

    #[test]
    fn test_between_absent() {
        let current = tag("blue");
        let diff = ResourceDiff::between(&tag("red"), Some(&current), DesiredState::Absent);
        assert_eq!(diff.current, present("color: blue"));
        assert_eq!(diff.desired, ResourceState::Absent);
    }
}
