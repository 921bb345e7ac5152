//! Resource and store traits for declarative state management
//!
//! A Resource is a declared object that can be compared with what already
//! exists. A Store is where resources live and knows how to create, update
//! and delete them.

use crate::types::ResourceState;
use anyhow::Result;
use std::fmt;

/// Core trait for declarative resources
///
/// Every managed object implements this trait, which provides:
/// - Identity (id, type, description)
/// - Comparison against an existing instance
/// - A rendering of its state for diffs
///
/// # Example
///
/// ```
/// use declarative::Resource;
///
/// #[derive(Debug)]
/// struct Tag {
///     name: String,
///     color: String,
/// }
///
/// impl Resource for Tag {
///     fn id(&self) -> &str {
///         &self.name
///     }
///
///     fn resource_type(&self) -> &'static str {
///         "tag"
///     }
///
///     fn same_as(&self, other: &Self) -> bool {
///         self.color == other.color
///     }
///
///     fn details(&self) -> Option<String> {
///         Some(format!("color: {}", self.color))
///     }
/// }
/// ```
pub trait Resource: fmt::Debug {
    /// Unique identifier within the store (e.g. the object name)
    fn id(&self) -> &str;

    /// Resource type category, used in logs and diffs
    fn resource_type(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> String {
        format!("{} '{}'", self.resource_type(), self.id())
    }

    /// Whether `other` (an existing instance with the same id) already
    /// matches this declaration
    fn same_as(&self, other: &Self) -> bool;

    /// Rendering of the resource's attributes for diffs
    fn details(&self) -> Option<String> {
        None
    }

    /// State of this resource as present
    fn present_state(&self) -> ResourceState {
        ResourceState::Present {
            details: self.details(),
        }
    }
}

/// Where resources of type `R` live
///
/// Implementations perform the actual mutation; [`crate::apply_state`]
/// decides which one to call.
pub trait Store<R: Resource> {
    /// Create a resource that does not exist yet
    fn create(&mut self, desired: &R) -> Result<()>;

    /// Replace an existing resource with the declared one
    fn update(&mut self, desired: &R, current: &R) -> Result<()>;

    /// Delete an existing resource
    fn delete(&mut self, current: &R) -> Result<()>;
}
