//! # Declarative
//!
//! A framework for declarative resource management.
//!
//! This crate provides the core abstractions for declaring desired state,
//! comparing it with what currently exists, and converging on it.
//!
//! ## Core Concepts
//!
//! - **Resource**: Something with identity and attributes that can be compared
//! - **Store**: Where resources live; performs create/update/delete
//! - **DesiredState**: Whether a resource should be present or absent
//! - **apply_state**: Decides which store operation (if any) converges a resource
//!
//! ## Example
//!
//! ```
//! use declarative::{
//!     ApplyContext, ApplyResult, DesiredState, Resource, Store, apply_state,
//! };
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Entry { name: String, value: u32 }
//!
//! impl Resource for Entry {
//!     fn id(&self) -> &str { &self.name }
//!     fn resource_type(&self) -> &'static str { "entry" }
//!     fn same_as(&self, other: &Self) -> bool { self.value == other.value }
//! }
//!
//! struct VecStore(Vec<Entry>);
//!
//! impl Store<Entry> for VecStore {
//!     fn create(&mut self, desired: &Entry) -> anyhow::Result<()> {
//!         self.0.push(desired.clone());
//!         Ok(())
//!     }
//!     fn update(&mut self, desired: &Entry, _current: &Entry) -> anyhow::Result<()> {
//!         self.0.retain(|e| e.name != desired.name);
//!         self.0.push(desired.clone());
//!         Ok(())
//!     }
//!     fn delete(&mut self, current: &Entry) -> anyhow::Result<()> {
//!         self.0.retain(|e| e.name != current.name);
//!         Ok(())
//!     }
//! }
//!
//! let mut store = VecStore(Vec::new());
//! let desired = Entry { name: "a".into(), value: 1 };
//! let listing = store.0.clone();
//!
//! let outcome = apply_state(
//!     &desired,
//!     &listing,
//!     DesiredState::Present,
//!     &mut store,
//!     &ApplyContext::default(),
//! )?;
//! assert_eq!(outcome.result, ApplyResult::Created);
//! assert_eq!(store.0.len(), 1);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod apply;
pub mod context;
pub mod diff;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use apply::{ApplyOutcome, apply_state};
pub use context::ApplyContext;
pub use diff::ResourceDiff;
pub use resource::{Resource, Store};
pub use types::{ApplyResult, DesiredState, ParseStateError, ResourceState};
