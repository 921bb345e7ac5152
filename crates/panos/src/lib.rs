//! # panos
//!
//! A small, blocking client for the PAN-OS XML API.
//!
//! The crate covers what declarative object management needs and nothing
//! more:
//!
//! - **Sessions**: [`PanDevice`] over a [`Transport`], API key generation,
//!   `show system info` and firewall/Panorama detection
//! - **Scopes**: [`Scope`] resolves vsys, device group and shared xpaths
//! - **Objects**: the [`PanObject`] trait, [`ApplicationGroup`], and the
//!   [`refreshall`]/[`create`]/[`edit`]/[`delete`] helpers
//! - **Commit**: commit with job polling via [`XmlApi::commit`]
//!
//! ## Example
//!
//! ```no_run
//! use panos::{ApplicationGroup, HttpTransport, PanDevice, Scope, XmlApi, refreshall};
//! use panos::transport::DEFAULT_TIMEOUT;
//!
//! let transport = HttpTransport::new("192.0.2.10", 443, DEFAULT_TIMEOUT);
//! let device = PanDevice::login(transport, "admin", "secret")?;
//! let groups: Vec<ApplicationGroup> = refreshall(&device, &Scope::firewall(None))?;
//! println!("{} application groups", groups.len());
//! # Ok::<(), panos::Error>(())
//! ```
//!
//! ## Testing
//!
//! [`mock::MockDevice`] implements [`XmlApi`] in memory and records calls.

pub mod device;
pub mod error;
pub mod mock;
pub mod objects;
pub mod response;
pub mod scope;
pub mod transport;
pub mod xml;

pub use device::{
    CommitOptions, CommitOutcome, DeviceKind, PanDevice, SystemInfo, XmlApi, keygen,
};
pub use error::{Error, ErrorCategory, Result};
pub use objects::{ApplicationGroup, PanObject, create, delete, edit, refreshall};
pub use scope::Scope;
pub use transport::{HttpTransport, Transport};
pub use xml::XmlNode;

/// Whether this build can talk to real devices.
pub const XAPI_AVAILABLE: bool = cfg!(feature = "xapi");
