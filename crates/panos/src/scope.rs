//! Parent scopes (containers) for configuration objects.

use crate::error::{Error, Result};
use std::fmt;

/// Xpath of the local device entry on both firewalls and Panorama.
pub const DEVICE_XPATH: &str = "/config/devices/entry[@name='localhost.localdomain']";

/// Xpath of the shared scope.
pub const SHARED_XPATH: &str = "/config/shared";

/// Default virtual system on firewalls.
pub const DEFAULT_VSYS: &str = "vsys1";

/// The container an object lives under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// `/config/shared` on either device kind.
    Shared,
    /// A firewall virtual system.
    Vsys(String),
    /// A Panorama device group.
    DeviceGroup(String),
}

impl Scope {
    /// Firewall scope for an optional vsys (`vsys1` by default, `shared` maps to shared).
    pub fn firewall(vsys: Option<&str>) -> Self {
        match vsys {
            Some("shared") => Self::Shared,
            Some(v) if !v.is_empty() => Self::Vsys(v.to_string()),
            _ => Self::Vsys(DEFAULT_VSYS.to_string()),
        }
    }

    /// Panorama scope for an optional device group (shared by default).
    pub fn panorama(device_group: Option<&str>) -> Self {
        match device_group {
            None | Some("" | "shared") => Self::Shared,
            Some(dg) => Self::DeviceGroup(dg.to_string()),
        }
    }

    /// Absolute xpath of this scope.
    pub fn xpath(&self) -> Result<String> {
        match self {
            Self::Shared => Ok(SHARED_XPATH.to_string()),
            Self::Vsys(vsys) => Ok(format!("{DEVICE_XPATH}/vsys/{}", entry_predicate(vsys)?)),
            Self::DeviceGroup(dg) => Ok(format!(
                "{DEVICE_XPATH}/device-group/{}",
                entry_predicate(dg)?
            )),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shared => write!(f, "shared"),
            Self::Vsys(vsys) => write!(f, "vsys {vsys}"),
            Self::DeviceGroup(dg) => write!(f, "device group {dg}"),
        }
    }
}

/// `entry[@name='NAME']`, rejecting names that cannot be quoted.
pub fn entry_predicate(name: &str) -> Result<String> {
    if name.is_empty() {
        return Err(Error::InvalidName {
            name: name.to_string(),
            reason: "name must not be empty".to_string(),
        });
    }
    if name.contains('\'') {
        return Err(Error::InvalidName {
            name: name.to_string(),
            reason: "single quotes cannot be used in an xpath predicate".to_string(),
        });
    }
    Ok(format!("entry[@name='{name}']"))
}

/// Xpath of the Panorama device-group list.
pub fn device_group_xpath(name: &str) -> Result<String> {
    Ok(format!("{DEVICE_XPATH}/device-group/{}", entry_predicate(name)?))
}
