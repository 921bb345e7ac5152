//! Device connection, scope resolution and commit.

use log::{debug, info};
use panos::scope::device_group_xpath;
use panos::transport::DEFAULT_TIMEOUT;
use panos::{
    CommitOptions, CommitOutcome, DeviceKind, HttpTransport, PanDevice, Scope, SystemInfo, XmlApi,
};
use std::time::Duration;

use crate::config::{ModuleArgs, Provider};
use crate::module::ModuleError;

/// Fail early when this build cannot reach a device at all.
pub fn check_capabilities() -> Result<(), ModuleError> {
    if panos::XAPI_AVAILABLE {
        Ok(())
    } else {
        Err(ModuleError::Config(panos::Error::Unsupported.to_string()))
    }
}

/// Opens an authenticated session from provider settings.
pub trait Connector {
    type Api: XmlApi;

    fn connect(&self, provider: &Provider) -> panos::Result<Self::Api>;
}

/// Connects over HTTPS.
pub struct HttpConnector {
    timeout: Duration,
}

impl HttpConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for HttpConnector {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl Connector for HttpConnector {
    type Api = PanDevice<HttpTransport>;

    fn connect(&self, provider: &Provider) -> panos::Result<Self::Api> {
        let transport = HttpTransport::new(&provider.ip_address, provider.port, self.timeout);
        debug!(
            "Connecting to {} (timeout {}s)",
            transport.url(),
            transport.timeout().as_secs()
        );

        let device = match &provider.api_key {
            Some(key) => PanDevice::with_key(transport, key.as_str()),
            None => PanDevice::login(
                transport,
                &provider.username,
                provider.password.as_deref().unwrap_or_default(),
            )?,
        };
        let device = device.with_target(provider.serial_number.clone());
        if let Some(serial) = device.target() {
            debug!("Proxying requests to firewall {serial}");
        }
        Ok(device)
    }
}

/// Where the managed object lives on the connected device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parent {
    pub kind: DeviceKind,
    pub scope: Scope,
    pub info: SystemInfo,
}

/// Detect the device kind and resolve the vsys or device group to manage.
pub fn get_parent<A: XmlApi + ?Sized>(api: &A, args: &ModuleArgs) -> Result<Parent, ModuleError> {
    let info = api
        .system_info()
        .map_err(|e| ModuleError::Connection(format!("Failed to connect: {e}")))?;
    debug!(
        "Connected to {} ({} {}, PAN-OS {})",
        info.hostname, info.kind, info.model, info.sw_version
    );

    let scope = match info.kind {
        DeviceKind::Firewall => {
            if args
                .device_group
                .as_deref()
                .is_some_and(|dg| !dg.is_empty() && dg != "shared")
            {
                return Err(ModuleError::Connection(
                    "device_group is only valid when connected to Panorama".to_string(),
                ));
            }
            Scope::firewall(args.vsys.as_deref())
        }
        DeviceKind::Panorama => {
            if args
                .vsys
                .as_deref()
                .is_some_and(|v| !matches!(v, "" | "vsys1" | "shared"))
            {
                return Err(ModuleError::Connection(
                    "vsys is only valid when connected to a firewall".to_string(),
                ));
            }
            let scope = Scope::panorama(args.device_group.as_deref());
            if let Scope::DeviceGroup(name) = &scope {
                ensure_device_group(api, name)?;
            }
            scope
        }
    };

    debug!("Managing objects in {scope}");
    Ok(Parent {
        kind: info.kind,
        scope,
        info,
    })
}

fn ensure_device_group<A: XmlApi + ?Sized>(api: &A, name: &str) -> Result<(), ModuleError> {
    let xpath = device_group_xpath(name).map_err(|e| ModuleError::Connection(e.to_string()))?;
    match api.get(&xpath) {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(ModuleError::Connection(format!(
            "'{name}' device group is not present"
        ))),
        Err(e) => Err(ModuleError::Connection(format!(
            "Failed to look up device group '{name}': {e}"
        ))),
    }
}

/// Commit the candidate config and wait for the job.
pub fn commit<A: XmlApi + ?Sized>(api: &A) -> panos::Result<CommitOutcome> {
    let outcome = api.commit(&CommitOptions::default())?;
    match &outcome {
        CommitOutcome::NothingToCommit => info!("Nothing to commit"),
        CommitOutcome::Committed { job, details } => {
            info!("Commit job {job} finished");
            for line in details {
                debug!("  {line}");
            }
        }
    }
    Ok(outcome)
}

#[cfg(test)]
impl Connector for panos::mock::MockDevice {
    type Api = Self;

    fn connect(&self, _provider: &Provider) -> panos::Result<Self::Api> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::DesiredState;
    use panos::mock::MockDevice;

    fn args(vsys: Option<&str>, device_group: Option<&str>) -> ModuleArgs {
        ModuleArgs {
            provider: Provider {
                ip_address: "192.0.2.1".into(),
                username: "admin".into(),
                password: Some("secret".into()),
                api_key: None,
                port: 443,
                serial_number: None,
            },
            vsys: vsys.map(str::to_string),
            device_group: device_group.map(str::to_string),
            name: "g".into(),
            applications: vec![],
            state: DesiredState::Present,
            commit: true,
        }
    }

    fn message(err: ModuleError) -> String {
        err.to_string()
    }

    #[test]
    #[cfg(feature = "xapi")]
    fn test_capabilities_available_with_xapi() {
        assert!(check_capabilities().is_ok());
    }

    #[test]
    #[cfg(not(feature = "xapi"))]
    fn test_capabilities_missing_without_xapi() {
        match check_capabilities() {
            Err(ModuleError::Config(msg)) => assert_eq!(
                msg,
                "PAN-OS XML API support is not available in this build (enable the `xapi` feature)"
            ),
            other => panic!("expected a config error, got {other:?}"),
        }
    }

    #[test]
    fn test_firewall_defaults_to_vsys1() {
        let parent = get_parent(&MockDevice::firewall(), &args(None, None)).unwrap();
        assert_eq!(parent.kind, DeviceKind::Firewall);
        assert_eq!(parent.scope, Scope::Vsys("vsys1".into()));
    }

    #[test]
    fn test_firewall_explicit_vsys() {
        let parent = get_parent(&MockDevice::firewall(), &args(Some("vsys2"), None)).unwrap();
        assert_eq!(parent.scope, Scope::Vsys("vsys2".into()));
    }

    #[test]
    fn test_firewall_rejects_device_group() {
        let err = get_parent(&MockDevice::firewall(), &args(None, Some("branch"))).unwrap_err();
        assert_eq!(
            message(err),
            "device_group is only valid when connected to Panorama"
        );
    }

    #[test]
    fn test_panorama_defaults_to_shared() {
        let parent = get_parent(&MockDevice::panorama(), &args(None, None)).unwrap();
        assert_eq!(parent.kind, DeviceKind::Panorama);
        assert_eq!(parent.scope, Scope::Shared);
    }

    #[test]
    fn test_panorama_rejects_vsys() {
        let err = get_parent(&MockDevice::panorama(), &args(Some("vsys3"), None)).unwrap_err();
        assert_eq!(message(err), "vsys is only valid when connected to a firewall");
    }

    #[test]
    fn test_panorama_device_group_must_exist() {
        let device = MockDevice::panorama();
        let err = get_parent(&device, &args(None, Some("branch"))).unwrap_err();
        assert_eq!(message(err), "'branch' device group is not present");

        device.add_device_group("branch");
        let parent = get_parent(&device, &args(None, Some("branch"))).unwrap();
        assert_eq!(parent.scope, Scope::DeviceGroup("branch".into()));
    }

    #[test]
    fn test_commit_nothing_pending() {
        let device = MockDevice::firewall();
        assert_eq!(commit(&device).unwrap(), CommitOutcome::NothingToCommit);
        assert_eq!(device.commits(), 1);
    }
}
