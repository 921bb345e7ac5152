//! Transport layer for the XML API.
//!
//! The [`Transport`] trait sends one request (a list of query parameters)
//! and returns the raw response body. [`HttpTransport`] is the real
//! implementation and needs the `xapi` feature; without it every request
//! fails with [`Error::Unsupported`].

use crate::error::{Error, Result};
use std::time::Duration;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Sends a single XML API request.
pub trait Transport {
    /// POST the given parameters and return the response body.
    fn request(&self, params: &[(&str, &str)]) -> Result<String>;

    /// Host this transport talks to, for log and error messages.
    fn host(&self) -> &str;
}

/// HTTPS transport to `https://host:port/api/`.
///
/// Management interfaces normally present self-signed certificates, so
/// certificate verification is disabled.
pub struct HttpTransport {
    #[cfg(feature = "xapi")]
    agent: ureq::Agent,
    host: String,
    url: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport for the given management address.
    pub fn new(host: &str, port: u16, timeout: Duration) -> Self {
        let url = if port == 443 {
            format!("https://{host}/api/")
        } else {
            format!("https://{host}:{port}/api/")
        };
        Self {
            #[cfg(feature = "xapi")]
            agent: build_agent(timeout),
            host: host.to_string(),
            url,
            timeout,
        }
    }

    /// API endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(feature = "xapi")]
fn build_agent(timeout: Duration) -> ureq::Agent {
    let tls = ureq::tls::TlsConfig::builder()
        .disable_verification(true)
        .build();
    ureq::Agent::config_builder()
        .tls_config(tls)
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

impl Transport for HttpTransport {
    #[cfg(feature = "xapi")]
    fn request(&self, params: &[(&str, &str)]) -> Result<String> {
        log::trace!(
            "POST {} type={}",
            self.url,
            params
                .iter()
                .find(|(k, _)| *k == "type")
                .map_or("?", |(_, v)| v)
        );

        let mut response = self
            .agent
            .post(&self.url)
            .send_form(params.iter().copied())?;

        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;

        // PAN-OS answers auth failures with 403 and an XML error body.
        if status >= 400 && !body.trim_start().starts_with("<response") {
            return Err(Error::Http {
                message: format!("{} returned HTTP {status}", self.url),
                status: Some(status),
            });
        }
        Ok(body)
    }

    #[cfg(not(feature = "xapi"))]
    fn request(&self, _params: &[(&str, &str)]) -> Result<String> {
        Err(Error::Unsupported)
    }

    fn host(&self) -> &str {
        &self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_default_port() {
        let t = HttpTransport::new("192.0.2.1", 443, DEFAULT_TIMEOUT);
        assert_eq!(t.url(), "https://192.0.2.1/api/");
        assert_eq!(t.host(), "192.0.2.1");
        assert_eq!(t.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_url_custom_port() {
        let t = HttpTransport::new("fw.example.com", 8443, DEFAULT_TIMEOUT);
        assert_eq!(t.url(), "https://fw.example.com:8443/api/");
    }
}
