//! Reboot of the interface module through its web console.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use dpm_common::{LinkError, Rebooter};
use tracing::debug;

/// Issues the module's reboot URL with HTTP basic auth (`user:<password>`).
pub struct HttpRebooter {
    url: String,
    authorization: String,
    agent: ureq::Agent,
}

impl HttpRebooter {
    pub fn new(url: impl Into<String>, password: &str, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        HttpRebooter {
            url: url.into(),
            authorization: format!("Basic {}", STANDARD.encode(format!("user:{password}"))),
            agent: config.into(),
        }
    }
}

impl Rebooter for HttpRebooter {
    fn target(&self) -> &str {
        &self.url
    }

    fn reboot(&mut self) -> Result<(), LinkError> {
        let resp = self
            .agent
            .get(&self.url)
            .header("Authorization", &self.authorization)
            .call()
            .map_err(|e| LinkError::Device(format!("reboot request failed: {e}")))?;
        debug!(status = resp.status().as_u16(), "reboot endpoint answered");
        Ok(())
    }
}
