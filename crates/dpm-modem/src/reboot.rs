//! Out-of-band modem reboot through a secondary serial device.

use std::io::{Read, Write};
use std::time::Duration;

use dpm_common::{settle, LinkError, Rebooter};
use tracing::{debug, warn};

use crate::at;
use crate::serial::open_port;

/// Sends `AT` then `AT#REBOOT` on the modem's spare port, which answers
/// with the factory profile even when the communications port is wedged.
pub struct AtRebooter {
    device: String,
    baud: u32,
    timeout: Duration,
    /// Pause after each command before the next one.
    command_gap: Duration,
}

impl AtRebooter {
    pub fn new(device: impl Into<String>, baud: u32, timeout: Duration) -> Self {
        AtRebooter {
            device: device.into(),
            baud,
            timeout,
            command_gap: Duration::from_millis(500),
        }
    }
}

impl Rebooter for AtRebooter {
    fn target(&self) -> &str {
        &self.device
    }

    fn reboot(&mut self) -> Result<(), LinkError> {
        let mut port = open_port(&self.device, self.baud, self.timeout)?;

        port.write_all(format!("{}\r", at::ATTENTION).as_bytes())?;
        settle(self.command_gap);
        let mut reply = [0u8; 64];
        match port.read(&mut reply) {
            Ok(n) => debug!(reply = %String::from_utf8_lossy(&reply[..n]).trim(), "reboot port answered"),
            Err(e) => debug!(error = %e, "no answer on reboot port, rebooting anyway"),
        }

        warn!(device = %self.device, "rebooting modem");
        port.write_all(format!("{}\r", at::REBOOT).as_bytes())?;
        port.flush()?;
        settle(self.command_gap * 2);
        Ok(())
    }
}
