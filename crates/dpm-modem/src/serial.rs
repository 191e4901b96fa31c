//! Serial port transport for the modem's communications device.

use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use dpm_common::{LineBuffer, Link, LinkError};
use serialport::{ClearBuffer, SerialPort};
use tracing::debug;

pub(crate) fn open_port(
    device: &str,
    baud: u32,
    timeout: Duration,
) -> Result<Box<dyn SerialPort>, LinkError> {
    let mut builder = serialport::new(device, baud).timeout(timeout);
    #[cfg(unix)]
    {
        builder = builder
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(serialport::Parity::None);
    }
    builder
        .open()
        .map_err(|e| LinkError::Device(format!("failed to open {device}: {e}")))
}

pub struct SerialLink {
    device: String,
    baud: u32,
    timeout: Duration,
    port: Option<Box<dyn SerialPort>>,
    buffer: LineBuffer,
}

impl SerialLink {
    pub fn new(device: impl Into<String>, baud: u32, timeout: Duration) -> Self {
        SerialLink {
            device: device.into(),
            baud,
            timeout,
            port: None,
            buffer: LineBuffer::new(),
        }
    }

    pub fn device(&self) -> &str {
        &self.device
    }
}

impl Link for SerialLink {
    fn connect(&mut self) -> Result<(), LinkError> {
        self.close();
        let port = open_port(&self.device, self.baud, self.timeout)?;
        debug!(device = %self.device, baud = self.baud, "modem port opened");
        self.port = Some(port);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    fn read_until(
        &mut self,
        terminators: &[&[u8]],
        timeout: Duration,
    ) -> Result<Vec<u8>, LinkError> {
        let deadline = Instant::now() + timeout;
        let mut chunk = [0u8; 512];
        loop {
            if let Some(reply) = self.buffer.take_through(terminators) {
                return Ok(reply);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(LinkError::Timeout);
            }
            let port = self.port.as_mut().ok_or(LinkError::NotConnected)?;
            port.set_timeout(remaining)
                .map_err(|e| LinkError::Device(e.to_string()))?;
            match port.read(&mut chunk) {
                Ok(0) => {}
                Ok(n) => self.buffer.extend(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::TimedOut => return Err(LinkError::Timeout),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    self.port = None;
                    return Err(LinkError::Io(e));
                }
            }
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        let port = self.port.as_mut().ok_or(LinkError::NotConnected)?;
        if let Err(e) = port.write_all(bytes).and_then(|()| port.flush()) {
            self.port = None;
            return Err(LinkError::Io(e));
        }
        Ok(())
    }

    fn clear_input(&mut self) {
        self.buffer.clear();
        if let Some(port) = self.port.as_ref() {
            let _ = port.clear(ClearBuffer::Input);
        }
    }

    fn close(&mut self) {
        self.port = None;
        self.buffer.clear();
    }
}
