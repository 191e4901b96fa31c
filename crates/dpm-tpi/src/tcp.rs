//! Blocking TCP transport for the TPI session.

use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use dpm_common::{LineBuffer, Link, LinkError};
use tracing::debug;

pub struct TcpLink {
    host: String,
    port: u16,
    connect_timeout: Duration,
    stream: Option<TcpStream>,
    buffer: LineBuffer,
}

impl TcpLink {
    pub fn new(host: impl Into<String>, port: u16, connect_timeout: Duration) -> Self {
        TcpLink {
            host: host.into(),
            port,
            connect_timeout,
            stream: None,
            buffer: LineBuffer::new(),
        }
    }
}

impl Link for TcpLink {
    fn connect(&mut self) -> Result<(), LinkError> {
        self.close();
        let mut last_err = None;
        for addr in (self.host.as_str(), self.port).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    debug!(%addr, "TPI socket connected");
                    self.stream = Some(stream);
                    return Ok(());
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err
            .map(LinkError::Io)
            .unwrap_or_else(|| LinkError::Device(format!("{} did not resolve", self.host))))
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn read_until(
        &mut self,
        terminators: &[&[u8]],
        timeout: Duration,
    ) -> Result<Vec<u8>, LinkError> {
        let deadline = Instant::now() + timeout;
        let mut chunk = [0u8; 1024];
        loop {
            if let Some(frame) = self.buffer.take_through(terminators) {
                return Ok(frame);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(LinkError::Timeout);
            }
            let stream = self.stream.as_mut().ok_or(LinkError::NotConnected)?;
            stream.set_read_timeout(Some(remaining))?;
            match stream.read(&mut chunk) {
                Ok(0) => {
                    self.stream = None;
                    return Err(LinkError::Closed);
                }
                Ok(n) => self.buffer.extend(&chunk[..n]),
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Err(LinkError::Timeout);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    self.stream = None;
                    return Err(LinkError::Io(e));
                }
            }
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        let stream = self.stream.as_mut().ok_or(LinkError::NotConnected)?;
        if let Err(e) = stream.write_all(bytes).and_then(|()| stream.flush()) {
            self.stream = None;
            return Err(LinkError::Io(e));
        }
        Ok(())
    }

    fn clear_input(&mut self) {
        self.buffer.clear();
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        self.buffer.clear();
    }
}
