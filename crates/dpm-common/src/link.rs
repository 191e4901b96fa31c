//! # Link Capabilities
//!
//! Both hardware links (the interface module's TCP socket and the cellular
//! modem's serial port) are driven through [`Link`]. Recovery beyond a
//! reconnect goes through [`Rebooter`], which power-cycles the far end by
//! some side channel (an HTTP endpoint, a secondary serial device).
//!
//! ```text
//!   connect ──▶ read_until / write ──▶ close
//!      ▲                 │
//!      └──── LinkError ──┘   (engines reconnect, then reboot)
//! ```

use std::time::Duration;

use thiserror::Error;

// ─── Errors ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("link is not connected")]
    NotConnected,
    #[error("timed out waiting for a terminator")]
    Timeout,
    #[error("peer closed the connection")]
    Closed,
    #[error("rejected by peer: {0}")]
    Rejected(String),
    #[error("device error: {0}")]
    Device(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LinkError {
    /// A read timeout is the normal idle case, not a link failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self, LinkError::Timeout)
    }
}

// ─── Capabilities ───────────────────────────────────────────────────────────

/// Line-oriented, terminator-framed transport.
pub trait Link {
    /// Open the underlying connection. Any existing connection is replaced.
    fn connect(&mut self) -> Result<(), LinkError>;

    fn is_connected(&self) -> bool;

    /// Read until the earliest of `terminators` has been received and return
    /// everything up to and including it.
    ///
    /// On timeout, bytes already received stay buffered for the next call
    /// and `LinkError::Timeout` is returned.
    fn read_until(
        &mut self,
        terminators: &[&[u8]],
        timeout: Duration,
    ) -> Result<Vec<u8>, LinkError>;

    fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError>;

    /// Drop any buffered, unconsumed input.
    fn clear_input(&mut self);

    fn close(&mut self);
}

/// Hardware-level recovery of the far end of a link.
pub trait Rebooter {
    /// Name of the device being rebooted, for logs.
    fn target(&self) -> &str;

    fn reboot(&mut self) -> Result<(), LinkError>;
}

impl<L: Link + ?Sized> Link for Box<L> {
    fn connect(&mut self) -> Result<(), LinkError> {
        (**self).connect()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn read_until(
        &mut self,
        terminators: &[&[u8]],
        timeout: Duration,
    ) -> Result<Vec<u8>, LinkError> {
        (**self).read_until(terminators, timeout)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        (**self).write(bytes)
    }

    fn clear_input(&mut self) {
        (**self).clear_input()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

impl<R: Rebooter + ?Sized> Rebooter for Box<R> {
    fn target(&self) -> &str {
        (**self).target()
    }

    fn reboot(&mut self) -> Result<(), LinkError> {
        (**self).reboot()
    }
}

// ─── Buffering ──────────────────────────────────────────────────────────────

/// Accumulates raw bytes from a stream and hands back terminator-framed
/// chunks. Shared by the TCP and serial links.
#[derive(Debug, Default, Clone)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Remove and return everything through the earliest-ending terminator.
    pub fn take_through(&mut self, terminators: &[&[u8]]) -> Option<Vec<u8>> {
        let end = terminators
            .iter()
            .filter(|t| !t.is_empty())
            .filter_map(|t| {
                self.buf
                    .windows(t.len())
                    .position(|w| w == *t)
                    .map(|pos| pos + t.len())
            })
            .min()?;
        Some(self.buf.drain(..end).collect())
    }
}

/// Sleep for a settle delay. Zero is a no-op so tests can disable delays.
pub fn settle(delay: Duration) {
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
}
