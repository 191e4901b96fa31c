//! Scripted test doubles for [`Link`] and [`Rebooter`].
//!
//! Handles are cheap clones over shared state so a test can keep one copy
//! for assertions after moving another into an engine.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use crate::link::{LineBuffer, Link, LinkError, Rebooter};

type Responder = Box<dyn FnMut(&[u8]) -> Option<Vec<u8>>>;

#[derive(Default)]
struct ScriptState {
    connected: bool,
    connects: u32,
    closes: u32,
    fail_connects: u32,
    fail_reads: u32,
    fail_writes: u32,
    greeting: Vec<u8>,
    inbound: LineBuffer,
    queued: VecDeque<Vec<u8>>,
    writes: Vec<Vec<u8>>,
    responder: Option<Responder>,
}

/// In-memory link driven by a script.
///
/// * `greet_with` bytes are pushed into the inbound buffer on every connect.
/// * `push_inbound` bytes become readable immediately.
/// * `queue_inbound` chunks are released one per `read_until` call that
///   would otherwise time out, simulating a peer that talks later.
/// * `respond_with` installs a closure that sees every write and may answer.
#[derive(Clone, Default)]
pub struct ScriptedLink {
    state: Rc<RefCell<ScriptState>>,
}

impl ScriptedLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts out connected, as if `connect` already succeeded.
    pub fn connected() -> Self {
        let link = Self::new();
        link.state.borrow_mut().connected = true;
        link
    }

    pub fn greet_with(&self, bytes: &[u8]) -> &Self {
        self.state.borrow_mut().greeting = bytes.to_vec();
        self
    }

    pub fn push_inbound(&self, bytes: &[u8]) -> &Self {
        self.state.borrow_mut().inbound.extend(bytes);
        self
    }

    pub fn queue_inbound(&self, bytes: &[u8]) -> &Self {
        self.state.borrow_mut().queued.push_back(bytes.to_vec());
        self
    }

    pub fn respond_with<F>(&self, responder: F) -> &Self
    where
        F: FnMut(&[u8]) -> Option<Vec<u8>> + 'static,
    {
        self.state.borrow_mut().responder = Some(Box::new(responder));
        self
    }

    pub fn fail_next_connects(&self, n: u32) -> &Self {
        self.state.borrow_mut().fail_connects = n;
        self
    }

    pub fn fail_next_reads(&self, n: u32) -> &Self {
        self.state.borrow_mut().fail_reads = n;
        self
    }

    pub fn fail_next_writes(&self, n: u32) -> &Self {
        self.state.borrow_mut().fail_writes = n;
        self
    }

    /// Drop the connection as a peer reset would.
    pub fn sever(&self) {
        self.state.borrow_mut().connected = false;
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state.borrow().writes.clone()
    }

    /// Writes rendered as lossy UTF-8, for readable assertions.
    pub fn written_text(&self) -> Vec<String> {
        self.state
            .borrow()
            .writes
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }

    pub fn clear_writes(&self) {
        self.state.borrow_mut().writes.clear();
    }

    pub fn connects(&self) -> u32 {
        self.state.borrow().connects
    }

    pub fn closes(&self) -> u32 {
        self.state.borrow().closes
    }
}

impl Link for ScriptedLink {
    fn connect(&mut self) -> Result<(), LinkError> {
        let mut s = self.state.borrow_mut();
        s.connects += 1;
        if s.fail_connects > 0 {
            s.fail_connects -= 1;
            s.connected = false;
            return Err(LinkError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "scripted connect failure",
            )));
        }
        s.connected = true;
        s.inbound.clear();
        let greeting = s.greeting.clone();
        s.inbound.extend(&greeting);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state.borrow().connected
    }

    fn read_until(
        &mut self,
        terminators: &[&[u8]],
        _timeout: Duration,
    ) -> Result<Vec<u8>, LinkError> {
        let mut s = self.state.borrow_mut();
        if !s.connected {
            return Err(LinkError::NotConnected);
        }
        if s.fail_reads > 0 {
            s.fail_reads -= 1;
            return Err(LinkError::Closed);
        }
        loop {
            if let Some(chunk) = s.inbound.take_through(terminators) {
                return Ok(chunk);
            }
            match s.queued.pop_front() {
                Some(next) => s.inbound.extend(&next),
                None => return Err(LinkError::Timeout),
            }
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        let mut s = self.state.borrow_mut();
        if !s.connected {
            return Err(LinkError::NotConnected);
        }
        if s.fail_writes > 0 {
            s.fail_writes -= 1;
            return Err(LinkError::Closed);
        }
        s.writes.push(bytes.to_vec());
        let reply = s.responder.as_mut().and_then(|r| r(bytes));
        if let Some(reply) = reply {
            s.inbound.extend(&reply);
        }
        Ok(())
    }

    fn clear_input(&mut self) {
        self.state.borrow_mut().inbound.clear();
    }

    fn close(&mut self) {
        let mut s = self.state.borrow_mut();
        s.connected = false;
        s.closes += 1;
    }
}

/// Rebooter that counts calls and optionally fails.
#[derive(Clone, Default)]
pub struct CountingRebooter {
    count: Rc<Cell<u32>>,
    fail: Rc<Cell<bool>>,
}

impl CountingRebooter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let r = Self::default();
        r.fail.set(true);
        r
    }

    pub fn count(&self) -> u32 {
        self.count.get()
    }
}

impl Rebooter for CountingRebooter {
    fn target(&self) -> &str {
        "scripted"
    }

    fn reboot(&mut self) -> Result<(), LinkError> {
        self.count.set(self.count.get() + 1);
        if self.fail.get() {
            return Err(LinkError::Device("scripted reboot failure".into()));
        }
        Ok(())
    }
}
