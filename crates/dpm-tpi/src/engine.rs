//! # TPI Session Engine
//!
//! ```text
//!   Disconnected ──connect──▶ Authenticating ──"OK"──▶ Connected
//!        ▲                          │                      │
//!        └──── retries exhausted ◀──┴──── I/O failure ◀────┘
//!                    │
//!                    ▼
//!        reboot module, settle, one more login
//! ```
//!
//! Callers never see link errors. Every read and write recovers internally
//! and the caller works from whatever the history holds afterwards.

use std::time::Duration;

use chrono::Utc;
use dpm_common::{settle, Link, LinkError, Rebooter, Tracked};
use tracing::{debug, error, info, trace, warn};

use crate::arm::{arm_keystrokes, ArmMode};
use crate::frame::{classify, Command, Frame};
use crate::history::{Decoded, TpiHistory};

/// Session parameters for the interface module.
#[derive(Debug, Clone)]
pub struct TpiConfig {
    pub password: String,
    /// Read timeout for frames and the login exchange.
    pub timeout: Duration,
    /// Connection attempts before escalating to a reboot.
    pub retries: u32,
    pub retry_delay: Duration,
    /// Wait after a reboot before logging in again.
    pub reboot_settle: Duration,
    /// Gap between the two samples of [`TpiEngine::current_status`]; the
    /// module refreshes keypad status about every 10 s.
    pub status_settle: Duration,
    pub status_attempts: u32,
}

impl Default for TpiConfig {
    fn default() -> Self {
        TpiConfig {
            password: String::new(),
            timeout: Duration::from_secs(10),
            retries: 20,
            retry_delay: Duration::from_secs(20),
            reboot_settle: Duration::from_secs(20),
            status_settle: Duration::from_secs(10),
            status_attempts: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Authenticating,
    Connected,
}

pub struct TpiEngine {
    config: TpiConfig,
    link: Box<dyn Link>,
    rebooter: Box<dyn Rebooter>,
    state: SessionState,
    history: TpiHistory,
}

impl TpiEngine {
    /// Build the engine without touching the network; call [`connect`]
    /// (initial login) before reading.
    ///
    /// [`connect`]: TpiEngine::connect
    pub fn new(config: TpiConfig, link: Box<dyn Link>, rebooter: Box<dyn Rebooter>) -> Self {
        TpiEngine {
            config,
            link,
            rebooter,
            state: SessionState::Disconnected,
            history: TpiHistory::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected && self.link.is_connected()
    }

    pub fn history(&self) -> &TpiHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut TpiHistory {
        &mut self.history
    }

    // ─── Session ────────────────────────────────────────────────────────

    /// Log in, retrying up to the configured count. Does not reboot.
    pub fn connect(&mut self) -> bool {
        for attempt in 1..=self.config.retries {
            match self.authenticate() {
                Ok(()) => {
                    info!(attempt, "TPI session established");
                    return true;
                }
                Err(e) => {
                    error!(attempt, error = %e, "could not connect to TPI, will retry");
                    settle(self.config.retry_delay);
                }
            }
        }
        false
    }

    fn authenticate(&mut self) -> Result<(), LinkError> {
        self.state = SessionState::Authenticating;
        let result = self.login();
        match &result {
            Ok(()) => self.state = SessionState::Connected,
            Err(_) => self.drop_link(),
        }
        result
    }

    fn login(&mut self) -> Result<(), LinkError> {
        self.link.connect()?;
        self.link.read_until(&[b"Login:"], self.config.timeout)?;
        let mut credentials = self.config.password.clone().into_bytes();
        credentials.push(b'\n');
        self.link.write(&credentials)?;
        let reply = self
            .link
            .read_until(&[b"OK", b"FAILED"], self.config.timeout)?;
        let reply = String::from_utf8_lossy(&reply);
        debug!(reply = %reply.trim(), "TPI login reply");
        if reply.trim().ends_with("OK") {
            Ok(())
        } else {
            Err(LinkError::Rejected("TPI login failed".into()))
        }
    }

    fn drop_link(&mut self) {
        self.link.close();
        self.state = SessionState::Disconnected;
    }

    /// Drop the session and log in again; reboot the module once retries
    /// are exhausted.
    pub fn reconnect(&mut self) {
        self.drop_link();
        if self.connect() {
            return;
        }
        warn!(retries = self.config.retries, "TPI reconnect retries exhausted");
        self.reboot();
        match self.authenticate() {
            Ok(()) => info!("TPI session re-established after reboot"),
            Err(e) => error!(error = %e, "TPI still unreachable after reboot"),
        }
    }

    /// Hardware reboot of the interface module, then the settle delay.
    pub fn reboot(&mut self) {
        self.drop_link();
        match self.rebooter.reboot() {
            Ok(()) => info!(device = self.rebooter.target(), "interface module reboot requested"),
            Err(e) => error!(device = self.rebooter.target(), error = %e, "interface module reboot failed"),
        }
        settle(self.config.reboot_settle);
    }

    // ─── Inbound ────────────────────────────────────────────────────────

    /// Read and file one frame. A read timeout is an empty frame.
    pub fn next_message(&mut self) -> &TpiHistory {
        match self.link.read_until(&[b"$"], self.config.timeout) {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes).into_owned();
                self.ingest(&text);
            }
            Err(LinkError::Timeout) => trace!("no TPI frame before timeout"),
            Err(e) => {
                error!(error = %e, "error reading TPI");
                self.reconnect();
            }
        }
        &self.history
    }

    /// Classify a frame and store it. Exposed for replaying captured frames.
    pub fn ingest(&mut self, text: &str) {
        let raw = text.trim().to_string();
        trace!(frame = %raw, "TPI frame");

        let frame = match classify(&raw) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "dropping malformed TPI frame");
                return;
            }
        };

        let key = self.history.stamp(Utc::now());
        let decoded = |text: String| Tracked::pending(Decoded { raw: raw.clone(), text });

        match frame {
            Frame::Empty => {}
            Frame::ProbeAck { ok: true } => debug!("module acknowledged keepalive probe"),
            Frame::ProbeAck { ok: false } => debug!(frame = %raw, "module did not acknowledge keepalive probe"),
            Frame::Response { command, ok } => {
                if ok {
                    debug!(?command, "TPI request accepted");
                } else if command == Command::Poll {
                    debug!(frame = %raw, "module did not accept poll");
                } else {
                    warn!(?command, frame = %raw, "bad return code from TPI request");
                }
                self.history.responses.insert(key, raw.clone());
            }
            Frame::Keypad(text) => self.history.keypad.insert(key, decoded(text)),
            Frame::Zones(text) => self.history.zones.insert(key, decoded(text)),
            Frame::Partitions(text) => self.history.partitions.insert(key, decoded(text)),
            Frame::ContactId(text) => self.history.contact_ids.insert(key, decoded(text)),
            Frame::ZoneTimers(text) => self.history.zone_timers.insert(key, decoded(text)),
            Frame::Unknown => debug!(frame = %raw, "unexpected TPI message type"),
        }
    }

    // ─── Outbound ───────────────────────────────────────────────────────

    /// Write a request, reconnecting and retrying once on failure.
    fn request(&mut self, request: &str) {
        debug!(request, "submitting TPI request");
        let sent = match self.link.write(request.as_bytes()) {
            Ok(()) => true,
            Err(e) => {
                error!(request, error = %e, "error writing TPI request");
                self.reconnect();
                if self.is_connected() {
                    debug!(request, "resubmitting TPI request");
                    match self.link.write(request.as_bytes()) {
                        Ok(()) => true,
                        Err(e) => {
                            error!(request, error = %e, "TPI request failed after reconnect");
                            false
                        }
                    }
                } else {
                    false
                }
            }
        };
        if sent {
            let key = self.history.stamp(Utc::now());
            self.history.requests.insert(key, request.to_string());
        }
    }

    /// Poll; keeps the module's watchdog from rebooting it while offline.
    pub fn poll(&mut self) {
        self.request("^00,$");
    }

    /// Deliberately invalid request used as a keepalive.
    pub fn keep_alive(&mut self) {
        self.request("^09,$");
    }

    pub fn change_partition(&mut self, partition: u8) {
        self.request(&format!("^01,{partition}$"));
    }

    pub fn dump_zone_timers(&mut self) {
        self.request("^02,$");
    }

    /// Send keypad keystrokes (`0-9 * # A-D`) to a partition.
    pub fn keystrokes(&mut self, partition: u8, keys: &str) {
        self.request(&format!("^03,{partition},{keys}$"));
    }

    pub fn arm(&mut self, phone: &str, partition: u8, mode: ArmMode) {
        info!(partition, %mode, "arming partition by request");
        let keys = arm_keystrokes(phone, mode);
        self.keystrokes(partition, &keys);
    }

    // ─── Status ─────────────────────────────────────────────────────────

    /// Keypad status confirmed by two samples a settle delay apart.
    ///
    /// Gives up after the configured number of attempts and returns the last
    /// sample, which may be `None` if no keypad frame ever arrived.
    pub fn current_status(&mut self) -> Option<String> {
        let mut last = None;
        for attempt in 1..=self.config.status_attempts {
            self.next_message();
            let first = self.history.latest_keypad_text().map(str::to_string);
            settle(self.config.status_settle);
            self.next_message();
            let second = self.history.latest_keypad_text().map(str::to_string);
            debug!(attempt, ?first, ?second, "keypad status samples");
            if first.is_some() && first == second {
                return second;
            }
            last = second;
        }
        last
    }
}
