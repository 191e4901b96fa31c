//! # Modem Engine
//!
//! ```text
//!   Uninitialized ──▶ Provisioning ──▶ Ready ◀──────────┐
//!                          ▲             │ I/O failure   │ port reopened
//!                          │             ▼               │
//!                          └── Rebooting ◀── Reconnecting┘
//!                                 (retries exhausted)
//! ```
//!
//! Sent messages are kept in a 16-entry history. The same history answers
//! the duplicate check, which only looks at entries inside the duplicate
//! window; the two limits are independent.

use std::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use dpm_common::{settle, Link, LinkError, Rebooter, RollingHistory};
use thiserror::Error;
use tracing::{debug, error, info, trace, warn};

use crate::at::{self, UnreadSms};

/// Sent-message history size: up to four alerts to four phones.
pub const SMS_HISTORY_CAPACITY: usize = 16;

#[derive(Debug, Error)]
pub enum ModemError {
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error("no OK from modem for {command}: {reply:?}")]
    NotOk { command: String, reply: String },
    #[error("unparsable modem reply to {command}: {reply:?}")]
    Unparsable { command: String, reply: String },
}

#[derive(Debug, Clone)]
pub struct ModemConfig {
    /// Reply timeout for ordinary commands.
    pub timeout: Duration,
    /// Reply timeout once an SMS body has been submitted.
    pub send_timeout: Duration,
    pub retries: u32,
    pub retry_delay: Duration,
    /// Wait after `AT#REBOOT` for the modem to come back.
    pub boot_wait: Duration,
    /// Pause between the stages of an SMS submission.
    pub prompt_delay: Duration,
    /// When false, sends are refused with [`SendOutcome::Disabled`].
    pub send_enabled: bool,
    pub duplicate_window: Duration,
}

impl Default for ModemConfig {
    fn default() -> Self {
        ModemConfig {
            timeout: Duration::from_secs(10),
            send_timeout: Duration::from_secs(30),
            retries: 20,
            retry_delay: Duration::from_secs(30),
            boot_wait: Duration::from_secs(60),
            prompt_delay: Duration::from_millis(500),
            send_enabled: true,
            duplicate_window: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModemState {
    Uninitialized,
    Provisioning,
    Ready,
    Reconnecting,
    Rebooting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// Same text to the same recipient inside the duplicate window.
    Duplicate,
    /// Sending is switched off in configuration.
    Disabled,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsRecord {
    pub text: String,
    pub recipient: String,
}

pub struct ModemEngine {
    config: ModemConfig,
    link: Box<dyn Link>,
    rebooter: Box<dyn Rebooter>,
    state: ModemState,
    history: RollingHistory<DateTime<Utc>, SmsRecord>,
}

impl ModemEngine {
    pub fn new(config: ModemConfig, link: Box<dyn Link>, rebooter: Box<dyn Rebooter>) -> Self {
        ModemEngine {
            config,
            link,
            rebooter,
            state: ModemState::Uninitialized,
            history: RollingHistory::new(SMS_HISTORY_CAPACITY),
        }
    }

    pub fn state(&self) -> ModemState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ModemState::Ready && self.link.is_connected()
    }

    pub fn history(&self) -> &RollingHistory<DateTime<Utc>, SmsRecord> {
        &self.history
    }

    // ─── Bring-up ───────────────────────────────────────────────────────

    /// Open the port and provision, retrying up to the configured count.
    pub fn start(&mut self) -> bool {
        for attempt in 1..=self.config.retries {
            match self.provision() {
                Ok(()) => {
                    info!(attempt, "modem provisioned");
                    return true;
                }
                Err(e) => {
                    error!(attempt, error = %e, "modem issue, will retry");
                    settle(self.config.retry_delay);
                }
            }
        }
        false
    }

    /// Open the port without provisioning, relying on the saved profile.
    /// Enough for reading the network clock at boot.
    pub fn start_fast(&mut self) -> bool {
        for attempt in 1..=self.config.retries {
            match self.link.connect() {
                Ok(()) => {
                    self.state = ModemState::Ready;
                    return true;
                }
                Err(e) => {
                    error!(attempt, error = %e, "modem issue, will retry");
                    settle(self.config.retry_delay);
                }
            }
        }
        false
    }

    fn provision(&mut self) -> Result<(), ModemError> {
        self.state = ModemState::Provisioning;
        let result = self.run_provisioning();
        match &result {
            Ok(()) => self.state = ModemState::Ready,
            Err(_) => {
                self.link.close();
                self.state = ModemState::Uninitialized;
            }
        }
        result
    }

    fn run_provisioning(&mut self) -> Result<(), ModemError> {
        self.link.connect()?;
        for command in at::PROVISIONING {
            self.command(command)?;
        }
        Ok(())
    }

    // ─── Recovery ───────────────────────────────────────────────────────

    /// Reopen the port; the saved profile makes provisioning unnecessary.
    /// Reboots the modem when retries are exhausted.
    pub fn reconnect(&mut self) {
        self.state = ModemState::Reconnecting;
        self.link.close();
        debug!("reconnecting modem");
        for attempt in 1..=self.config.retries {
            match self.link.connect() {
                Ok(()) => {
                    info!(attempt, "modem connection re-established");
                    self.state = ModemState::Ready;
                    return;
                }
                Err(e) => {
                    debug!(attempt, error = %e, "could not reopen modem, will retry");
                    settle(self.config.retry_delay);
                }
            }
        }
        warn!(retries = self.config.retries, "modem reconnect retries exhausted");
        self.reboot();
    }

    /// Reboot through the secondary device, wait for boot, then provision.
    pub fn reboot(&mut self) {
        self.state = ModemState::Rebooting;
        self.link.close();
        match self.rebooter.reboot() {
            Ok(()) => info!(device = self.rebooter.target(), "modem reboot issued"),
            Err(e) => error!(device = self.rebooter.target(), error = %e, "failed to reboot modem"),
        }
        settle(self.config.boot_wait);
        if let Err(e) = self.provision() {
            error!(error = %e, "modem not usable after reboot");
        }
    }

    // ─── Commands ───────────────────────────────────────────────────────

    fn command(&mut self, command: &str) -> Result<String, ModemError> {
        self.exchange(command, self.config.timeout)
    }

    fn exchange(&mut self, command: &str, timeout: Duration) -> Result<String, ModemError> {
        self.link.clear_input();
        self.link.write(format!("{command}\r").as_bytes())?;
        let reply = self.link.read_until(at::TERMINATORS, timeout)?;
        let reply = String::from_utf8_lossy(&reply).into_owned();
        if at::is_ok(&reply) {
            debug!(command, "modem replied OK");
            Ok(reply)
        } else {
            Err(ModemError::NotOk {
                command: command.to_string(),
                reply,
            })
        }
    }

    /// `AT`; a missing OK triggers reconnect escalation.
    pub fn stay_awake(&mut self) {
        if let Err(e) = self.command(at::ATTENTION) {
            error!(error = %e, "modem did not answer stay-awake");
            self.reconnect();
        }
    }

    /// Network time from `AT+CCLK?`. Not retried.
    pub fn network_time(&mut self) -> Result<NaiveDateTime, ModemError> {
        let reply = self.command(at::CLOCK)?;
        at::parse_clock(&reply).ok_or_else(|| ModemError::Unparsable {
            command: at::CLOCK.to_string(),
            reply,
        })
    }

    pub fn unread_sms(&mut self) -> UnreadSms {
        match self.command(at::LIST_UNREAD) {
            Ok(reply) => {
                trace!(reply = %reply, "unread listing");
                let unread = at::parse_unread(&reply);
                if unread == UnreadSms::Malformed {
                    warn!(reply = %reply, "could not parse unread SMS listing");
                }
                unread
            }
            Err(e) => {
                error!(error = %e, "could not list unread SMS");
                self.reconnect();
                UnreadSms::Failed
            }
        }
    }

    // ─── Sending ────────────────────────────────────────────────────────

    fn is_duplicate(&self, text: &str, recipient: &str, now: DateTime<Utc>) -> bool {
        let window = chrono::Duration::from_std(self.config.duplicate_window)
            .unwrap_or(chrono::Duration::MAX);
        self.history.newest_first().any(|(sent, rec)| {
            rec.text == text && rec.recipient == recipient && (now - *sent).abs() <= window
        })
    }

    fn record(&mut self, now: DateTime<Utc>, text: &str, recipient: &str) {
        let key = match self.history.latest() {
            Some((last, _)) if now <= *last => *last + chrono::Duration::nanoseconds(1),
            _ => now,
        };
        self.history.insert(
            key,
            SmsRecord {
                text: text.to_string(),
                recipient: recipient.to_string(),
            },
        );
    }

    fn transmit(&mut self, text: &str, recipient: &str) -> Result<(), ModemError> {
        self.link.clear_input();
        self.link
            .write(format!("{}\r", at::send_sms_header(recipient)).as_bytes())?;
        settle(self.config.prompt_delay);
        let body = format!("{} {}", Local::now().format("%Y-%m-%d %H:%M:%S"), text);
        self.link.write(body.as_bytes())?;
        settle(self.config.prompt_delay);
        self.link.write(&[at::CTRL_Z])?;
        let reply = self
            .link
            .read_until(at::TERMINATORS, self.config.send_timeout)?;
        let reply = String::from_utf8_lossy(&reply).into_owned();
        if at::is_ok(&reply) {
            Ok(())
        } else {
            Err(ModemError::NotOk {
                command: "AT+CMGS".into(),
                reply,
            })
        }
    }

    /// Send one SMS. The body goes out prefixed with the local time.
    pub fn send_sms(&mut self, text: &str, recipient: &str) -> SendOutcome {
        let now = Utc::now();
        if self.is_duplicate(text, recipient, now) {
            // recorded anyway so the entry ages like any other
            self.record(now, text, recipient);
            warn!(%recipient, "duplicate SMS suppressed");
            return SendOutcome::Duplicate;
        }
        if !self.config.send_enabled {
            info!(%recipient, text, "SMS sending disabled, not sent");
            return SendOutcome::Disabled;
        }

        match self.transmit(text, recipient) {
            Ok(()) => {}
            Err(e) => {
                error!(%recipient, error = %e, "modem issue while sending SMS");
                self.reconnect();
                if let Err(e) = self.transmit(text, recipient) {
                    error!(%recipient, error = %e, "SMS send failed after reconnect");
                    return SendOutcome::Failed;
                }
            }
        }
        info!(%recipient, text, "SMS sent");
        self.record(now, text, recipient);
        SendOutcome::Sent
    }
}
