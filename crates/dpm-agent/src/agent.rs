//! # Orchestration loop
//!
//! One cooperative loop drives everything:
//!
//! ```text
//!   ┌─▶ TPI next_message ─▶ assemble ─▶ already alerted via syslog? ─▶ classify ─▶ deliver
//!   │   syslog scan ─▶ unmatched contact-id ─▶ decode ─▶ classify ─▶ deliver
//!   │   timers: TPI poll · TPI keepalive · modem check-in / inbound SMS
//!   └──────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Timers are checked once per iteration and fire on the first one. Nothing
//! here blocks except the engines' own bounded reads and settle delays.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use dpm_modem::{InboundSms, ModemEngine, SendOutcome, UnreadSms};
use dpm_tpi::TpiEngine;
use tracing::{debug, error, info, trace, warn};

use crate::alert::AlertAssembler;
use crate::budget::{Authorization, BudgetGate};
use crate::classify::{AlertLevel, Classifier, Origin};
use crate::config::{Config, PhoneRosters};
use crate::connectivity::Connectivity;
use crate::correlator::{check_syslog, scan_syslog, Windows};
use crate::inbound::{parse_request, Request};
use crate::logscan::LogScanner;
use crate::metrics::MetricsStore;

pub const ACTIVATED: &str = "Dual Path Monitoring activated";

/// Elapsed-time trigger; due immediately when never fired.
#[derive(Debug, Clone, Copy)]
struct Timer {
    every: Duration,
    last: Option<DateTime<Utc>>,
}

impl Timer {
    fn new(every: Duration) -> Self {
        Self { every, last: None }
    }

    fn fire(&mut self, now: DateTime<Utc>) -> bool {
        let due = match self.last {
            None => true,
            // a clock stepped backwards counts as due
            Some(last) => (now - last).to_std().map_or(true, |elapsed| elapsed >= self.every),
        };
        if due {
            self.last = Some(now);
        }
        due
    }
}

fn local(now: DateTime<Utc>) -> NaiveDateTime {
    now.with_timezone(&Local).naive_local()
}

pub struct Agent {
    tpi: TpiEngine,
    modem: ModemEngine,
    scanner: Option<LogScanner>,
    assembler: AlertAssembler,
    classifier: Classifier,
    probe: Box<dyn Connectivity>,
    gate: BudgetGate,
    phones: PhoneRosters,
    metrics: Box<dyn MetricsStore>,
    windows: Windows,
    inbound_sms: bool,
    poll: Timer,
    keepalive: Timer,
    modem_check: Timer,
}

impl Agent {
    /// Wire the engines and collaborators together. `scanner` is `None`
    /// when syslog scanning is off.
    pub fn new(
        config: &Config,
        tpi: TpiEngine,
        modem: ModemEngine,
        scanner: Option<LogScanner>,
        probe: Box<dyn Connectivity>,
        metrics: Box<dyn MetricsStore>,
    ) -> Self {
        let panel = &config.panel;
        Self {
            tpi,
            modem,
            scanner,
            assembler: AlertAssembler::new(
                panel.decoder(),
                panel.ignore_tokens.clone(),
                config.sms.max_size,
            ),
            classifier: Classifier::new(
                panel.suppress_tokens.clone(),
                panel.urgent_tokens.clone(),
                panel.important_tokens.clone(),
            ),
            probe,
            gate: BudgetGate::new(config.provider, &config.phones),
            phones: config.phones.clone(),
            metrics,
            windows: Windows {
                recent: config.syslog.recent,
                adjacent: config.syslog.adjacent,
            },
            inbound_sms: config.modem.inbound_sms,
            poll: Timer::new(config.tpi.poll_interval),
            keepalive: Timer::new(config.tpi.keepalive_interval),
            modem_check: Timer::new(config.modem.check_in_interval),
        }
    }

    pub fn tpi(&self) -> &TpiEngine {
        &self.tpi
    }

    pub fn modem(&self) -> &ModemEngine {
        &self.modem
    }

    pub fn scanner(&self) -> Option<&LogScanner> {
        self.scanner.as_ref()
    }

    pub fn metrics(&self) -> &dyn MetricsStore {
        self.metrics.as_ref()
    }

    /// Announce that monitoring is up, to the reboot roster.
    pub fn activate(&mut self) -> usize {
        info!("{ACTIVATED}");
        self.deliver(ACTIVATED, AlertLevel::Reboot, Utc::now())
    }

    /// Loop until `stop` is set.
    pub fn run(&mut self, stop: &AtomicBool) {
        info!("monitoring loop started");
        while !stop.load(Ordering::Relaxed) {
            self.step(Utc::now());
        }
        info!("monitoring loop stopped");
    }

    /// One loop iteration at wall-clock time `now`.
    pub fn step(&mut self, now: DateTime<Utc>) {
        self.tpi.next_message();
        if let Some(alert) = self.assembler.assemble(self.tpi.history_mut()) {
            self.panel_alert(&alert, now);
        }
        if self.scanner.is_some() {
            self.syslog_alert(now);
        }
        self.run_timers(now);
    }

    fn panel_alert(&mut self, alert: &str, now: DateTime<Utc>) {
        if let Some(scanner) = self.scanner.as_mut() {
            let contact_ids = &self.tpi.history().contact_ids;
            if check_syslog(scanner, contact_ids, &self.windows, now, true) {
                info!(alert, "already alerted from syslog");
                return;
            }
        }
        info!(alert, "panel alert");
        if let Some(level) = self
            .classifier
            .evaluate(alert, Origin::Panel, self.probe.as_mut())
        {
            self.deliver(alert, level, now);
        }
    }

    fn syslog_alert(&mut self, now: DateTime<Utc>) {
        let Some(scanner) = self.scanner.as_mut() else {
            return;
        };
        if let Err(e) = scanner.scan(now) {
            warn!(error = %e, "syslog scan failed");
        }
        let Some(code) = scan_syslog(scanner, &self.tpi.history().contact_ids, &self.windows, now)
        else {
            return;
        };
        let text = self.assembler.decoder().decode(&code);
        info!(%code, alert = %text, "syslog alert");
        if let Some(level) = self
            .classifier
            .evaluate(&text, Origin::Syslog, self.probe.as_mut())
        {
            self.deliver(&text, level, now);
        }
    }

    fn run_timers(&mut self, now: DateTime<Utc>) {
        if self.poll.fire(now) {
            debug!("polling TPI");
            self.tpi.poll();
        }
        if self.keepalive.fire(now) {
            trace!("TPI keepalive");
            self.tpi.keep_alive();
        }
        if self.modem_check.fire(now) {
            if self.inbound_sms {
                self.process_inbound(now);
            } else {
                self.modem.stay_awake();
            }
        }
    }

    // ─── Delivery ───────────────────────────────────────────────────────

    fn count_sms(&mut self, count: u64, now: DateTime<Utc>) {
        if let Err(e) = self.metrics.record_sms(count, local(now)) {
            error!(error = %e, count, "could not record SMS usage");
        }
    }

    fn send_counted(&mut self, text: &str, recipient: &str, now: DateTime<Utc>) -> bool {
        match self.modem.send_sms(text, recipient) {
            SendOutcome::Sent => {
                self.count_sms(1, now);
                true
            }
            SendOutcome::Duplicate => {
                debug!(%recipient, "duplicate not sent");
                false
            }
            SendOutcome::Disabled => false,
            SendOutcome::Failed => {
                warn!(%recipient, "SMS not sent");
                false
            }
        }
    }

    /// Send `text` to the roster for `level` if the budget allows it.
    /// Returns how many messages went out.
    pub fn deliver(&mut self, text: &str, level: AlertLevel, now: DateTime<Utc>) -> usize {
        let auth = match self.gate.authorize(self.metrics.as_mut(), local(now)) {
            Ok(auth) => auth,
            Err(e) => {
                error!(error = %e, "SMS budget unavailable");
                Authorization::NONE
            }
        };
        if !auth.allows(level) {
            info!(%level, "SMS budget does not allow this alert");
            return 0;
        }

        let phones = self.phones.for_level(level).to_vec();
        if phones.is_empty() {
            warn!(%level, "no phones configured for alert level");
        }
        let mut sent = 0;
        for phone in &phones {
            info!(%level, recipient = %phone, text, "sending alert");
            if self.send_counted(text, phone, now) {
                sent += 1;
            }
        }
        sent
    }

    // ─── Inbound SMS ────────────────────────────────────────────────────

    /// Read unread SMS and act on requests from the inbound roster.
    pub fn process_inbound(&mut self, now: DateTime<Utc>) {
        let messages = match self.modem.unread_sms() {
            UnreadSms::Messages(messages) => messages,
            UnreadSms::Empty => {
                trace!("no unread SMS");
                return;
            }
            UnreadSms::Malformed | UnreadSms::Failed => return,
        };
        debug!(count = messages.len(), "inbound SMS");
        self.count_sms(messages.len() as u64, now);
        for sms in &messages {
            self.handle_request(sms, now);
        }
    }

    fn handle_request(&mut self, sms: &InboundSms, now: DateTime<Utc>) {
        let Some(phone) = self.phones.inbound_sender(&sms.sender).map(str::to_string) else {
            warn!(sender = %sms.sender, "SMS request from unknown number ignored");
            return;
        };
        match parse_request(&sms.body) {
            Request::Status => {
                debug!(%phone, "status request");
                match self.tpi.current_status() {
                    Some(status) => {
                        let reply = status.replace(',', ", ");
                        self.send_counted(&reply, &phone, now);
                    }
                    None => warn!(%phone, "no keypad status to reply with"),
                }
            }
            Request::Arm { partition, mode } => self.tpi.arm(&phone, partition, mode),
            Request::Invalid => warn!(%phone, body = %sms.body, "invalid SMS request"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn timer_fires_first_then_on_interval() {
        let mut t = Timer::new(Duration::from_secs(60));
        assert!(t.fire(at(0)));
        assert!(!t.fire(at(30)));
        assert!(!t.fire(at(59)));
        assert!(t.fire(at(60)));
        assert!(!t.fire(at(61)));
    }

    #[test]
    fn timer_fires_when_clock_steps_back() {
        let mut t = Timer::new(Duration::from_secs(60));
        assert!(t.fire(at(100)));
        assert!(t.fire(at(10)));
        assert!(!t.fire(at(20)));
    }
}
