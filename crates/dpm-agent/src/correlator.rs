//! # Correlator
//!
//! The panel reports each alarm event twice: once over TPI and once through
//! syslog, in either order and seconds apart. The correlator pairs the two
//! reports so every physical event is alerted exactly once.
//!
//! ```text
//!   TPI   ──%03,1131010030$──────────────▶ contact-id history ─┐
//!                                                              ├─ same code,
//!   syslog ─"CID Event: 1131010030"──────▶ scanner window ─────┘  |Δt| ≤ adjacent
//! ```
//!
//! A syslog entry that finds its TPI twin is marked reported and never
//! alerted on its own. One that does not is alerted from the syslog side,
//! oldest first, and marked reported so it cannot be alerted twice.

use std::time::Duration;

use chrono::{DateTime, Utc};
use dpm_tpi::frame::contact_id_code;
use dpm_tpi::history::FrameHistory;
use tracing::debug;

use crate::logscan::{LogEvent, LogScanner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Windows {
    /// Maximum age of a syslog entry still worth alerting on.
    pub recent: Duration,
    /// Maximum gap between the two reports of one event.
    pub adjacent: Duration,
}

impl Windows {
    fn recent(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.recent).unwrap_or(chrono::Duration::MAX)
    }

    fn adjacent(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.adjacent).unwrap_or(chrono::Duration::MAX)
    }
}

fn adjacent(a: DateTime<Utc>, b: DateTime<Utc>, windows: &Windows) -> bool {
    (a - b).abs() <= windows.adjacent()
}

/// Find a TPI report of `event` within the adjacency window.
fn has_twin(event: &LogEvent, contact_ids: &FrameHistory, windows: &Windows) -> bool {
    contact_ids.newest_first().any(|(at, tracked)| {
        contact_id_code(&tracked.value.text) == event.code && adjacent(*at, event.at, windows)
    })
}

/// Syslog events TPI has not reported. Twins are marked reported and
/// dropped; of the rest the oldest is marked reported and its code
/// returned.
pub fn scan_syslog(
    scanner: &mut LogScanner,
    contact_ids: &FrameHistory,
    windows: &Windows,
    now: DateTime<Utc>,
) -> Option<String> {
    let mut unmatched = Vec::new();
    for event in scanner.unreported_within(windows.recent(), now) {
        if has_twin(&event, contact_ids, windows) {
            debug!(code = %event.code, "syslog and TPI agree on contact-id event");
            scanner.flag_reported(&event.at);
        } else {
            unmatched.push(event);
        }
    }

    // oldest first, preserving real-world order
    let first = unmatched.into_iter().next()?;
    debug!(code = %first.code, "syslog caught contact-id event before TPI");
    scanner.flag_reported(&first.at);
    Some(first.code)
}

/// Whether the newest TPI contact-id matches a recent syslog entry in the
/// given reported state. When looking at unreported entries the match is
/// marked reported.
pub fn check_syslog(
    scanner: &mut LogScanner,
    contact_ids: &FrameHistory,
    windows: &Windows,
    now: DateTime<Utc>,
    reported: bool,
) -> bool {
    let Some((tpi_at, tracked)) = contact_ids.latest() else {
        return false;
    };
    let code = contact_id_code(&tracked.value.text);
    let matched = scanner
        .recent(windows.recent(), reported, now)
        .into_iter()
        .find(|event| event.code == code && adjacent(*tpi_at, event.at, windows));

    match matched {
        Some(event) => {
            debug!(code, reported, "TPI and syslog agree on contact-id event");
            if !reported {
                scanner.flag_reported(&event.at);
            }
            true
        }
        None => false,
    }
}
