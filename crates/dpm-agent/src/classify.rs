//! # Alert classifier
//!
//! Token matching decides whether a message is worth an SMS:
//!
//! | check      | looks at                          | on a hit            |
//! |------------|-----------------------------------|---------------------|
//! | suppress   | decoded Contact ID, any case      | no alert at all     |
//! | urgent     | keypad text                       | Red                 |
//! | important  | keypad text                       | Yellow, if offline  |
//!
//! Yellow alerts only go out when the internet is down; otherwise the
//! panel's own app is assumed to be watching.

use tracing::{debug, info};

use crate::alert::SEPARATOR;
use crate::connectivity::Connectivity;

/// Roster an alert is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertLevel {
    Red,
    Yellow,
    /// Agent (re)activation notice.
    Reboot,
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AlertLevel::Red => "red",
            AlertLevel::Yellow => "yellow",
            AlertLevel::Reboot => "reboot",
        })
    }
}

/// Where a message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Keypad text plus decoded code from TPI; tokens match as written.
    Panel,
    /// Decoded syslog code alone; tokens match in any case.
    Syslog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Suppressed,
    Red,
    Yellow,
    Quiet,
}

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    suppress: Vec<String>,
    urgent: Vec<String>,
    important: Vec<String>,
}

fn first_hit<'a>(text: &str, tokens: &'a [String], fold: bool) -> Option<&'a str> {
    tokens
        .iter()
        .find(|t| {
            if fold {
                text.contains(&t.to_lowercase())
            } else {
                text.contains(t.as_str())
            }
        })
        .map(String::as_str)
}

impl Classifier {
    pub fn new(suppress: Vec<String>, urgent: Vec<String>, important: Vec<String>) -> Self {
        Self {
            suppress,
            urgent,
            important,
        }
    }

    /// Token checks only, no connectivity gating.
    pub fn classify(&self, text: &str, origin: Origin) -> Verdict {
        let lower = text.to_lowercase();
        let (keypad, code) = match lower.split_once(SEPARATOR.trim()) {
            Some((keypad, code)) => (keypad, code),
            None => (lower.as_str(), lower.as_str()),
        };
        if let Some(token) = first_hit(code, &self.suppress, true) {
            info!(token, "non-alert token found, suppressed");
            return Verdict::Suppressed;
        }

        let (keypad, fold) = match origin {
            Origin::Syslog => (keypad, true),
            Origin::Panel => (text.split_once(SEPARATOR.trim()).map_or(text, |(k, _)| k), false),
        };
        if let Some(token) = first_hit(keypad, &self.urgent, fold) {
            info!(token, "red alert token found");
            return Verdict::Red;
        }
        if let Some(token) = first_hit(keypad, &self.important, fold) {
            info!(token, "yellow alert token found");
            return Verdict::Yellow;
        }
        Verdict::Quiet
    }

    /// The roster to alert, if any. Yellow is dropped while `probe` reports
    /// the internet up.
    pub fn evaluate(
        &self,
        text: &str,
        origin: Origin,
        probe: &mut dyn Connectivity,
    ) -> Option<AlertLevel> {
        match self.classify(text, origin) {
            Verdict::Red => Some(AlertLevel::Red),
            Verdict::Yellow => {
                if probe.is_online() {
                    debug!("internet up, yellow alert left to the panel app");
                    None
                } else {
                    debug!("internet down, yellow alert goes by SMS");
                    Some(AlertLevel::Yellow)
                }
            }
            Verdict::Suppressed | Verdict::Quiet => None,
        }
    }
}
