//! # Contact-ID Decoder
//!
//! Turns a 10-digit Contact-ID code into a short English sentence.
//!
//! ```text
//!   1 373 01 001 0
//!   │  │   │   │  └─ check digit (ignored)
//!   │  │   │   └──── agent: user number or zone number
//!   │  │   └──────── partition
//!   │  └──────────── event code
//!   └─────────────── qualifier: 1 new / 3 restore / 6 repeat
//! ```
//!
//! Decoding is total: unknown codes and unknown agents produce fixed
//! fallback text rather than an error.

pub mod events;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use tracing::{error, warn};

pub use events::{lookup, AgentKind, Category, EventSpec, QualifierSet};

/// How much detail a decoded code carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Category, qualifier, event and agent.
    Verbose,
    /// Qualifier, event and agent.
    #[default]
    Normal,
    /// Event and agent only.
    Terse,
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verbose" => Ok(Verbosity::Verbose),
            "normal" => Ok(Verbosity::Normal),
            "terse" => Ok(Verbosity::Terse),
            other => Err(format!("unknown verbosity '{other}'")),
        }
    }
}

/// A syntactically valid code split into its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactId {
    pub qualifier: char,
    pub event: u16,
    pub partition: String,
    pub agent: String,
}

impl ContactId {
    /// Requires at least the first nine characters to be ASCII digits; the
    /// trailing check digit is not validated.
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim();
        let head = code.get(..9)?;
        if !head.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self {
            qualifier: head.chars().next()?,
            event: head[1..4].parse().ok()?,
            partition: head[4..6].to_string(),
            agent: head[6..9].to_string(),
        })
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:03}{}{}",
            self.qualifier, self.event, self.partition, self.agent
        )
    }
}

pub const UNDECODABLE: &str = "Unable to decode CID";

fn default_zones() -> BTreeMap<String, String> {
    (1..=16)
        .map(|n| (format!("{n:03}"), format!("zone-{n}")))
        .collect()
}

fn default_users() -> BTreeMap<String, String> {
    let mut users: BTreeMap<String, String> = (3..=12)
        .map(|n| (format!("{n:03}"), format!("user-{n}")))
        .collect();
    users.insert("001".into(), "Installer".into());
    users.insert("002".into(), "Master".into());
    users
}

/// Decoder bound to a verbosity and the site's user/zone name tables.
#[derive(Debug, Clone)]
pub struct CidDecoder {
    verbosity: Verbosity,
    users: BTreeMap<String, String>,
    zones: BTreeMap<String, String>,
}

impl Default for CidDecoder {
    fn default() -> Self {
        Self::new(Verbosity::default())
    }
}

impl CidDecoder {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            users: default_users(),
            zones: default_zones(),
        }
    }

    /// Replace the user table. An empty table keeps the defaults.
    pub fn with_users(mut self, users: BTreeMap<String, String>) -> Self {
        if users.is_empty() {
            warn!("empty user table ignored, keeping defaults");
        } else {
            self.users = users;
        }
        self
    }

    /// Replace the zone table. An empty table keeps the defaults.
    pub fn with_zones(mut self, zones: BTreeMap<String, String>) -> Self {
        if zones.is_empty() {
            warn!("empty zone table ignored, keeping defaults");
        } else {
            self.zones = zones;
        }
        self
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn decode(&self, code: &str) -> String {
        let Some(cid) = ContactId::parse(code) else {
            error!(code, "malformed contact-id code");
            return UNDECODABLE.to_string();
        };

        let Some(spec) = lookup(cid.event) else {
            error!(event = cid.event, "no description for contact-id event code");
            return format!(
                "No description available for CID event code {:03}",
                cid.event
            );
        };

        let agent = self.agent_text(spec.agent, &cid.agent);

        let reply = match self.verbosity {
            Verbosity::Terse => format!(
                "Partition:{}, {}, {}",
                cid.partition, spec.description, agent
            ),
            Verbosity::Normal | Verbosity::Verbose => {
                let Some(qualifier) = spec.qualifiers.describe(cid.qualifier) else {
                    error!(qualifier = %cid.qualifier, "unknown contact-id qualifier");
                    return UNDECODABLE.to_string();
                };
                if self.verbosity == Verbosity::Verbose {
                    format!(
                        "Partition:{}, {}, {}:{:03} {}, {}",
                        cid.partition,
                        spec.category.label(),
                        qualifier,
                        cid.event,
                        spec.description,
                        agent
                    )
                } else {
                    format!(
                        "Partition:{}, {}:{:03} {}, {}",
                        cid.partition, qualifier, cid.event, spec.description, agent
                    )
                }
            }
        };

        // '!' separates the keypad fragment from the decoded fragment downstream.
        reply.replace('!', "")
    }

    fn agent_text(&self, kind: AgentKind, id: &str) -> String {
        let named = match kind {
            AgentKind::User => self.users.get(id).map(|n| format!("User:{n}")),
            AgentKind::Zone => self.zones.get(id).map(|n| format!("Zone:{n}")),
            AgentKind::Id => Some(format!("ID:{id}")),
            AgentKind::Custom => Some("User: ???".to_string()),
        };
        named.unwrap_or_else(|| {
            error!(agent = id, "no description for user/zone/agent");
            "Unknown user/zone/agent".to_string()
        })
    }
}
