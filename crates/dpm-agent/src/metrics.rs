//! # Persisted metrics
//!
//! SMS usage for the current billing cycle and the count of host reboots
//! attempted during startup triage. The file is rewritten after every
//! change; a single running agent is assumed, nothing locks it.
//!
//! ```toml
//! [sms]
//! count = 12
//! latest = "2024-07-03 18:22:10"   # or "unknown" after a renewal reset
//!
//! [host]
//! reboots = 0
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const UNKNOWN_DATE: &str = "unknown";

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("metrics file {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid metrics file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot encode metrics: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("invalid latest-sent date {0:?}")]
    Date(String),
}

/// Usage in the current billing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SmsUsage {
    /// Outbound and inbound messages together.
    pub count: u64,
    pub latest: Option<NaiveDateTime>,
}

pub trait MetricsStore {
    fn sms(&self) -> SmsUsage;
    /// Add `count` messages and move the latest-sent date to `at`.
    fn record_sms(&mut self, count: u64, at: NaiveDateTime) -> Result<(), MetricsError>;
    /// Start a new cycle: zero messages, latest date unknown.
    fn reset_sms(&mut self) -> Result<(), MetricsError>;
    fn host_reboots(&self) -> u32;
    /// Count one more host reboot attempt; returns the new total.
    fn record_host_reboot(&mut self) -> Result<u32, MetricsError>;
    fn reset_host_reboots(&mut self) -> Result<(), MetricsError>;
}

/// Non-persistent store, for tests and dry runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryMetrics {
    pub usage: SmsUsage,
    pub reboots: u32,
}

impl MetricsStore for MemoryMetrics {
    fn sms(&self) -> SmsUsage {
        self.usage
    }

    fn record_sms(&mut self, count: u64, at: NaiveDateTime) -> Result<(), MetricsError> {
        self.usage.count += count;
        self.usage.latest = Some(at);
        Ok(())
    }

    fn reset_sms(&mut self) -> Result<(), MetricsError> {
        self.usage = SmsUsage::default();
        Ok(())
    }

    fn host_reboots(&self) -> u32 {
        self.reboots
    }

    fn record_host_reboot(&mut self) -> Result<u32, MetricsError> {
        self.reboots += 1;
        Ok(self.reboots)
    }

    fn reset_host_reboots(&mut self) -> Result<(), MetricsError> {
        self.reboots = 0;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct MetricsFile {
    sms: SmsSection,
    host: HostSection,
}

impl Default for MetricsFile {
    fn default() -> Self {
        Self {
            sms: SmsSection {
                count: 0,
                latest: UNKNOWN_DATE.into(),
            },
            host: HostSection { reboots: 0 },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SmsSection {
    count: u64,
    latest: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HostSection {
    reboots: u32,
}

/// TOML-backed store, replaced atomically on every update.
#[derive(Debug)]
pub struct FileMetrics {
    path: PathBuf,
    usage: SmsUsage,
    reboots: u32,
}

fn parse_date(text: &str) -> Result<Option<NaiveDateTime>, MetricsError> {
    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case(UNKNOWN_DATE) {
        return Ok(None);
    }
    NaiveDateTime::parse_from_str(text, DATE_FORMAT)
        .map(Some)
        .map_err(|_| MetricsError::Date(text.to_string()))
}

impl FileMetrics {
    /// Load the store; a missing file starts a fresh one.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, MetricsError> {
        let path = path.into();
        let file = match fs::read_to_string(&path) {
            Ok(text) => toml::from_str::<MetricsFile>(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no metrics file yet, starting fresh");
                MetricsFile::default()
            }
            Err(source) => return Err(MetricsError::Io { path, source }),
        };
        let usage = SmsUsage {
            count: file.sms.count,
            latest: parse_date(&file.sms.latest)?,
        };
        Ok(Self {
            path,
            usage,
            reboots: file.host.reboots,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), MetricsError> {
        let file = MetricsFile {
            sms: SmsSection {
                count: self.usage.count,
                latest: self
                    .usage
                    .latest
                    .map(|d| d.format(DATE_FORMAT).to_string())
                    .unwrap_or_else(|| UNKNOWN_DATE.to_string()),
            },
            host: HostSection {
                reboots: self.reboots,
            },
        };
        let text = toml::to_string(&file)?;
        let io_err = |source| MetricsError::Io {
            path: self.path.clone(),
            source,
        };
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        fs::write(&tmp, text).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        debug!(path = %self.path.display(), count = self.usage.count, reboots = self.reboots, "metrics saved");
        Ok(())
    }
}

impl MetricsStore for FileMetrics {
    fn sms(&self) -> SmsUsage {
        self.usage
    }

    fn record_sms(&mut self, count: u64, at: NaiveDateTime) -> Result<(), MetricsError> {
        self.usage.count += count;
        self.usage.latest = Some(at);
        self.persist()
    }

    fn reset_sms(&mut self) -> Result<(), MetricsError> {
        self.usage = SmsUsage::default();
        self.persist()
    }

    fn host_reboots(&self) -> u32 {
        self.reboots
    }

    fn record_host_reboot(&mut self) -> Result<u32, MetricsError> {
        self.reboots += 1;
        self.persist()?;
        Ok(self.reboots)
    }

    fn reset_host_reboots(&mut self) -> Result<(), MetricsError> {
        self.reboots = 0;
        self.persist()
    }
}
