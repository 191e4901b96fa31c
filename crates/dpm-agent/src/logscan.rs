//! # Syslog scanner
//!
//! The interface module's syslog client writes lines like
//!
//! ```text
//!   Jul  3 18:22:10 192.168.1.2 ENVISALINK[00:11:22:33:44:55]: CID Event: 1131010030
//! ```
//!
//! into a file on this host. The scanner tails that file from a persisted
//! offset and keeps the two newest Contact ID events, each with a
//! reported/unreported disposition.
//!
//! Syslog lines carry no year; the current local year is assumed, so an
//! event logged on 31 December and scanned on 1 January lands a year in
//! the future. Such an entry is never "recent" and is simply not alerted.

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Local, NaiveDateTime, TimeZone, Utc};
use dpm_common::{RollingHistory, Tracked};
use regex::Regex;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Two entries, matching the contact-id history it is correlated with.
pub const SCAN_HISTORY_CAPACITY: usize = 2;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("syslog file {path}: {source}")]
    Log { path: PathBuf, source: io::Error },
    #[error("offset file {path}: {source}")]
    Offset { path: PathBuf, source: io::Error },
}

/// Where the previous scan stopped. The inode detects rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Offset {
    pub inode: u64,
    pub offset: u64,
}

/// Two-line text file: inode, then byte offset.
#[derive(Debug, Clone)]
pub struct OffsetStore {
    path: PathBuf,
}

impl OffsetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `None` when there is no usable offset file.
    pub fn load(&self) -> Option<Offset> {
        let text = fs::read_to_string(&self.path).ok()?;
        let mut lines = text.lines();
        let inode = lines.next()?.trim().parse().ok()?;
        let offset = lines.next()?.trim().parse().ok()?;
        Some(Offset { inode, offset })
    }

    pub fn save(&self, offset: Offset) -> Result<(), ScanError> {
        fs::write(&self.path, format!("{}\n{}\n", offset.inode, offset.offset)).map_err(
            |source| ScanError::Offset {
                path: self.path.clone(),
                source,
            },
        )
    }
}

#[cfg(unix)]
fn inode(meta: &fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    meta.ino()
}

#[cfg(not(unix))]
fn inode(_meta: &fs::Metadata) -> u64 {
    0
}

/// Code from a syslog line, with the line's timestamp in `year`.
pub struct LineParser {
    date: Regex,
    cid: Regex,
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineParser {
    pub fn new() -> Self {
        Self {
            date: Regex::new(r"([A-Za-z]{3})\s*([0-9]{1,2})\s*([0-9]{2}:[0-9]{2}:[0-9]{2})")
                .expect("valid date pattern"),
            cid: Regex::new(r"(?i)CID Event:\s*([0-9]{10})$").expect("valid contact-id pattern"),
        }
    }

    pub fn parse(&self, line: &str, year: i32) -> Option<(NaiveDateTime, String)> {
        let line = line.trim();
        let code = self.cid.captures(line)?.get(1)?.as_str().to_string();
        let Some(date) = self.date.captures(line) else {
            warn!(line, "contact-id line without a timestamp skipped");
            return None;
        };
        let stamp = format!("{year} {} {} {}", &date[1], &date[2], &date[3]);
        match NaiveDateTime::parse_from_str(&stamp, "%Y %b %d %H:%M:%S") {
            Ok(at) => Some((at, code)),
            Err(e) => {
                warn!(line, error = %e, "unparsable syslog timestamp");
                None
            }
        }
    }
}

/// One syslog event as seen by the correlator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub at: DateTime<Utc>,
    pub code: String,
}

pub struct LogScanner {
    log_path: PathBuf,
    offsets: OffsetStore,
    parser: LineParser,
    events: RollingHistory<DateTime<Utc>, Tracked<String>>,
}

impl LogScanner {
    pub fn new(log_path: impl Into<PathBuf>, offset_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
            offsets: OffsetStore::new(offset_path),
            parser: LineParser::new(),
            events: RollingHistory::new(SCAN_HISTORY_CAPACITY),
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn events(&self) -> &RollingHistory<DateTime<Utc>, Tracked<String>> {
        &self.events
    }

    /// Read lines appended since the last scan. Returns the number of
    /// contact-id events found. A trailing partial line is left for the
    /// next scan.
    pub fn scan(&mut self, now: DateTime<Utc>) -> Result<usize, ScanError> {
        let log_err = |source| ScanError::Log {
            path: self.log_path.clone(),
            source,
        };
        let mut file = match File::open(&self.log_path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                trace!(path = %self.log_path.display(), "syslog file not there yet");
                return Ok(0);
            }
            Err(e) => return Err(log_err(e)),
        };
        let meta = file.metadata().map_err(log_err)?;
        let ino = inode(&meta);

        let start = match self.offsets.load() {
            Some(o) if o.inode == ino && o.offset <= meta.len() => o.offset,
            Some(o) if o.inode != ino => {
                debug!(path = %self.log_path.display(), "syslog file rotated, reading from start");
                0
            }
            Some(_) => {
                debug!(path = %self.log_path.display(), "syslog file truncated, reading from start");
                0
            }
            None => 0,
        };
        if start == meta.len() {
            return Ok(0);
        }

        file.seek(SeekFrom::Start(start)).map_err(log_err)?;
        let mut appended = Vec::new();
        file.read_to_end(&mut appended).map_err(log_err)?;
        let complete = match appended.iter().rposition(|&b| b == b'\n') {
            Some(last) => last + 1,
            None => return Ok(0),
        };

        let year = now.with_timezone(&Local).year();
        let text = String::from_utf8_lossy(&appended[..complete]);
        let mut found = 0;
        for line in text.lines() {
            if let Some((at, code)) = self.parser.parse(line, year) {
                self.insert(at, code);
                found += 1;
            }
        }

        self.offsets.save(Offset {
            inode: ino,
            offset: start + complete as u64,
        })?;
        Ok(found)
    }

    fn insert(&mut self, local: NaiveDateTime, code: String) {
        let Some(at) = Local
            .from_local_datetime(&local)
            .earliest()
            .map(|t| t.with_timezone(&Utc))
        else {
            warn!(%local, "syslog time does not exist locally, skipped");
            return;
        };
        if let Some(existing) = self.events.get(&at) {
            if existing.value == code {
                return;
            }
        }
        debug!(%at, code, "syslog contact-id event");
        self.events.insert(at, Tracked::pending(code));
    }

    /// Record an event directly, as if scanned.
    pub fn push(&mut self, at: DateTime<Utc>, code: impl Into<String>) {
        self.events.insert(at, Tracked::pending(code.into()));
    }

    /// Unreported events no older than `window`, oldest first.
    pub fn unreported_within(&self, window: chrono::Duration, now: DateTime<Utc>) -> Vec<LogEvent> {
        self.events
            .oldest_first()
            .filter(|(at, ev)| ev.is_pending() && (now - **at).abs() <= window)
            .map(|(at, ev)| LogEvent {
                at: *at,
                code: ev.value.clone(),
            })
            .collect()
    }

    /// Events no older than `window` in the given reported state, newest
    /// first.
    pub fn recent(&self, window: chrono::Duration, reported: bool, now: DateTime<Utc>) -> Vec<LogEvent> {
        self.events
            .newest_first()
            .filter(|(at, ev)| ev.is_pending() != reported && (now - **at).abs() <= window)
            .map(|(at, ev)| LogEvent {
                at: *at,
                code: ev.value.clone(),
            })
            .collect()
    }

    /// Mark an event reported. One-way; false if it is gone or already
    /// reported.
    pub fn flag_reported(&mut self, at: &DateTime<Utc>) -> bool {
        match self.events.get_mut(at) {
            Some(ev) => {
                let flipped = ev.consume();
                if flipped {
                    debug!(%at, code = %ev.value, "syslog event now reported");
                }
                flipped
            }
            None => false,
        }
    }
}
