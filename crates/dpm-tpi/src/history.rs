//! Per-type rolling histories of decoded frames.

use chrono::{DateTime, Duration, Utc};
use dpm_common::{RollingHistory, Tracked};

/// Two entries per type: the previous one is what lets a repeated frame be
/// recognised, and more than two would hide the panel's current state.
pub const TPI_HISTORY_CAPACITY: usize = 2;

/// A frame as received plus its decoded text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub raw: String,
    pub text: String,
}

pub type FrameHistory = RollingHistory<DateTime<Utc>, Tracked<Decoded>>;

#[derive(Debug, Clone)]
pub struct TpiHistory {
    pub keypad: FrameHistory,
    pub zones: FrameHistory,
    pub partitions: FrameHistory,
    pub contact_ids: FrameHistory,
    pub zone_timers: FrameHistory,
    pub responses: RollingHistory<DateTime<Utc>, String>,
    pub requests: RollingHistory<DateTime<Utc>, String>,
    last_stamp: Option<DateTime<Utc>>,
}

impl Default for TpiHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl TpiHistory {
    pub fn new() -> Self {
        let frames = || RollingHistory::new(TPI_HISTORY_CAPACITY);
        Self {
            keypad: frames(),
            zones: frames(),
            partitions: frames(),
            contact_ids: frames(),
            zone_timers: frames(),
            responses: RollingHistory::new(TPI_HISTORY_CAPACITY),
            requests: RollingHistory::new(TPI_HISTORY_CAPACITY),
            last_stamp: None,
        }
    }

    /// Arrival key for a new entry. Keys are strictly increasing so two
    /// frames read within the same clock tick never collide.
    pub fn stamp(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let key = match self.last_stamp {
            Some(last) if now <= last => last + Duration::nanoseconds(1),
            _ => now,
        };
        self.last_stamp = Some(key);
        key
    }

    /// Latest decoded keypad text, regardless of disposition.
    pub fn latest_keypad_text(&self) -> Option<&str> {
        self.keypad.latest().map(|(_, t)| t.value.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamps_are_strictly_increasing() {
        let mut h = TpiHistory::new();
        let now = Utc::now();
        let a = h.stamp(now);
        let b = h.stamp(now);
        let c = h.stamp(now - Duration::seconds(5));
        assert!(a < b && b < c);
    }

    #[test]
    fn keeps_two_per_type() {
        let mut h = TpiHistory::new();
        for n in 0..3 {
            let key = h.stamp(Utc::now());
            h.keypad.insert(
                key,
                Tracked::pending(Decoded {
                    raw: format!("%00,{n}$"),
                    text: format!("state {n}"),
                }),
            );
        }
        assert_eq!(h.keypad.len(), 2);
        assert_eq!(h.latest_keypad_text(), Some("state 2"));
    }
}
