//! # Alert assembly
//!
//! The module sends a burst of frames per event: partition status, keypad
//! status and finally the Contact ID. A new Contact ID closes the burst and
//! is paired with the newest keypad text:
//!
//! ```text
//!   FIRE 03 GROUND FLOOR ! Partition:01, New event:373 Fire trouble, Zone:...
//!   └──── keypad text ───┘ └───────────── decoded Contact ID ───────────────┘
//! ```
//!
//! The `!` separates the two halves for the classifier; the decoder never
//! emits one.

use dpm_common::cid::CidDecoder;
use dpm_tpi::frame::contact_id_code;
use dpm_tpi::history::FrameHistory;
use dpm_tpi::TpiHistory;
use tracing::debug;

pub const SEPARATOR: &str = " ! ";

/// Width of the `yyyy-mm-dd hh:mm:ss ` prefix the modem adds.
pub const TIMESTAMP_PREFIX_LEN: usize = 20;

fn consume_latest(history: &mut FrameHistory) -> bool {
    history
        .latest_mut()
        .map(|(_, tracked)| tracked.consume())
        .unwrap_or(false)
}

pub struct AlertAssembler {
    decoder: CidDecoder,
    ignore_tokens: Vec<String>,
    max_len: usize,
}

impl AlertAssembler {
    pub fn new(decoder: CidDecoder, ignore_tokens: Vec<String>, sms_max_size: usize) -> Self {
        Self {
            decoder,
            ignore_tokens,
            max_len: sms_max_size.saturating_sub(TIMESTAMP_PREFIX_LEN),
        }
    }

    pub fn decoder(&self) -> &CidDecoder {
        &self.decoder
    }

    /// Mark new frames consumed and build an alert if a new, non-repeated
    /// Contact ID arrived.
    pub fn assemble(&self, history: &mut TpiHistory) -> Option<String> {
        if consume_latest(&mut history.keypad) {
            let latest = history.keypad.latest().map(|(_, t)| &t.value.text);
            let previous = history.keypad.previous().map(|(_, t)| &t.value.text);
            if latest != previous {
                debug!(keypad = ?latest, "new keypad status");
            }
        }
        consume_latest(&mut history.zones);
        consume_latest(&mut history.partitions);
        consume_latest(&mut history.zone_timers);

        if !consume_latest(&mut history.contact_ids) {
            return None;
        }
        let (_, latest) = history.contact_ids.latest()?;
        let code = contact_id_code(&latest.value.text).to_string();
        debug!(code, "new contact-id event");

        if let Some((_, previous)) = history.contact_ids.previous() {
            if !previous.is_pending() && contact_id_code(&previous.value.text) == code {
                debug!(code, "repeated contact-id event ignored");
                return None;
            }
        }

        let keypad = history.latest_keypad_text().unwrap_or_default();
        let decoded = self.decoder.decode(&code);
        Some(self.compact(keypad, &decoded))
    }

    /// Strip ignore-tokens from the keypad half, tidy separators and fit the
    /// result into one SMS after the timestamp prefix.
    pub fn compact(&self, keypad: &str, decoded: &str) -> String {
        let mut fragment = keypad.to_string();
        for token in &self.ignore_tokens {
            fragment = fragment.replace(token.as_str(), "");
        }
        fragment = collapse(&fragment, "  ", " ");
        fragment = fragment.replace(", ", ",");
        fragment = collapse(&fragment, ",,", ",");
        let fragment = fragment.trim_matches([' ', ',']).replace(',', ", ");

        let message = format!("{fragment}{SEPARATOR}{decoded}");
        let message = collapse(message.trim_matches([' ', ',']), "  ", " ");
        truncate(message, self.max_len)
    }
}

fn collapse(text: &str, pair: &str, single: &str) -> String {
    let mut out = text.to_string();
    while out.contains(pair) {
        out = out.replace(pair, single);
    }
    out
}

fn truncate(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dpm_common::Tracked;
    use dpm_tpi::Decoded;

    fn assembler(ignore: &[&str]) -> AlertAssembler {
        AlertAssembler::new(
            CidDecoder::default(),
            ignore.iter().map(|s| s.to_string()).collect(),
            160,
        )
    }

    fn frame(text: &str) -> Tracked<Decoded> {
        Tracked::pending(Decoded {
            raw: String::new(),
            text: text.to_string(),
        })
    }

    fn push(h: &mut TpiHistory, which: fn(&mut TpiHistory) -> &mut FrameHistory, text: &str) {
        let key = h.stamp(Utc::now());
        which(h).insert(key, frame(text));
    }

    fn keypad(h: &mut TpiHistory) -> &mut FrameHistory {
        &mut h.keypad
    }

    fn cids(h: &mut TpiHistory) -> &mut FrameHistory {
        &mut h.contact_ids
    }

    // ─── Assembly ───────────────────────────────────────────────────────

    #[test]
    fn pairs_contact_id_with_keypad() {
        let a = assembler(&[]);
        let mut h = TpiHistory::new();
        push(&mut h, keypad, "ALARM,ZONE 003");
        push(&mut h, cids, "CID=1131010030");
        assert_eq!(
            a.assemble(&mut h).as_deref(),
            Some("ALARM, ZONE 003 ! Partition:01, New event:131 Perimeter, Zone:zone-3")
        );
        // everything consumed, nothing new
        assert_eq!(a.assemble(&mut h), None);
        assert!(!h.keypad.latest().unwrap().1.is_pending());
    }

    #[test]
    fn keypad_alone_is_not_an_alert() {
        let a = assembler(&[]);
        let mut h = TpiHistory::new();
        push(&mut h, keypad, "READY");
        assert_eq!(a.assemble(&mut h), None);
        assert!(!h.keypad.latest().unwrap().1.is_pending());
    }

    #[test]
    fn repeated_code_is_ignored() {
        let a = assembler(&[]);
        let mut h = TpiHistory::new();
        push(&mut h, keypad, "ALARM");
        push(&mut h, cids, "CID=1131010030");
        assert!(a.assemble(&mut h).is_some());
        push(&mut h, cids, "CID=1131010030");
        assert_eq!(a.assemble(&mut h), None);
        push(&mut h, cids, "CID=3131010030");
        assert!(a.assemble(&mut h).is_some());
    }

    #[test]
    fn missing_keypad_still_alerts() {
        let a = assembler(&[]);
        let mut h = TpiHistory::new();
        push(&mut h, cids, "CID=1441010010");
        assert_eq!(
            a.assemble(&mut h).as_deref(),
            Some("! Partition:01, Open event:441 Armed Stay, User:Installer")
        );
    }

    // ─── Compaction ─────────────────────────────────────────────────────

    #[test]
    fn strips_ignore_tokens() {
        let a = assembler(&["LED ON", "BEEP", "***"]);
        assert_eq!(
            a.compact("LED ON,ARMED ***STAY***,BEEP,ZONES BYPASSED", "decoded"),
            "ARMED STAY, ZONES BYPASSED ! decoded"
        );
    }

    #[test]
    fn tidies_spacing_and_commas() {
        let a = assembler(&[]);
        assert_eq!(a.compact(" ,READY,,  AC LOSS, ", "x"), "READY, AC LOSS ! x");
    }

    #[test]
    fn truncates_to_fit_one_sms() {
        let a = assembler(&[]);
        let long = "Z".repeat(300);
        let out = a.compact(&long, "decoded");
        assert_eq!(out.chars().count(), 160 - TIMESTAMP_PREFIX_LEN);
        assert!(out.starts_with("ZZZ"));
    }
}
