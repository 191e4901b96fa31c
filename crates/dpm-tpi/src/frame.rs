//! Frame classification and payload decoders.
//!
//! Frames are handled as trimmed text that still carries the trailing `$`.
//! Decoders are pure; anything malformed comes back as a [`FrameError`]
//! which the engine logs and drops.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame {frame:?} is missing field {index}")]
    MissingField { frame: String, index: usize },
    #[error("frame {frame:?} has a short payload ({len} < {need} chars)")]
    ShortPayload { frame: String, len: usize, need: usize },
    #[error("frame {frame:?} has non-hex data {field:?}")]
    BadHex { frame: String, field: String },
}

/// Which request a `^TT` response answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Poll,
    ChangePartition,
    DumpZoneTimers,
    Keystrokes,
}

impl Command {
    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "^00" => Some(Command::Poll),
            "^01" => Some(Command::ChangePartition),
            "^02" => Some(Command::DumpZoneTimers),
            "^03" => Some(Command::Keystrokes),
            _ => None,
        }
    }
}

/// A classified inbound frame with its payload decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Empty,
    /// Reply to the deliberately invalid `^09` keepalive probe.
    ProbeAck { ok: bool },
    Response { command: Command, ok: bool },
    Keypad(String),
    Zones(String),
    Partitions(String),
    ContactId(String),
    ZoneTimers(String),
    Unknown,
}

/// Classify a frame by its prefix and decode its payload.
pub fn classify(frame: &str) -> Result<Frame, FrameError> {
    let frame = frame.trim();
    if frame.is_empty() {
        return Ok(Frame::Empty);
    }
    let prefix = frame.get(..3).unwrap_or(frame);

    if prefix == "^09" {
        // `02` is "unknown command", which is exactly what the probe asks for.
        return Ok(Frame::ProbeAck {
            ok: frame.starts_with("^09,02$"),
        });
    }
    if let Some(command) = Command::from_prefix(prefix) {
        return Ok(Frame::Response {
            command,
            ok: frame.ends_with(",00$"),
        });
    }

    let frame = match prefix {
        "%00" => Frame::Keypad(decode_keypad(frame)?),
        "%01" => Frame::Zones(decode_zones(frame)?),
        "%02" => Frame::Partitions(decode_partitions(frame)?),
        "%03" => Frame::ContactId(decode_contact_id(frame)?),
        "%FF" => Frame::ZoneTimers(decode_zone_timers(frame)),
        _ => Frame::Unknown,
    };
    Ok(frame)
}

fn field<'a>(frame: &'a str, index: usize) -> Result<&'a str, FrameError> {
    frame
        .split(',')
        .nth(index)
        .map(|f| f.trim_end_matches('$'))
        .ok_or_else(|| FrameError::MissingField {
            frame: frame.to_string(),
            index,
        })
}

fn hex_u16(frame: &str, digits: &str) -> Result<u16, FrameError> {
    u16::from_str_radix(digits, 16).map_err(|_| FrameError::BadHex {
        frame: frame.to_string(),
        field: digits.to_string(),
    })
}

fn payload<'a>(frame: &'a str, need: usize) -> Result<&'a str, FrameError> {
    let data = field(frame, 1)?;
    if data.len() < need || !data.is_char_boundary(need) {
        return Err(FrameError::ShortPayload {
            frame: frame.to_string(),
            len: data.len(),
            need,
        });
    }
    if !data[..need].is_ascii() {
        return Err(FrameError::BadHex {
            frame: frame.to_string(),
            field: data.to_string(),
        });
    }
    Ok(data)
}

// ─── %00 keypad status ──────────────────────────────────────────────────────

const KEYPAD_FLAGS: [(u16, &str); 11] = [
    (1 << 15, "ARMED STAY"),
    (1 << 14, "LOW BATTERY"),
    (1 << 13, "FIRE"),
    (1 << 12, "SYSTEM READY"),
    (1 << 9, "SYSTEM TROUBLE"),
    (1 << 8, "FIRE ZONE ALARM"),
    (1 << 7, "ARMED NO DELAY"),
    (1 << 5, "CHIME"),
    (1 << 4, "ZONES BYPASSED"),
    // bit 3 handled separately: AC PRESENT / AC LOSS
    (1 << 2, "ARMED AWAY"),
    (1 << 1, "ALARM IN MEMORY"),
];

const AC_PRESENT: u16 = 1 << 3;
const ALARMED: u16 = 1;

/// `%00,01,8C08,08,03,ARMED ***STAY***$` → `ARMED STAY,AC PRESENT`
///
/// The flags word is the third field. NIGHT-STAY and DISARMED have no flag
/// bit and are taken from the keypad text.
pub fn decode_keypad(frame: &str) -> Result<String, FrameError> {
    let flags = hex_u16(frame, field(frame, 2)?)?;

    let mut phrases: Vec<&str> = Vec::with_capacity(8);
    for (bit, phrase) in KEYPAD_FLAGS {
        if bit == 1 << 2 {
            phrases.push(if flags & AC_PRESENT != 0 {
                "AC PRESENT"
            } else {
                "AC LOSS"
            });
        }
        if flags & bit != 0 {
            phrases.push(phrase);
        }
    }
    if flags & ALARMED != 0 {
        phrases.push("ALARMED STATE");
    }
    if frame.contains("NIGHT-STAY") {
        phrases.push("NIGHT-STAY");
    }
    if frame.contains("DISARMED") {
        phrases.push("DISARMED");
    }
    Ok(phrases.join(","))
}

// ─── %01 zone bitmap ────────────────────────────────────────────────────────

/// `%01,0800...$` → `004`
///
/// Eight 4-hex-digit groups of 16 zones each. The first byte of a group
/// covers the group's zones 1..=8 and the second byte zones 9..=16, least
/// significant bit first.
pub fn decode_zones(frame: &str) -> Result<String, FrameError> {
    let data = payload(frame, 32)?;
    let mut zones = Vec::new();
    for group in 0..8u16 {
        let start = usize::from(group) * 4;
        let bits = hex_u16(frame, &data[start..start + 4])?;
        for offset in 0..16u16 {
            // offsets 0..8 live in the high byte, 8..16 in the low byte
            let bit = if offset < 8 { offset + 8 } else { offset - 8 };
            if bits & (1 << bit) != 0 {
                zones.push(format!("{:03}", group * 16 + offset + 1));
            }
        }
    }
    Ok(zones.join(","))
}

// ─── %02 partition states ───────────────────────────────────────────────────

fn partition_state(value: u16) -> Option<&'static str> {
    let state = match value {
        1 => "READY",
        2 => "READY TO ARM",
        3 => "NOT READY",
        4 => "ARMED STAY",
        5 => "ARMED AWAY",
        6 => "ARMED INSTANT",
        7 => "EXIT DELAY",
        8 => "ALARMING NOW",
        9 => "WAS ALARMING",
        10 => "ARMED MAXIMUM",
        _ => return None,
    };
    Some(state)
}

/// `%02,0A01000000000000$` → `PTN1=ARMED MAXIMUM,PTN2=READY`
pub fn decode_partitions(frame: &str) -> Result<String, FrameError> {
    let data = payload(frame, 16)?;
    let mut parts = Vec::new();
    for slot in 0..8 {
        let value = hex_u16(frame, &data[slot * 2..slot * 2 + 2])?;
        if value == 0 {
            continue;
        }
        let state = partition_state(value)
            .map(str::to_string)
            .unwrap_or_else(|| format!("UNKNOWN({value})"));
        parts.push(format!("PTN{}={}", slot + 1, state));
    }
    Ok(parts.join(","))
}

// ─── %03 Contact ID ─────────────────────────────────────────────────────────

/// `%03,1373010010$` → `CID=1373010010`
pub fn decode_contact_id(frame: &str) -> Result<String, FrameError> {
    let code = field(frame, 1)?;
    if code.is_empty() {
        return Err(FrameError::ShortPayload {
            frame: frame.to_string(),
            len: 0,
            need: 10,
        });
    }
    Ok(format!("CID={code}"))
}

/// Strip the `CID=` tag added by [`decode_contact_id`].
pub fn contact_id_code(text: &str) -> &str {
    text.strip_prefix("CID=").unwrap_or(text)
}

// ─── %FF zone timers ────────────────────────────────────────────────────────

// TODO: decode the 64 little-endian 5-second tick counters per zone.
pub fn decode_zone_timers(_frame: &str) -> String {
    "Zone nnn Closed mm Minutes Ago".to_string()
}
