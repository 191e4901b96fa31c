//! Password obscuring for the configuration file.
//!
//! The TPI password is XOR'd with a key stretched from this host's CPU
//! serial number and stored as quoted hex. It keeps the password out of
//! casual sight on the device; it is obfuscation, not encryption, and
//! anyone holding the serial number can reverse it.

use std::fs;

use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 8;

const SERIAL_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum ObscureError {
    #[error("no CPU serial or machine id available on this host")]
    NoHostKey,
    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    TooShort,
    #[error("obscured value is not hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("revealed password is not valid UTF-8")]
    NotUtf8,
}

/// `'...'` or `"..."`.
pub fn is_obscured(value: &str) -> bool {
    let v = value.trim();
    v.len() >= 2
        && ((v.starts_with('\'') && v.ends_with('\'')) || (v.starts_with('"') && v.ends_with('"')))
}

/// Serial line of `/proc/cpuinfo`, else `/etc/machine-id`.
pub fn host_serial() -> Option<String> {
    let from_cpuinfo = fs::read_to_string("/proc/cpuinfo").ok().and_then(|info| {
        info.lines()
            .map(|l| l.trim().to_ascii_lowercase())
            .filter(|l| l.starts_with("serial") && l.contains(':'))
            .filter_map(|l| l.split_once(':').map(|(_, v)| v.trim().to_string()))
            .find(|v| !v.is_empty())
    });
    from_cpuinfo.or_else(|| {
        fs::read_to_string("/etc/machine-id")
            .ok()
            .map(|id| id.trim().to_ascii_lowercase())
            .filter(|id| !id.is_empty())
    })
}

/// Reveal with this host's key.
pub fn reveal(value: &str) -> Result<String, ObscureError> {
    Obscurer::from_host()?.reveal(value)
}

#[derive(Debug, Clone)]
pub struct Obscurer {
    serial: Vec<u8>,
}

impl Obscurer {
    /// Key material is the last eight characters of `serial`.
    pub fn new(serial: &str) -> Result<Self, ObscureError> {
        let serial = serial.trim().to_ascii_lowercase();
        if serial.is_empty() {
            return Err(ObscureError::NoHostKey);
        }
        let tail: Vec<char> = serial.chars().collect();
        let start = tail.len().saturating_sub(SERIAL_LEN);
        let serial: String = tail[start..].iter().collect();
        Ok(Self {
            serial: serial.into_bytes(),
        })
    }

    pub fn from_host() -> Result<Self, ObscureError> {
        let serial = host_serial().ok_or(ObscureError::NoHostKey)?;
        Self::new(&serial)
    }

    /// The serial repeated past `len`, its last `len` bytes, reversed.
    fn key(&self, len: usize) -> Vec<u8> {
        let mut stretched = self.serial.clone();
        while stretched.len() < len {
            stretched.extend_from_within(..);
        }
        let mut key = stretched.split_off(stretched.len() - len);
        key.reverse();
        key
    }

    fn xor(&self, bytes: &[u8]) -> Vec<u8> {
        bytes
            .iter()
            .zip(self.key(bytes.len()))
            .map(|(b, k)| b ^ k)
            .collect()
    }

    pub fn obscure(&self, password: &str) -> Result<String, ObscureError> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ObscureError::TooShort);
        }
        Ok(format!("'{}'", hex::encode(self.xor(password.as_bytes()))))
    }

    pub fn reveal(&self, value: &str) -> Result<String, ObscureError> {
        let v = value.trim();
        let inner = if is_obscured(v) { &v[1..v.len() - 1] } else { v };
        let bytes = hex::decode(inner)?;
        String::from_utf8(self.xor(&bytes)).map_err(|_| ObscureError::NotUtf8)
    }
}
