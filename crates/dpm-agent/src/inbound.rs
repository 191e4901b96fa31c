//! Commands accepted by SMS from the inbound roster.

use dpm_tpi::ArmMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Reply with the current keypad status.
    Status,
    Arm { partition: u8, mode: ArmMode },
    Invalid,
}

/// Keyword match on the upper-cased body. `STATUS` wins over `ARM`; for
/// arming the last matching mode keyword wins.
pub fn parse_request(body: &str) -> Request {
    let text = body.to_uppercase();
    if text.contains("STATUS") {
        return Request::Status;
    }
    if !text.contains("ARM") {
        return Request::Invalid;
    }

    let partition = if text.contains('2') || text.contains("TWO") { 2 } else { 1 };
    let mut mode = ArmMode::Away;
    if text.contains("STAY") {
        mode = ArmMode::Stay;
    }
    if text.contains("NIGHT") {
        mode = ArmMode::NightStay;
    }
    if text.contains("INSTANT") {
        mode = ArmMode::Instant;
    }
    Request::Arm { partition, mode }
}
