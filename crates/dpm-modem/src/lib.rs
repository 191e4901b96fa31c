//! # dpm-modem
//!
//! Drives a Telit LE910-class cellular modem over its USB serial ports with
//! the AT command set: provisioning into SMS text mode, sending alerts,
//! reading inbound requests and asking the network for the time.
//!
//! A second serial port on the same modem is kept as an out-of-band reboot
//! channel for when the communications port stops answering.

pub mod at;
pub mod engine;
pub mod reboot;
pub mod serial;

pub use at::{InboundSms, UnreadSms};
pub use engine::{ModemConfig, ModemEngine, ModemError, ModemState, SendOutcome, SmsRecord};
pub use reboot::AtRebooter;
pub use serial::SerialLink;
