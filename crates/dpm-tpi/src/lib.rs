//! # dpm-tpi
//!
//! Client side of the Envisalink "third party interface": a persistent,
//! password-authenticated TCP session carrying `$`-terminated frames.
//!
//! ```text
//!   %00,01,8C08,08,03,ARMED ***STAY***$   keypad status
//!   %01,0800...0000$                      zone bitmap
//!   %02,0A01000000000000$                 partition states
//!   %03,1373010010$                       Contact ID event
//!   ^00,00$                               command response
//! ```
//!
//! [`TpiEngine`] owns the session, classifies frames into a [`TpiHistory`]
//! and escalates link failures from reconnect to a hardware reboot.

pub mod arm;
pub mod engine;
pub mod frame;
pub mod history;
pub mod reboot;
pub mod tcp;

pub use arm::{arm_keystrokes, ArmMode};
pub use engine::{SessionState, TpiConfig, TpiEngine};
pub use frame::{classify, Frame, FrameError};
pub use history::{Decoded, TpiHistory, TPI_HISTORY_CAPACITY};
pub use reboot::HttpRebooter;
pub use tcp::TcpLink;
