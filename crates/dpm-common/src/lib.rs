//! Shared building blocks for the dual path monitoring agent.
//!
//! - [`history`]: fixed-capacity arrival-ordered histories and the
//!   `Pending`/`Consumed` disposition carried by tracked events
//! - [`link`]: the transport and reboot capabilities both hardware links
//!   are driven through
//! - [`cid`]: Contact ID code decoding into readable text

pub mod cid;
pub mod history;
pub mod link;

#[cfg(feature = "testing")]
pub mod testing;

pub use history::{Disposition, RollingHistory, Tracked};
pub use link::{settle, LineBuffer, Link, LinkError, Rebooter};
