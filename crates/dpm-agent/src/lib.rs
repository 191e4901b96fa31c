//! # dpm-agent
//!
//! Dual path monitoring: an alarm panel's events arrive twice, over the
//! interface module's TPI session and through its syslog. The agent pairs
//! the two reports, decides which events deserve an SMS and delivers them
//! through a cellular modem within the plan's monthly allowance.
//!
//! - [`agent`]: the orchestration loop
//! - [`alert`], [`classify`]: composite alert text and its severity
//! - [`logscan`], [`correlator`]: syslog tailing and cross-channel pairing
//! - [`budget`], [`metrics`]: SMS rationing and its persisted counters
//! - [`inbound`]: commands received by SMS
//! - [`startup`], [`host`]: boot housekeeping and host reboot triage
//! - [`config`], [`obscure`], [`connectivity`]: ambient plumbing

pub mod agent;
pub mod alert;
pub mod budget;
pub mod classify;
pub mod config;
pub mod connectivity;
pub mod correlator;
pub mod host;
pub mod inbound;
pub mod logscan;
pub mod metrics;
pub mod obscure;
pub mod startup;

pub use agent::Agent;
pub use config::Config;
