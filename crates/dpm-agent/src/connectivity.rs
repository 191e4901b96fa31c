//! Internet reachability, by pinging well-known hosts in rotation.

use std::process::{Command, Stdio};

use tracing::{trace, warn};

pub trait Connectivity {
    fn is_online(&mut self) -> bool;
}

impl<F: FnMut() -> bool> Connectivity for F {
    fn is_online(&mut self) -> bool {
        self()
    }
}

/// Runs the configured ping command against the next host; one failure is
/// retried against the host after it.
#[derive(Debug, Clone)]
pub struct PingProbe {
    command: Vec<String>,
    hosts: Vec<String>,
    next: usize,
}

impl PingProbe {
    pub fn new(command: Vec<String>, hosts: Vec<String>) -> Self {
        Self {
            command,
            hosts,
            next: 0,
        }
    }

    fn next_host(&mut self) -> Option<String> {
        if self.hosts.is_empty() {
            return None;
        }
        let host = self.hosts[self.next % self.hosts.len()].clone();
        self.next = (self.next + 1) % self.hosts.len();
        Some(host)
    }

    fn ping(&mut self) -> bool {
        let (Some(program), Some(host)) = (self.command.first().cloned(), self.next_host()) else {
            warn!("no ping command or hosts configured, assuming offline");
            return false;
        };
        trace!(command = ?self.command, %host, "ping");
        Command::new(program)
            .args(&self.command[1..])
            .arg(&host)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or_else(|e| {
                warn!(error = %e, "could not run ping command");
                false
            })
    }
}

impl Connectivity for PingProbe {
    fn is_online(&mut self) -> bool {
        if self.ping() {
            return true;
        }
        trace!("ping failed, retrying once");
        self.ping()
    }
}
