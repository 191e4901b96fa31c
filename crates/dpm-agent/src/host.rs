//! Privileged host operations, run through `sudo`.

use std::io;
use std::process::{Command, Stdio};

use chrono::NaiveDateTime;
use tracing::{error, info};

pub trait HostControl {
    /// Reboot this machine.
    fn reboot(&mut self) -> io::Result<()>;
    /// Set the system clock to local time `at`.
    fn set_clock(&mut self, at: NaiveDateTime) -> io::Result<()>;
}

/// The real host: `sudo reboot now`, `sudo date -s`.
#[derive(Debug, Default)]
pub struct SudoHost;

fn run(args: &[&str]) -> io::Result<()> {
    let status = Command::new("sudo")
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("sudo {} exited with {status}", args.join(" "))))
    }
}

impl HostControl for SudoHost {
    fn reboot(&mut self) -> io::Result<()> {
        error!("rebooting host");
        run(&["reboot", "now"])
    }

    fn set_clock(&mut self, at: NaiveDateTime) -> io::Result<()> {
        let stamp = at.format("%Y-%m-%d %H:%M:%S").to_string();
        run(&["date", "-s", &stamp])?;
        info!(%stamp, "system clock set");
        Ok(())
    }
}
