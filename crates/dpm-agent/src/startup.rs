//! # Startup housekeeping and host triage
//!
//! A host that boots badly can leave the modem or the interface module
//! unreachable. Triage reboots the host a bounded number of times before
//! giving up:
//!
//! | condition                              | action                 | exit |
//! |----------------------------------------|------------------------|------|
//! | reboot allowed, attempts < max         | count, reboot host     | 4    |
//! | reboot allowed, attempts exhausted     | give up                | 8    |
//! | reboot not allowed                     | give up                | 16   |
//!
//! Housekeeping runs once after boot: without internet the system clock is
//! taken from the modem's network time, and the modem and interface module
//! are soft-rebooted when configured to.

use dpm_modem::ModemEngine;
use dpm_tpi::TpiEngine;
use thiserror::Error;
use tracing::{error, info};

use crate::config::{Config, HostSettings};
use crate::connectivity::Connectivity;
use crate::host::HostControl;
use crate::metrics::MetricsStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Triage {
    #[error("host reboot requested")]
    Rebooting,
    #[error("host reboot attempts exhausted")]
    Exhausted,
    #[error("host reboot not permitted")]
    NotPermitted,
}

impl Triage {
    pub fn exit_code(self) -> i32 {
        match self {
            Triage::Rebooting => 4,
            Triage::Exhausted => 8,
            Triage::NotPermitted => 16,
        }
    }
}

/// Decide what to do about an unusable link.
pub fn triage(
    settings: &HostSettings,
    metrics: &mut dyn MetricsStore,
    host: &mut dyn HostControl,
) -> Triage {
    if !settings.reboot_allowed {
        error!("link unusable and host reboot not permitted, terminating");
        return Triage::NotPermitted;
    }
    let attempts = metrics.host_reboots();
    if attempts >= settings.max_reboots {
        error!(attempts, max = settings.max_reboots, "link unusable, host reboots exhausted, terminating");
        return Triage::Exhausted;
    }

    match metrics.record_host_reboot() {
        Ok(count) => error!(attempt = count, max = settings.max_reboots, "link unusable, rebooting host"),
        Err(e) => error!(error = %e, "could not record host reboot attempt"),
    }
    if let Err(e) = host.reboot() {
        error!(error = %e, "host reboot failed");
    }
    Triage::Rebooting
}

/// Forget earlier reboot attempts once the links came up.
pub fn clear_reboots(metrics: &mut dyn MetricsStore) {
    if metrics.host_reboots() == 0 {
        return;
    }
    if let Err(e) = metrics.reset_host_reboots() {
        error!(error = %e, "could not reset host reboot count");
    }
}

fn open_modem(
    config: &Config,
    modem: &mut ModemEngine,
    metrics: &mut dyn MetricsStore,
    host: &mut dyn HostControl,
) -> Result<(), Triage> {
    if !modem.start_fast() {
        error!("connectivity problem with modem");
        return Err(triage(&config.host, metrics, host));
    }
    clear_reboots(metrics);
    Ok(())
}

/// One-shot housekeeping run after boot.
pub fn housekeeping(
    config: &Config,
    modem: &mut ModemEngine,
    tpi: &mut TpiEngine,
    probe: &mut dyn Connectivity,
    metrics: &mut dyn MetricsStore,
    host: &mut dyn HostControl,
) -> Result<(), Triage> {
    if probe.is_online() {
        info!("internet connection up, system clock left alone");
        if config.modem.soft_reboot {
            open_modem(config, modem, metrics, host)?;
            modem.reboot();
        }
    } else {
        info!("no internet connection, taking the time from the modem");
        open_modem(config, modem, metrics, host)?;
        match modem.network_time() {
            Ok(at) => match host.set_clock(at) {
                Ok(()) => info!(%at, "system clock set from network time"),
                Err(e) => error!(error = %e, "could not set system clock"),
            },
            Err(e) => error!(error = %e, "could not read network time from modem"),
        }
        if config.modem.soft_reboot {
            modem.reboot();
        }
    }

    if config.tpi.soft_reboot {
        tpi.reboot();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io;

    use chrono::NaiveDateTime;

    use super::*;
    use crate::metrics::MemoryMetrics;

    #[derive(Default)]
    struct FakeHost {
        reboots: u32,
        clock: Option<NaiveDateTime>,
    }

    impl HostControl for FakeHost {
        fn reboot(&mut self) -> io::Result<()> {
            self.reboots += 1;
            Ok(())
        }

        fn set_clock(&mut self, at: NaiveDateTime) -> io::Result<()> {
            self.clock = Some(at);
            Ok(())
        }
    }

    fn settings(allowed: bool, max: u32) -> HostSettings {
        HostSettings {
            reboot_allowed: allowed,
            max_reboots: max,
        }
    }

    #[test]
    fn reboots_until_attempts_run_out() {
        let mut metrics = MemoryMetrics::default();
        let mut host = FakeHost::default();
        let s = settings(true, 2);

        assert_eq!(triage(&s, &mut metrics, &mut host), Triage::Rebooting);
        assert_eq!(triage(&s, &mut metrics, &mut host), Triage::Rebooting);
        assert_eq!(triage(&s, &mut metrics, &mut host), Triage::Exhausted);
        assert_eq!(metrics.reboots, 2);
        assert_eq!(host.reboots, 2);
    }

    #[test]
    fn no_reboot_when_not_permitted() {
        let mut metrics = MemoryMetrics::default();
        let mut host = FakeHost::default();
        assert_eq!(
            triage(&settings(false, 2), &mut metrics, &mut host),
            Triage::NotPermitted
        );
        assert_eq!(host.reboots, 0);
        assert_eq!(metrics.reboots, 0);
    }

    #[test]
    fn exit_codes() {
        assert_eq!(Triage::Rebooting.exit_code(), 4);
        assert_eq!(Triage::Exhausted.exit_code(), 8);
        assert_eq!(Triage::NotPermitted.exit_code(), 16);
    }

    #[test]
    fn clear_reboots_resets_count() {
        let mut metrics = MemoryMetrics {
            reboots: 2,
            ..Default::default()
        };
        clear_reboots(&mut metrics);
        assert_eq!(metrics.reboots, 0);
    }
}
