//! # Budget gate
//!
//! The SMS plan renews on a fixed day of the month. Before every delivery
//! the gate projects whether the remaining allowance lasts until the next
//! renewal and rations by severity:
//!
//! ```text
//!   risk = round(avg_phones × days_to_go / remaining × 100)
//!
//!   risk < 100, used + avg ≤ allowance   →  red, yellow, reboot
//!   risk ≥ 100, used + avg ≤ allowance   →  red only
//!   otherwise                            →  nothing
//! ```
//!
//! `avg_phones` is the mean roster size over red, yellow, reboot and
//! inbound. A renewal day past the end of a short month falls on that
//! month's last day.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use tracing::{debug, error, info, trace};

use crate::classify::AlertLevel;
use crate::config::{PhoneRosters, ProviderSettings};
use crate::metrics::{MetricsError, MetricsStore, SmsUsage};

/// Days assumed left when today is the renewal day itself.
pub const FULL_CYCLE_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Authorization {
    pub red: bool,
    pub yellow: bool,
    pub reboot: bool,
}

impl Authorization {
    pub const NONE: Authorization = Authorization {
        red: false,
        yellow: false,
        reboot: false,
    };
    pub const ALL: Authorization = Authorization {
        red: true,
        yellow: true,
        reboot: true,
    };
    pub const RED_ONLY: Authorization = Authorization {
        red: true,
        yellow: false,
        reboot: false,
    };

    pub fn allows(&self, level: AlertLevel) -> bool {
        match level {
            AlertLevel::Red => self.red,
            AlertLevel::Yellow => self.yellow,
            AlertLevel::Reboot => self.reboot,
        }
    }
}

fn last_day_of_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = first.and_then(|d| d.checked_add_months(Months::new(1)));
    match (first, next) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 28,
    }
}

/// The renewal date within `year`/`month`.
fn renewal_in(year: i32, month: u32, renewal_day: u32) -> Option<NaiveDate> {
    let day = renewal_day.clamp(1, last_day_of_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

/// This month's renewal date, once it has been reached.
pub fn renewal_boundary(today: NaiveDate, renewal_day: u32) -> Option<NaiveDate> {
    renewal_in(today.year(), today.month(), renewal_day).filter(|b| today >= *b)
}

/// True when usage still belongs to the previous cycle.
pub fn renewal_due(today: NaiveDate, renewal_day: u32, latest: Option<NaiveDateTime>) -> bool {
    let Some(boundary) = renewal_boundary(today, renewal_day) else {
        return false;
    };
    match latest {
        None => true,
        Some(sent) => sent <= boundary.and_time(chrono::NaiveTime::MIN),
    }
}

/// Whole days until the next renewal; `FULL_CYCLE_DAYS` on the day itself.
pub fn days_to_go(today: NaiveDate, renewal_day: u32) -> i64 {
    let this_month = renewal_in(today.year(), today.month(), renewal_day);
    let next = match this_month {
        Some(date) if today <= date => Some(date),
        _ => today
            .checked_add_months(Months::new(1))
            .and_then(|d| renewal_in(d.year(), d.month(), renewal_day)),
    };
    match next.map(|n| (n - today).num_days()) {
        Some(0) | None => FULL_CYCLE_DAYS,
        Some(days) => days,
    }
}

/// Percentage risk of running out before renewal. A zero remaining
/// allowance is treated as one message left.
pub fn risk(avg_phones: f64, days_to_go: i64, remaining: i64) -> i64 {
    let divisor = if remaining == 0 { 1 } else { remaining };
    (avg_phones * days_to_go as f64 / divisor as f64 * 100.0).round_ties_even() as i64
}

pub fn gate(risk: i64, used: u64, avg_phones: f64, allowance: u32) -> Authorization {
    let within = used as f64 + avg_phones <= allowance as f64;
    match (risk < 100, within) {
        (true, true) => Authorization::ALL,
        (false, true) => Authorization::RED_ONLY,
        _ => Authorization::NONE,
    }
}

#[derive(Debug, Clone)]
pub struct BudgetGate {
    provider: ProviderSettings,
    avg_phones: f64,
}

impl BudgetGate {
    pub fn new(provider: ProviderSettings, rosters: &PhoneRosters) -> Self {
        Self {
            provider,
            avg_phones: rosters.average(),
        }
    }

    pub fn avg_phones(&self) -> f64 {
        self.avg_phones
    }

    /// Reset usage on renewal, then decide what may be sent at `now`.
    pub fn authorize(
        &self,
        metrics: &mut dyn MetricsStore,
        now: NaiveDateTime,
    ) -> Result<Authorization, MetricsError> {
        let today = now.date();
        let rd = self.provider.renewal_day;
        let usage = metrics.sms();
        if renewal_due(today, rd, usage.latest) && usage != SmsUsage::default() {
            info!(count = usage.count, "SMS allowance renewed, usage reset");
            metrics.reset_sms()?;
        }

        if self.avg_phones == 0.0 {
            error!("no phone numbers configured, no SMS can be sent");
            return Ok(Authorization::NONE);
        }

        let used = metrics.sms().count;
        let allowance = self.provider.allowance;
        let remaining = allowance as i64 - used as i64;
        let days = days_to_go(today, rd);
        let risk = risk(self.avg_phones, days, remaining);
        trace!(allowance, used, remaining, days, avg_phones = self.avg_phones, risk, "SMS budget");

        let auth = gate(risk, used, self.avg_phones, allowance);
        if auth == Authorization::NONE {
            debug!(risk, used, allowance, "no SMS alerts allowed");
        } else if auth == Authorization::RED_ONLY {
            debug!(risk, "only red alerts allowed");
        }
        Ok(auth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // ─── Calendar ───────────────────────────────────────────────────────

    #[test]
    fn days_to_go_within_and_across_months() {
        assert_eq!(days_to_go(d(2024, 7, 10), 15), 5);
        assert_eq!(days_to_go(d(2024, 7, 20), 15), 25);
        assert_eq!(days_to_go(d(2024, 12, 20), 15), 26);
        assert_eq!(days_to_go(d(2024, 7, 15), 15), FULL_CYCLE_DAYS);
    }

    #[test]
    fn renewal_day_clamps_to_short_months() {
        assert_eq!(days_to_go(d(2023, 2, 10), 31), 18);
        assert_eq!(days_to_go(d(2024, 2, 29), 31), FULL_CYCLE_DAYS);
        assert_eq!(renewal_boundary(d(2023, 2, 28), 30), Some(d(2023, 2, 28)));
        assert_eq!(days_to_go(d(2023, 1, 31), 30), 28);
    }

    #[test]
    fn renewal_due_only_after_boundary() {
        let sent = |y, m, day| Some(d(y, m, day).and_hms_opt(12, 0, 0).unwrap());
        assert!(!renewal_due(d(2024, 7, 14), 15, sent(2024, 6, 20)));
        assert!(renewal_due(d(2024, 7, 15), 15, sent(2024, 7, 14)));
        assert!(renewal_due(d(2024, 7, 15), 15, None));
        assert!(!renewal_due(d(2024, 7, 16), 15, sent(2024, 7, 15)));
        assert!(renewal_due(
            d(2024, 7, 16),
            15,
            Some(d(2024, 7, 15).and_hms_opt(0, 0, 0).unwrap())
        ));
    }

    // ─── Risk and gate ──────────────────────────────────────────────────

    #[test]
    fn risk_rounds_half_to_even() {
        assert_eq!(risk(1.0, 5, 200), 3); // 2.5
        assert_eq!(risk(1.0, 7, 200), 4); // 3.5
        assert_eq!(risk(2.0, 10, 20), 100);
        assert_eq!(risk(0.5, 2, 0), 100);
    }

    #[test]
    fn gate_boundaries() {
        assert_eq!(gate(99, 0, 1.0, 100), Authorization::ALL);
        assert_eq!(gate(100, 0, 1.0, 100), Authorization::RED_ONLY);
        assert_eq!(gate(50, 99, 1.0, 100), Authorization::ALL);
        assert_eq!(gate(50, 100, 1.0, 100), Authorization::NONE);
        assert_eq!(gate(-5, 150, 1.0, 100), Authorization::NONE);
    }

    #[test]
    fn authorization_by_level() {
        assert!(Authorization::RED_ONLY.allows(AlertLevel::Red));
        assert!(!Authorization::RED_ONLY.allows(AlertLevel::Yellow));
        assert!(!Authorization::RED_ONLY.allows(AlertLevel::Reboot));
        assert!(Authorization::ALL.allows(AlertLevel::Reboot));
    }
}
