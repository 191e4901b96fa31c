//! # Budget gate tests
//!
//! Rationing decisions against an in-memory metrics store. The renewal day
//! is the 15th throughout; one phone per roster gives an average of one.

use chrono::{NaiveDate, NaiveDateTime};
use dpm_agent::budget::{Authorization, BudgetGate};
use dpm_agent::classify::AlertLevel;
use dpm_agent::config::{PhoneRosters, ProviderSettings};
use dpm_agent::metrics::{MemoryMetrics, MetricsStore, SmsUsage};

// ─── Helpers ────────────────────────────────────────────────────────────────

fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn one_each() -> PhoneRosters {
    PhoneRosters {
        red: vec!["+15550001111".into()],
        yellow: vec!["+15550002222".into()],
        reboot: vec!["+15550003333".into()],
        inbound: vec!["+15550004444".into()],
    }
}

fn gate(allowance: u32, rosters: &PhoneRosters) -> BudgetGate {
    BudgetGate::new(
        ProviderSettings {
            renewal_day: 15,
            allowance,
        },
        rosters,
    )
}

fn used(count: u64, latest: NaiveDateTime) -> MemoryMetrics {
    MemoryMetrics {
        usage: SmsUsage {
            count,
            latest: Some(latest),
        },
        reboots: 0,
    }
}

// ─── Renewal ────────────────────────────────────────────────────────────────

#[test]
fn crossing_renewal_day_resets_usage() {
    let mut metrics = used(80, at(2024, 6, 30));
    gate(100, &one_each())
        .authorize(&mut metrics, at(2024, 7, 15))
        .unwrap();
    assert_eq!(metrics.sms(), SmsUsage::default());
}

#[test]
fn usage_after_boundary_is_kept() {
    let mut metrics = used(80, at(2024, 7, 15));
    gate(100, &one_each())
        .authorize(&mut metrics, at(2024, 7, 20))
        .unwrap();
    assert_eq!(metrics.sms().count, 80);
}

#[test]
fn no_reset_before_renewal_day() {
    let mut metrics = used(80, at(2024, 6, 20));
    gate(100, &one_each())
        .authorize(&mut metrics, at(2024, 7, 14))
        .unwrap();
    assert_eq!(metrics.sms().count, 80);
}

// ─── Gate policy ────────────────────────────────────────────────────────────

#[test]
fn plenty_left_allows_everything() {
    let mut metrics = MemoryMetrics::default();
    let auth = gate(1000, &one_each())
        .authorize(&mut metrics, at(2024, 7, 5))
        .unwrap();
    assert_eq!(auth, Authorization::ALL);
}

#[test]
fn risk_of_exactly_100_allows_red_only() {
    // 10 days to go, 10 messages left, one phone per roster
    let mut metrics = used(100, at(2024, 7, 1));
    let auth = gate(110, &one_each())
        .authorize(&mut metrics, at(2024, 7, 5))
        .unwrap();
    assert_eq!(auth, Authorization::RED_ONLY);
    assert!(auth.allows(AlertLevel::Red));
    assert!(!auth.allows(AlertLevel::Yellow));
    assert!(!auth.allows(AlertLevel::Reboot));
}

#[test]
fn usage_bound_is_inclusive() {
    let g = gate(100, &one_each());
    let mut at_bound = used(99, at(2024, 7, 1));
    assert_eq!(
        g.authorize(&mut at_bound, at(2024, 7, 5)).unwrap(),
        Authorization::RED_ONLY
    );
    let mut past_bound = used(100, at(2024, 7, 1));
    assert_eq!(
        g.authorize(&mut past_bound, at(2024, 7, 5)).unwrap(),
        Authorization::NONE
    );
}

#[test]
fn zero_allowance_allows_nothing() {
    let mut metrics = MemoryMetrics::default();
    let auth = gate(0, &one_each())
        .authorize(&mut metrics, at(2024, 7, 5))
        .unwrap();
    assert_eq!(auth, Authorization::NONE);
}

#[test]
fn no_phones_is_a_hard_stop() {
    let mut metrics = MemoryMetrics::default();
    let auth = gate(1000, &PhoneRosters::default())
        .authorize(&mut metrics, at(2024, 7, 5))
        .unwrap();
    assert_eq!(auth, Authorization::NONE);
}
