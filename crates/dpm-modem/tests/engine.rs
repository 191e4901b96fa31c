//! # Modem engine tests
//!
//! A scripted modem answers every AT command with `OK` unless a test says
//! otherwise. All delays are zero.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use dpm_common::testing::{CountingRebooter, ScriptedLink};
use dpm_modem::at::PROVISIONING;
use dpm_modem::{ModemConfig, ModemEngine, ModemState, SendOutcome, UnreadSms};

// ─── Helpers ────────────────────────────────────────────────────────────────

const CTRL_Z: &[u8] = &[0x1A];

fn test_config() -> ModemConfig {
    ModemConfig {
        timeout: Duration::from_millis(10),
        send_timeout: Duration::from_millis(10),
        retries: 2,
        retry_delay: Duration::ZERO,
        boot_wait: Duration::ZERO,
        prompt_delay: Duration::ZERO,
        send_enabled: true,
        duplicate_window: Duration::from_secs(60),
    }
}

/// Answers OK to commands, a prompt to `AT+CMGS`, and `+CMGS` to Ctrl-Z.
fn modem_reply(write: &[u8]) -> Option<Vec<u8>> {
    if write == CTRL_Z {
        return Some(b"\r\n+CMGS: 12\r\n\r\nOK\r\n".to_vec());
    }
    let text = String::from_utf8_lossy(write);
    if text.starts_with("AT+CMGS=") {
        Some(b"> ".to_vec())
    } else if text.starts_with("AT") && text.ends_with('\r') {
        Some(b"\r\nOK\r\n".to_vec())
    } else {
        None
    }
}

fn engine_with(config: ModemConfig, link: &ScriptedLink, rebooter: &CountingRebooter) -> ModemEngine {
    ModemEngine::new(config, Box::new(link.clone()), Box::new(rebooter.clone()))
}

fn ready_modem(config: ModemConfig) -> (ModemEngine, ScriptedLink, CountingRebooter) {
    let link = ScriptedLink::new();
    link.respond_with(modem_reply);
    let rebooter = CountingRebooter::new();
    let mut modem = engine_with(config, &link, &rebooter);
    assert!(modem.start());
    link.clear_writes();
    (modem, link, rebooter)
}

fn ctrl_z_count(link: &ScriptedLink) -> usize {
    link.writes().iter().filter(|w| w.as_slice() == CTRL_Z).count()
}

// ─── Provisioning ───────────────────────────────────────────────────────────

#[test]
fn start_runs_provisioning_in_order() {
    let link = ScriptedLink::new();
    link.respond_with(modem_reply);
    let mut modem = engine_with(test_config(), &link, &CountingRebooter::new());
    assert_eq!(modem.state(), ModemState::Uninitialized);

    assert!(modem.start());
    assert_eq!(modem.state(), ModemState::Ready);
    let expected: Vec<String> = PROVISIONING.iter().map(|c| format!("{c}\r")).collect();
    assert_eq!(link.written_text(), expected);
}

#[test]
fn provisioning_error_is_retried() {
    let link = ScriptedLink::new();
    let refused = Rc::new(Cell::new(false));
    let flag = refused.clone();
    link.respond_with(move |w| {
        if w == b"AT+CMGF=1\r" && !flag.get() {
            flag.set(true);
            return Some(b"\r\nERROR\r\n".to_vec());
        }
        modem_reply(w)
    });
    let mut modem = engine_with(test_config(), &link, &CountingRebooter::new());

    assert!(modem.start());
    assert!(refused.get());
    assert_eq!(link.connects(), 2);
}

#[test]
fn start_gives_up_after_retries() {
    let link = ScriptedLink::new();
    link.fail_next_connects(5);
    let mut modem = engine_with(test_config(), &link, &CountingRebooter::new());
    assert!(!modem.start());
    assert_eq!(modem.state(), ModemState::Uninitialized);
    assert!(!modem.is_ready());
}

// ─── Sending ────────────────────────────────────────────────────────────────

#[test]
fn send_is_two_stage_with_timestamp_prefix() {
    let (mut modem, link, _) = ready_modem(test_config());
    assert_eq!(modem.send_sms("FIRE zone 3", "+15551234567"), SendOutcome::Sent);

    let writes = link.written_text();
    assert_eq!(writes.len(), 3);
    assert_eq!(writes[0], "AT+CMGS=\"+15551234567\"\r");
    // "YYYY-MM-DD HH:MM:SS " then the text
    assert_eq!(writes[1].len(), 20 + "FIRE zone 3".len());
    assert!(writes[1].ends_with(" FIRE zone 3"));
    assert_eq!(writes[2].as_bytes(), CTRL_Z);
    assert_eq!(modem.history().len(), 1);
}

#[test]
fn duplicate_inside_window_is_not_transmitted() {
    let (mut modem, link, _) = ready_modem(test_config());
    assert_eq!(modem.send_sms("alarm", "555"), SendOutcome::Sent);
    assert_eq!(modem.send_sms("alarm", "555"), SendOutcome::Duplicate);

    assert_eq!(ctrl_z_count(&link), 1);
    // duplicates still land in history
    assert_eq!(modem.history().len(), 2);
}

#[test]
fn same_text_to_another_phone_is_sent() {
    let (mut modem, link, _) = ready_modem(test_config());
    assert_eq!(modem.send_sms("alarm", "555"), SendOutcome::Sent);
    assert_eq!(modem.send_sms("alarm", "666"), SendOutcome::Sent);
    assert_eq!(ctrl_z_count(&link), 2);
}

#[test]
fn disabled_sending_writes_nothing() {
    let config = ModemConfig {
        send_enabled: false,
        ..test_config()
    };
    let (mut modem, link, _) = ready_modem(config);
    assert_eq!(modem.send_sms("alarm", "555"), SendOutcome::Disabled);
    assert!(link.writes().is_empty());
    assert!(modem.history().is_empty());
}

#[test]
fn failed_send_is_retried_once_after_reconnect() {
    let (mut modem, link, rebooter) = ready_modem(test_config());
    link.fail_next_writes(1);

    assert_eq!(modem.send_sms("alarm", "555"), SendOutcome::Sent);
    assert_eq!(link.connects(), 2);
    assert_eq!(rebooter.count(), 0);
    assert_eq!(ctrl_z_count(&link), 1);
}

#[test]
fn rejected_send_is_a_hard_failure() {
    let link = ScriptedLink::new();
    link.respond_with(|w| {
        if w == CTRL_Z {
            Some(b"\r\nERROR\r\n".to_vec())
        } else {
            modem_reply(w)
        }
    });
    let rebooter = CountingRebooter::new();
    let mut modem = engine_with(test_config(), &link, &rebooter);
    assert!(modem.start());

    assert_eq!(modem.send_sms("alarm", "555"), SendOutcome::Failed);
    assert_eq!(ctrl_z_count(&link), 2);
    assert!(modem.history().is_empty());
}

#[test]
fn history_is_capped_at_sixteen() {
    let (mut modem, _, _) = ready_modem(test_config());
    for n in 0..20 {
        assert_eq!(modem.send_sms(&format!("alert {n}"), "555"), SendOutcome::Sent);
    }
    assert_eq!(modem.history().len(), 16);
    let (_, newest) = modem.history().latest().unwrap();
    assert_eq!(newest.text, "alert 19");
}

// ─── Receiving ──────────────────────────────────────────────────────────────

#[test]
fn unread_listing_is_parsed() {
    let link = ScriptedLink::new();
    link.respond_with(|w| {
        if w.starts_with(b"AT+CMGL") {
            Some(
                b"\r\n+CMGL: 4,\"REC UNREAD\",\"9990001212\",\"\",\"24/03/05,14:22:10-20\"\r\nStatus?\r\n\r\nOK\r\n"
                    .to_vec(),
            )
        } else {
            modem_reply(w)
        }
    });
    let mut modem = engine_with(test_config(), &link, &CountingRebooter::new());
    assert!(modem.start());

    let UnreadSms::Messages(msgs) = modem.unread_sms() else {
        panic!("expected messages");
    };
    assert_eq!(msgs[0].index, 4);
    assert_eq!(msgs[0].sender, "9990001212");
    assert_eq!(msgs[0].body, "Status?");
}

#[test]
fn nothing_unread_is_empty() {
    let (mut modem, _, _) = ready_modem(test_config());
    assert_eq!(modem.unread_sms(), UnreadSms::Empty);
}

#[test]
fn unread_failure_reconnects() {
    let (mut modem, link, _) = ready_modem(test_config());
    link.fail_next_reads(1);
    assert_eq!(modem.unread_sms(), UnreadSms::Failed);
    assert_eq!(link.connects(), 2);
    assert_eq!(modem.state(), ModemState::Ready);
}

#[test]
fn network_time_from_clock() {
    let link = ScriptedLink::new();
    link.respond_with(|w| {
        if w == b"AT+CCLK?\r" {
            Some(b"\r\n+CCLK: \"24/03/05,14:22:10-20\"\r\n\r\nOK\r\n".to_vec())
        } else {
            modem_reply(w)
        }
    });
    let mut modem = engine_with(test_config(), &link, &CountingRebooter::new());
    assert!(modem.start_fast());
    let t = modem.network_time().unwrap();
    assert_eq!(t.to_string(), "2024-03-05 14:22:10");
}

// ─── Escalation ─────────────────────────────────────────────────────────────

#[test]
fn stay_awake_escalates_to_reboot_and_reprovisions() {
    let (mut modem, link, rebooter) = ready_modem(test_config());
    link.fail_next_writes(1);
    link.fail_next_connects(2);

    modem.stay_awake();

    assert_eq!(rebooter.count(), 1);
    assert_eq!(modem.state(), ModemState::Ready);
    let writes = link.written_text();
    assert_eq!(writes.first().map(String::as_str), Some("ATE0\r"));
    assert_eq!(writes.len(), PROVISIONING.len());
}

#[test]
fn healthy_stay_awake_sends_at() {
    let (mut modem, link, rebooter) = ready_modem(test_config());
    modem.stay_awake();
    assert_eq!(link.written_text(), vec!["AT\r"]);
    assert_eq!(rebooter.count(), 0);
}
