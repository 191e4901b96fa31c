//! # Orchestration loop tests
//!
//! The agent runs against two scripted links: an interface module that
//! accepts any login and a modem that answers every AT command with `OK`.
//! Each `step` reads at most one TPI frame. All delays are zero.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use chrono::Utc;
use dpm_agent::config::Config;
use dpm_agent::metrics::MemoryMetrics;
use dpm_agent::Agent;
use dpm_common::testing::{CountingRebooter, ScriptedLink};
use dpm_modem::{ModemConfig, ModemEngine};
use dpm_tpi::{arm_keystrokes, ArmMode, TpiConfig, TpiEngine};

// ─── Helpers ────────────────────────────────────────────────────────────────

const CTRL_Z: &[u8] = &[0x1A];

const CONFIG: &str = r#"
[provider]
renewal_day = 15
allowance = 1000

[phones]
red = ["+1 555-000-1111", "+15550002222"]
yellow = ["+15550003333"]
reboot = ["+15550004444"]
inbound = ["+15550005555"]

[panel]
urgent_tokens = ["FIRE", "Perimeter"]
important_tokens = ["ARMED"]
suppress_tokens = ["Test Report"]
"#;

const FIRE_KEYPAD: &[u8] = b"%00,01,2008,08,03,FIRE 03$";
const STAY_KEYPAD: &[u8] = b"%00,01,8C08,08,03,ARMED ***STAY***$";

fn config(extra: &str) -> Config {
    Config::from_toml_str(&format!("{CONFIG}\n{extra}")).unwrap()
}

fn tpi_config() -> TpiConfig {
    TpiConfig {
        password: "secret".into(),
        timeout: Duration::from_millis(10),
        retries: 2,
        retry_delay: Duration::ZERO,
        reboot_settle: Duration::ZERO,
        status_settle: Duration::ZERO,
        status_attempts: 3,
    }
}

fn modem_config() -> ModemConfig {
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

/// OK to commands, a prompt to `AT+CMGS`, `+CMGS` to Ctrl-Z, and `unread`
/// once in answer to the first `AT+CMGL`.
fn modem_link(unread: Option<String>) -> ScriptedLink {
    let pending = Cell::new(unread);
    let link = ScriptedLink::connected();
    link.respond_with(move |write| {
        if write == CTRL_Z {
            return Some(b"\r\n+CMGS: 7\r\n\r\nOK\r\n".to_vec());
        }
        let text = String::from_utf8_lossy(write);
        if text.starts_with("AT+CMGS=") {
            Some(b"> ".to_vec())
        } else if text.starts_with("AT+CMGL") {
            let listing = pending.take().unwrap_or_else(|| "\r\nOK\r\n".to_string());
            Some(listing.into_bytes())
        } else if text.starts_with("AT") {
            Some(b"\r\nOK\r\n".to_vec())
        } else {
            None
        }
    });
    link
}

fn tpi_link() -> ScriptedLink {
    let link = ScriptedLink::new();
    link.greet_with(b"Login:");
    link.respond_with(|w| w.ends_with(b"\n").then(|| b"OK".to_vec()));
    link
}

struct Rig {
    agent: Agent,
    tpi: ScriptedLink,
    modem: ScriptedLink,
    online: Rc<Cell<bool>>,
}

impl Rig {
    fn new(config: &Config, unread: Option<String>) -> Self {
        let tpi_link = tpi_link();
        let mut tpi = TpiEngine::new(
            tpi_config(),
            Box::new(tpi_link.clone()),
            Box::new(CountingRebooter::new()),
        );
        assert!(tpi.connect());
        tpi_link.clear_writes();

        let modem_link = modem_link(unread);
        let modem = ModemEngine::new(
            modem_config(),
            Box::new(modem_link.clone()),
            Box::new(CountingRebooter::new()),
        );

        let online = Rc::new(Cell::new(true));
        let probe = {
            let online = online.clone();
            move || online.get()
        };
        let agent = Agent::new(
            config,
            tpi,
            modem,
            None,
            Box::new(probe),
            Box::new(MemoryMetrics::default()),
        );
        Rig {
            agent,
            tpi: tpi_link,
            modem: modem_link,
            online,
        }
    }

    fn frames(&mut self, frames: &[&[u8]]) {
        for frame in frames {
            self.tpi.push_inbound(frame);
            self.agent.step(Utc::now());
        }
    }

    /// Recipients of every SMS submitted so far, in order.
    fn recipients(&self) -> Vec<String> {
        self.modem
            .written_text()
            .iter()
            .filter_map(|w| w.strip_prefix("AT+CMGS=\"")?.strip_suffix("\"\r").map(str::to_string))
            .collect()
    }

    fn sent(&self) -> usize {
        self.modem.writes().iter().filter(|w| w.as_slice() == CTRL_Z).count()
    }

    fn bodies(&self) -> Vec<String> {
        self.modem
            .written_text()
            .into_iter()
            .filter(|w| !w.starts_with("AT") && w.as_bytes() != CTRL_Z)
            .collect()
    }
}

// ─── Panel alerts ───────────────────────────────────────────────────────────

#[test]
fn fire_alert_goes_to_red_roster() {
    let mut rig = Rig::new(&config(""), None);
    rig.frames(&[FIRE_KEYPAD, b"%03,1131010030$"]);

    assert_eq!(rig.recipients(), vec!["+15550001111", "+15550002222"]);
    assert!(rig.bodies().iter().all(|b| b.ends_with(
        "FIRE, AC PRESENT ! Partition:01, New event:131 Perimeter, Zone:zone-3"
    )));
    assert_eq!(rig.agent.metrics().sms().count, 2);
}

#[test]
fn keypad_frames_alone_send_nothing() {
    let mut rig = Rig::new(&config(""), None);
    rig.frames(&[FIRE_KEYPAD, STAY_KEYPAD, FIRE_KEYPAD]);
    assert_eq!(rig.sent(), 0);
}

#[test]
fn repeated_contact_id_alerts_once() {
    let mut rig = Rig::new(&config(""), None);
    rig.frames(&[FIRE_KEYPAD, b"%03,1131010030$", b"%03,1131010030$"]);
    assert_eq!(rig.sent(), 2);
}

#[test]
fn yellow_alert_only_while_offline() {
    let mut rig = Rig::new(&config(""), None);
    rig.frames(&[STAY_KEYPAD, b"%03,3441010010$"]);
    assert_eq!(rig.sent(), 0);

    rig.online.set(false);
    rig.frames(&[b"%03,1441010010$"]);
    assert_eq!(rig.recipients(), vec!["+15550003333"]);
}

#[test]
fn suppressed_event_is_not_sent() {
    let mut rig = Rig::new(&config(""), None);
    rig.frames(&[FIRE_KEYPAD, b"%03,1602010010$"]);
    assert_eq!(rig.sent(), 0);
}

#[test]
fn exhausted_allowance_sends_nothing() {
    let mut cfg = config("");
    cfg.provider.allowance = 0;
    let mut rig = Rig::new(&cfg, None);
    rig.frames(&[FIRE_KEYPAD, b"%03,1131010030$"]);
    assert_eq!(rig.sent(), 0);
}

#[test]
fn sending_disabled_is_not_counted() {
    let cfg = config("");
    let tpi_link = tpi_link();
    let mut tpi = TpiEngine::new(
        tpi_config(),
        Box::new(tpi_link.clone()),
        Box::new(CountingRebooter::new()),
    );
    assert!(tpi.connect());
    let modem_link = modem_link(None);
    let modem = ModemEngine::new(
        ModemConfig {
            send_enabled: false,
            ..modem_config()
        },
        Box::new(modem_link.clone()),
        Box::new(CountingRebooter::new()),
    );
    let mut agent = Agent::new(
        &cfg,
        tpi,
        modem,
        None,
        Box::new(|| true),
        Box::new(MemoryMetrics::default()),
    );

    tpi_link.push_inbound(FIRE_KEYPAD);
    agent.step(Utc::now());
    tpi_link.push_inbound(b"%03,1131010030$");
    agent.step(Utc::now());

    assert_eq!(agent.metrics().sms().count, 0);
    assert!(!modem_link.writes().iter().any(|w| w.as_slice() == CTRL_Z));
}

// ─── Activation and timers ──────────────────────────────────────────────────

#[test]
fn activation_notice_goes_to_reboot_roster() {
    let mut rig = Rig::new(&config(""), None);
    assert_eq!(rig.agent.activate(), 1);
    assert_eq!(rig.recipients(), vec!["+15550004444"]);
    assert!(rig.bodies()[0].ends_with("Dual Path Monitoring activated"));
}

#[test]
fn timers_fire_on_first_step_only() {
    let mut rig = Rig::new(&config(""), None);
    let now = Utc::now();
    rig.agent.step(now);
    rig.agent.step(now + chrono::Duration::seconds(1));

    assert_eq!(rig.tpi.written_text(), vec!["^00,$", "^09,$"]);
    assert_eq!(rig.modem.written_text(), vec!["AT\r"]);

    rig.agent.step(now + chrono::Duration::seconds(180));
    assert_eq!(rig.tpi.written_text(), vec!["^00,$", "^09,$", "^09,$"]);
    assert_eq!(rig.modem.written_text(), vec!["AT\r", "AT\r"]);
}

// ─── Inbound SMS ────────────────────────────────────────────────────────────

fn listing(sender: &str, body: &str) -> String {
    format!(
        "\r\n+CMGL: 1,\"REC UNREAD\",\"{sender}\",\"\",\"24/03/05,14:22:10-20\"\r\n{body}\r\n\r\nOK\r\n"
    )
}

#[test]
fn status_request_is_answered() {
    let cfg = config("[modem]\ninbound_sms = true");
    let mut rig = Rig::new(&cfg, Some(listing("+15550005555", "Status?")));
    rig.frames(&[STAY_KEYPAD]);

    assert_eq!(rig.recipients(), vec!["+15550005555"]);
    assert!(rig.bodies()[0].ends_with(" ARMED STAY, AC PRESENT"));
    // one received, one sent
    assert_eq!(rig.agent.metrics().sms().count, 2);
}

#[test]
fn arm_request_sends_keystrokes() {
    let cfg = config("[modem]\ninbound_sms = true");
    let mut rig = Rig::new(&cfg, Some(listing("+15550005555", "arm two stay")));
    rig.agent.step(Utc::now());

    let keys = arm_keystrokes("+15550005555", ArmMode::Stay);
    assert!(rig.tpi.written_text().contains(&format!("^03,2,{keys}$")));
    assert_eq!(rig.sent(), 0);
    assert_eq!(rig.agent.metrics().sms().count, 1);
}

#[test]
fn requests_from_unknown_numbers_are_ignored() {
    let cfg = config("[modem]\ninbound_sms = true");
    let mut rig = Rig::new(&cfg, Some(listing("+19998887777", "arm")));
    rig.agent.step(Utc::now());

    assert!(!rig.tpi.written_text().iter().any(|w| w.starts_with("^03,")));
    assert_eq!(rig.agent.metrics().sms().count, 1);
}
