//! # Agent configuration
//!
//! `dpm.toml` is read into `*Input` structs where every field is optional,
//! then resolved into the typed settings the rest of the agent works with.
//! Nothing downstream ever looks at raw configuration text.
//!
//! ```toml
//! [tpi]
//! host = "192.168.1.1"
//! password = "'1b0c5d...'"   # quoted values are obscured, see `dpm-agent obscure`
//!
//! [phones]
//! red = ["613-555-1234", "+44 7700 900123"]
//!
//! [panel]
//! urgent_tokens = ["FIRE", "ALARM"]
//! ```

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dpm_common::cid::{CidDecoder, Verbosity};
use dpm_modem::ModemConfig;
use dpm_tpi::TpiConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::classify::AlertLevel;
use crate::obscure::{self, ObscureError};

pub const DEFAULT_CONFIG_PATH: &str = "dpm.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("cannot reveal obscured password: {0}")]
    Obscured(#[from] ObscureError),
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

// ─── Input (as written in the file) ─────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigInput {
    pub tpi: TpiInput,
    pub modem: ModemInput,
    pub sms: SmsInput,
    pub provider: ProviderInput,
    pub phones: PhonesInput,
    pub panel: PanelInput,
    pub syslog: SyslogInput,
    pub connectivity: ConnectivityInput,
    pub host: HostInput,
    pub logging: LoggingInput,
    pub metrics: MetricsInput,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TpiInput {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub password: Option<String>,
    pub timeout_secs: Option<u64>,
    pub retries: Option<u32>,
    pub retry_delay_secs: Option<u64>,
    pub reboot_url: Option<String>,
    pub reboot_settle_secs: Option<u64>,
    pub poll_mins: Option<u64>,
    pub keepalive_secs: Option<u64>,
    pub soft_reboot: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModemInput {
    pub comms_device: Option<String>,
    pub reboot_device: Option<String>,
    pub baud: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub retries: Option<u32>,
    pub retry_delay_secs: Option<u64>,
    pub boot_wait_secs: Option<u64>,
    pub check_in_secs: Option<u64>,
    pub inbound_sms: Option<bool>,
    pub soft_reboot: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SmsInput {
    pub send: Option<bool>,
    pub max_size: Option<usize>,
    pub duplicate_window_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderInput {
    pub renewal_day: Option<u32>,
    pub allowance: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PhonesInput {
    pub red: Vec<String>,
    pub yellow: Vec<String>,
    pub reboot: Vec<String>,
    pub inbound: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PanelInput {
    pub verbosity: Option<String>,
    pub users: BTreeMap<String, String>,
    pub zones: BTreeMap<String, String>,
    pub ignore_tokens: Vec<String>,
    pub suppress_tokens: Vec<String>,
    pub urgent_tokens: Vec<String>,
    pub important_tokens: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SyslogInput {
    pub enabled: Option<bool>,
    pub log_path: Option<PathBuf>,
    pub offset_path: Option<PathBuf>,
    pub recent_secs: Option<u64>,
    pub adjacent_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConnectivityInput {
    pub ping_command: Option<Vec<String>>,
    pub hosts: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HostInput {
    pub reboot_allowed: Option<bool>,
    pub max_reboots: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingInput {
    pub level: Option<String>,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetricsInput {
    pub path: Option<PathBuf>,
}

// ─── Resolved settings ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TpiSettings {
    pub host: String,
    pub port: u16,
    pub password: String,
    pub timeout: Duration,
    pub retries: u32,
    pub retry_delay: Duration,
    pub reboot_url: String,
    pub reboot_settle: Duration,
    pub poll_interval: Duration,
    pub keepalive_interval: Duration,
    /// Reboot the interface module from `dpm-agent startup`.
    pub soft_reboot: bool,
}

impl Default for TpiSettings {
    fn default() -> Self {
        let engine = TpiConfig::default();
        Self {
            host: "192.168.1.1".into(),
            port: 4025,
            password: String::new(),
            timeout: engine.timeout,
            retries: engine.retries,
            retry_delay: engine.retry_delay,
            reboot_url: "http://192.168.1.2/3?A=2".into(),
            reboot_settle: engine.reboot_settle,
            poll_interval: Duration::from_secs(17 * 60),
            keepalive_interval: Duration::from_secs(179),
            soft_reboot: true,
        }
    }
}

impl TpiSettings {
    pub fn engine_config(&self) -> TpiConfig {
        TpiConfig {
            password: self.password.clone(),
            timeout: self.timeout,
            retries: self.retries,
            retry_delay: self.retry_delay,
            reboot_settle: self.reboot_settle,
            ..TpiConfig::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModemSettings {
    pub comms_device: String,
    pub reboot_device: String,
    pub baud: u32,
    pub timeout: Duration,
    pub retries: u32,
    pub retry_delay: Duration,
    pub boot_wait: Duration,
    pub check_in_interval: Duration,
    pub inbound_sms: bool,
    /// Reboot the modem from `dpm-agent startup`.
    pub soft_reboot: bool,
}

impl Default for ModemSettings {
    fn default() -> Self {
        let engine = ModemConfig::default();
        Self {
            comms_device: "/dev/ttyUSB2".into(),
            reboot_device: "/dev/ttyUSB3".into(),
            baud: 9600,
            timeout: engine.timeout,
            retries: engine.retries,
            retry_delay: engine.retry_delay,
            boot_wait: engine.boot_wait,
            check_in_interval: Duration::from_secs(61),
            inbound_sms: false,
            soft_reboot: true,
        }
    }
}

impl ModemSettings {
    pub fn engine_config(&self, sms: &SmsSettings) -> ModemConfig {
        ModemConfig {
            timeout: self.timeout,
            retries: self.retries,
            retry_delay: self.retry_delay,
            boot_wait: self.boot_wait,
            send_enabled: sms.send,
            duplicate_window: sms.duplicate_window,
            ..ModemConfig::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmsSettings {
    pub send: bool,
    /// Single-SMS payload limit; 160 for the 7-bit GSM alphabet.
    pub max_size: usize,
    pub duplicate_window: Duration,
}

impl Default for SmsSettings {
    fn default() -> Self {
        Self {
            send: true,
            max_size: 160,
            duplicate_window: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderSettings {
    /// Day of month the SMS allowance renews, 1 to 31.
    pub renewal_day: u32,
    pub allowance: u32,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            renewal_day: 15,
            allowance: 0,
        }
    }
}

/// Normalised recipients per alert category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneRosters {
    pub red: Vec<String>,
    pub yellow: Vec<String>,
    pub reboot: Vec<String>,
    pub inbound: Vec<String>,
}

impl PhoneRosters {
    pub fn for_level(&self, level: AlertLevel) -> &[String] {
        match level {
            AlertLevel::Red => &self.red,
            AlertLevel::Yellow => &self.yellow,
            AlertLevel::Reboot => &self.reboot,
        }
    }

    /// Mean roster size over the four categories.
    pub fn average(&self) -> f64 {
        let total = self.red.len() + self.yellow.len() + self.reboot.len() + self.inbound.len();
        total as f64 / 4.0
    }

    /// The configured inbound number a sender belongs to, matched by
    /// containment so a national-format sender matches an international
    /// entry.
    pub fn inbound_sender(&self, sender: &str) -> Option<&str> {
        let sender = sender.trim();
        if sender.is_empty() {
            return None;
        }
        self.inbound
            .iter()
            .find(|configured| configured.contains(sender))
            .map(String::as_str)
    }
}

/// Strip spaces and dashes; keep a leading `+`. `None` if anything but
/// digits remains.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '+'))
        .collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if raw.contains('+') {
        Some(format!("+{digits}"))
    } else {
        Some(digits)
    }
}

fn roster(category: &str, raw: Vec<String>) -> Vec<String> {
    raw.into_iter()
        .filter_map(|entry| {
            let phone = normalize_phone(&entry);
            if phone.is_none() {
                warn!(category, phone = %entry, "invalid phone number dropped");
            }
            phone
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct PanelSettings {
    pub verbosity: Verbosity,
    pub users: BTreeMap<String, String>,
    pub zones: BTreeMap<String, String>,
    /// Removed from the keypad text before an alert is sent.
    pub ignore_tokens: Vec<String>,
    /// Any of these in the decoded code silences the alert.
    pub suppress_tokens: Vec<String>,
    pub urgent_tokens: Vec<String>,
    pub important_tokens: Vec<String>,
}

impl PanelSettings {
    pub fn decoder(&self) -> CidDecoder {
        let mut decoder = CidDecoder::new(self.verbosity);
        if !self.users.is_empty() {
            decoder = decoder.with_users(self.users.clone());
        }
        if !self.zones.is_empty() {
            decoder = decoder.with_zones(self.zones.clone());
        }
        decoder
    }
}

#[derive(Debug, Clone)]
pub struct SyslogSettings {
    pub enabled: bool,
    pub log_path: PathBuf,
    pub offset_path: PathBuf,
    /// Maximum age of a log entry still worth alerting on.
    pub recent: Duration,
    /// Maximum gap between the two channels' reports of one event.
    pub adjacent: Duration,
}

impl Default for SyslogSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: PathBuf::from("/var/log/EVL4.log"),
            offset_path: PathBuf::from("EVL4.log.offset"),
            recent: Duration::from_secs(120),
            adjacent: Duration::from_secs(90),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivitySettings {
    /// Program and arguments; the host is appended.
    pub ping_command: Vec<String>,
    pub hosts: Vec<String>,
}

impl Default for ConnectivitySettings {
    fn default() -> Self {
        Self {
            ping_command: ["ping", "-c", "1", "-W", "3"].map(String::from).to_vec(),
            hosts: [
                "google.com",
                "amazon.com",
                "yahoo.com",
                "facebook.com",
                "youtube.com",
                "reddit.com",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostSettings {
    pub reboot_allowed: bool,
    pub max_reboots: u32,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            reboot_allowed: true,
            max_reboots: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Log file; `%s` is replaced by the start time.
    pub file: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub tpi: TpiSettings,
    pub modem: ModemSettings,
    pub sms: SmsSettings,
    pub provider: ProviderSettings,
    pub phones: PhoneRosters,
    pub panel: PanelSettings,
    pub syslog: SyslogSettings,
    pub connectivity: ConnectivitySettings,
    pub host: HostSettings,
    pub logging: LoggingSettings,
    pub metrics_path: PathBuf,
}

fn secs(value: Option<u64>, default: Duration) -> Duration {
    value.map(Duration::from_secs).unwrap_or(default)
}

fn non_empty(value: Option<String>, default: String) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => default,
    }
}

impl ConfigInput {
    pub fn resolve(self) -> Result<Config, ConfigError> {
        self.resolve_with(obscure::reveal)
    }

    /// Resolve with a custom reveal for obscured passwords.
    pub fn resolve_with<F>(self, reveal: F) -> Result<Config, ConfigError>
    where
        F: FnOnce(&str) -> Result<String, ObscureError>,
    {
        let t = TpiSettings::default();
        let password = self.tpi.password.unwrap_or_default();
        let password = if obscure::is_obscured(&password) {
            reveal(&password)?
        } else {
            password
        };
        let tpi = TpiSettings {
            host: non_empty(self.tpi.host, t.host),
            port: self.tpi.port.unwrap_or(t.port),
            password,
            timeout: secs(self.tpi.timeout_secs, t.timeout),
            retries: self.tpi.retries.unwrap_or(t.retries).max(1),
            retry_delay: secs(self.tpi.retry_delay_secs, t.retry_delay),
            reboot_url: non_empty(self.tpi.reboot_url, t.reboot_url),
            reboot_settle: secs(self.tpi.reboot_settle_secs, t.reboot_settle),
            poll_interval: self
                .tpi
                .poll_mins
                .map(|m| Duration::from_secs(m * 60))
                .unwrap_or(t.poll_interval),
            keepalive_interval: secs(self.tpi.keepalive_secs, t.keepalive_interval),
            soft_reboot: self.tpi.soft_reboot.unwrap_or(t.soft_reboot),
        };

        let m = ModemSettings::default();
        let modem = ModemSettings {
            comms_device: non_empty(self.modem.comms_device, m.comms_device),
            reboot_device: non_empty(self.modem.reboot_device, m.reboot_device),
            baud: self.modem.baud.unwrap_or(m.baud),
            timeout: secs(self.modem.timeout_secs, m.timeout),
            retries: self.modem.retries.unwrap_or(m.retries).max(1),
            retry_delay: secs(self.modem.retry_delay_secs, m.retry_delay),
            boot_wait: secs(self.modem.boot_wait_secs, m.boot_wait),
            check_in_interval: secs(self.modem.check_in_secs, m.check_in_interval),
            inbound_sms: self.modem.inbound_sms.unwrap_or(m.inbound_sms),
            soft_reboot: self.modem.soft_reboot.unwrap_or(m.soft_reboot),
        };

        let s = SmsSettings::default();
        let sms = SmsSettings {
            send: self.sms.send.unwrap_or(s.send),
            max_size: self.sms.max_size.unwrap_or(s.max_size),
            duplicate_window: secs(self.sms.duplicate_window_secs, s.duplicate_window),
        };
        if sms.max_size <= crate::alert::TIMESTAMP_PREFIX_LEN {
            return Err(invalid(
                "sms.max_size",
                format!("{} leaves no room for the timestamp prefix", sms.max_size),
            ));
        }

        let p = ProviderSettings::default();
        let provider = ProviderSettings {
            renewal_day: self.provider.renewal_day.unwrap_or(p.renewal_day),
            allowance: self.provider.allowance.unwrap_or(p.allowance),
        };
        if !(1..=31).contains(&provider.renewal_day) {
            return Err(invalid(
                "provider.renewal_day",
                format!("{} is not a day of the month", provider.renewal_day),
            ));
        }

        let phones = PhoneRosters {
            red: roster("red", self.phones.red),
            yellow: roster("yellow", self.phones.yellow),
            reboot: roster("reboot", self.phones.reboot),
            inbound: roster("inbound", self.phones.inbound),
        };

        let verbosity = match self.panel.verbosity {
            Some(v) => v
                .parse::<Verbosity>()
                .map_err(|reason| invalid("panel.verbosity", reason))?,
            None => Verbosity::default(),
        };
        let panel = PanelSettings {
            verbosity,
            users: self.panel.users,
            zones: self.panel.zones,
            ignore_tokens: tokens(self.panel.ignore_tokens),
            suppress_tokens: tokens(self.panel.suppress_tokens),
            urgent_tokens: tokens(self.panel.urgent_tokens),
            important_tokens: tokens(self.panel.important_tokens),
        };

        let l = SyslogSettings::default();
        let syslog = SyslogSettings {
            enabled: self.syslog.enabled.unwrap_or(l.enabled),
            log_path: self.syslog.log_path.unwrap_or(l.log_path),
            offset_path: self.syslog.offset_path.unwrap_or(l.offset_path),
            recent: secs(self.syslog.recent_secs, l.recent),
            adjacent: secs(self.syslog.adjacent_secs, l.adjacent),
        };

        let c = ConnectivitySettings::default();
        let connectivity = ConnectivitySettings {
            ping_command: self
                .connectivity
                .ping_command
                .filter(|cmd| !cmd.is_empty())
                .unwrap_or(c.ping_command),
            hosts: self
                .connectivity
                .hosts
                .filter(|hosts| !hosts.is_empty())
                .unwrap_or(c.hosts),
        };

        let h = HostSettings::default();
        let host = HostSettings {
            reboot_allowed: self.host.reboot_allowed.unwrap_or(h.reboot_allowed),
            max_reboots: self.host.max_reboots.unwrap_or(h.max_reboots),
        };

        let g = LoggingSettings::default();
        let logging = LoggingSettings {
            level: non_empty(self.logging.level, g.level),
            file: self.logging.file.filter(|f| !f.trim().is_empty()),
        };

        Ok(Config {
            tpi,
            modem,
            sms,
            provider,
            phones,
            panel,
            syslog,
            connectivity,
            host,
            logging,
            metrics_path: self
                .metrics
                .path
                .unwrap_or_else(|| PathBuf::from("dpm-metrics.toml")),
        })
    }
}

fn tokens(raw: Vec<String>) -> Vec<String> {
    raw.into_iter().filter(|t| !t.is_empty()).collect()
}

impl Config {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        if input.trim().is_empty() {
            return ConfigInput::default().resolve();
        }
        let parsed: ConfigInput = toml::from_str(input)?;
        parsed.resolve()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obscure::Obscurer;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = Config::from_toml_str("").unwrap();
        assert_eq!(cfg.tpi.port, 4025);
        assert_eq!(cfg.tpi.poll_interval, Duration::from_secs(17 * 60));
        assert_eq!(cfg.tpi.keepalive_interval, Duration::from_secs(179));
        assert_eq!(cfg.modem.check_in_interval, Duration::from_secs(61));
        assert_eq!(cfg.modem.baud, 9600);
        assert_eq!(cfg.sms.max_size, 160);
        assert_eq!(cfg.provider, ProviderSettings::default());
        assert_eq!(cfg.syslog.recent, Duration::from_secs(120));
        assert_eq!(cfg.syslog.adjacent, Duration::from_secs(90));
        assert_eq!(cfg.host.max_reboots, 2);
        assert_eq!(cfg.connectivity.hosts.len(), 6);
        assert_eq!(cfg.metrics_path, PathBuf::from("dpm-metrics.toml"));
        assert!(cfg.phones.red.is_empty());
    }

    #[test]
    fn parse_toml_config_basic() {
        let toml = r#"
            [tpi]
            host = "10.0.0.9"
            password = "secret99"
            poll_mins = 5

            [modem]
            comms_device = "/dev/ttyACM0"
            inbound_sms = true

            [provider]
            renewal_day = 3
            allowance = 250

            [phones]
            red = ["613-555-1234", "+44 7700 900123"]
            inbound = ["6135551234"]

            [panel]
            verbosity = "terse"
            urgent_tokens = ["FIRE"]

            [syslog]
            enabled = true
            recent_secs = 60
        "#;
        let cfg = Config::from_toml_str(toml).unwrap();
        assert_eq!(cfg.tpi.host, "10.0.0.9");
        assert_eq!(cfg.tpi.password, "secret99");
        assert_eq!(cfg.tpi.poll_interval, Duration::from_secs(300));
        assert_eq!(cfg.modem.comms_device, "/dev/ttyACM0");
        assert!(cfg.modem.inbound_sms);
        assert_eq!(cfg.provider.renewal_day, 3);
        assert_eq!(cfg.provider.allowance, 250);
        assert_eq!(cfg.phones.red, vec!["6135551234", "+447700900123"]);
        assert_eq!(cfg.panel.verbosity, Verbosity::Terse);
        assert_eq!(cfg.panel.urgent_tokens, vec!["FIRE"]);
        assert!(cfg.syslog.enabled);
        assert_eq!(cfg.syslog.recent, Duration::from_secs(60));
        assert_eq!(cfg.syslog.adjacent, Duration::from_secs(90));
    }

    #[test]
    fn engine_configs_carry_settings() {
        let cfg = Config::from_toml_str(
            r#"
            [tpi]
            password = "pw"
            retries = 3
            [sms]
            send = false
            duplicate_window_secs = 120
            "#,
        )
        .unwrap();
        let tpi = cfg.tpi.engine_config();
        assert_eq!(tpi.password, "pw");
        assert_eq!(tpi.retries, 3);
        let modem = cfg.modem.engine_config(&cfg.sms);
        assert!(!modem.send_enabled);
        assert_eq!(modem.duplicate_window, Duration::from_secs(120));
    }

    // ─── Phones ─────────────────────────────────────────────────────────

    #[test]
    fn phone_normalisation() {
        assert_eq!(normalize_phone("613-555 1234").as_deref(), Some("6135551234"));
        assert_eq!(normalize_phone("+1 613 555 1234").as_deref(), Some("+16135551234"));
        assert_eq!(normalize_phone("613.555.1234"), None);
        assert_eq!(normalize_phone("call me"), None);
        assert_eq!(normalize_phone(" - "), None);
    }

    #[test]
    fn invalid_phones_are_dropped() {
        let cfg = Config::from_toml_str(
            r#"
            [phones]
            yellow = ["555-0100", "not a phone", "+1 555 0199"]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.phones.yellow, vec!["5550100", "+15550199"]);
    }

    #[test]
    fn roster_average_and_levels() {
        let rosters = PhoneRosters {
            red: vec!["1".into(), "2".into()],
            yellow: vec!["1".into()],
            reboot: vec!["1".into()],
            inbound: vec![],
        };
        assert_eq!(rosters.average(), 1.0);
        assert_eq!(rosters.for_level(AlertLevel::Red).len(), 2);
        assert!(PhoneRosters::default().average() == 0.0);
    }

    #[test]
    fn inbound_sender_matches_by_containment() {
        let rosters = PhoneRosters {
            inbound: vec!["+16135551234".into(), "4165550000".into()],
            ..PhoneRosters::default()
        };
        assert_eq!(rosters.inbound_sender("6135551234"), Some("+16135551234"));
        assert_eq!(rosters.inbound_sender("4165550000"), Some("4165550000"));
        assert_eq!(rosters.inbound_sender("9995550000"), None);
        assert_eq!(rosters.inbound_sender(""), None);
    }

    // ─── Validation ─────────────────────────────────────────────────────

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Config::from_toml_str("[provider]\nrenewal_day = 0"),
            Err(ConfigError::Invalid { field: "provider.renewal_day", .. })
        ));
        assert!(matches!(
            Config::from_toml_str("[panel]\nverbosity = \"chatty\""),
            Err(ConfigError::Invalid { field: "panel.verbosity", .. })
        ));
        assert!(matches!(
            Config::from_toml_str("[sms]\nmax_size = 20"),
            Err(ConfigError::Invalid { field: "sms.max_size", .. })
        ));
        assert!(matches!(
            Config::from_toml_str("[tpi\nport = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn obscured_password_is_revealed() {
        let obscurer = Obscurer::new("00000000abcd1234").unwrap();
        let stored = obscurer.obscure("hunter2hunter2").unwrap();
        let input: ConfigInput =
            toml::from_str(&format!("[tpi]\npassword = \"{stored}\"")).unwrap();
        let cfg = input.resolve_with(|s| obscurer.reveal(s)).unwrap();
        assert_eq!(cfg.tpi.password, "hunter2hunter2");
    }
}
