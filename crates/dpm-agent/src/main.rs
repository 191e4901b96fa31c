//! Dual path monitoring agent.
//!
//! - `run` (default): bring up both links, announce activation and watch
//!   the panel until interrupted
//! - `startup`: one-shot housekeeping after a host boot
//! - `obscure`: print the obscured form of a password read from stdin

use std::fs::OpenOptions;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use dpm_agent::config::{Config, LoggingSettings, DEFAULT_CONFIG_PATH};
use dpm_agent::connectivity::PingProbe;
use dpm_agent::host::SudoHost;
use dpm_agent::logscan::LogScanner;
use dpm_agent::metrics::FileMetrics;
use dpm_agent::obscure::Obscurer;
use dpm_agent::startup::{clear_reboots, housekeeping, triage};
use dpm_agent::Agent;
use dpm_modem::{AtRebooter, ModemEngine, SerialLink};
use dpm_tpi::{HttpRebooter, TcpLink, TpiEngine};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dpm-agent", about = "Dual path monitoring agent", version)]
struct Cli {
    /// Configuration file.
    #[arg(long, short, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Run the monitoring loop.
    Run,
    /// Boot housekeeping: clock from the modem, soft reboots.
    Startup,
    /// Obscure a password read from stdin for use in the configuration.
    Obscure,
}

fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.level)
            .with_context(|| format!("invalid log level '{}'", settings.level))?,
    };

    match &settings.file {
        Some(pattern) => {
            let path = pattern.replace("%s", &Local::now().format("%Y%m%d%H%M%S").to_string());
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("opening log file {path}"))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    Ok(())
}

fn tpi_engine(config: &Config) -> TpiEngine {
    let t = &config.tpi;
    TpiEngine::new(
        t.engine_config(),
        Box::new(TcpLink::new(t.host.clone(), t.port, t.timeout)),
        Box::new(HttpRebooter::new(t.reboot_url.clone(), &t.password, t.timeout)),
    )
}

fn modem_engine(config: &Config) -> ModemEngine {
    let m = &config.modem;
    ModemEngine::new(
        m.engine_config(&config.sms),
        Box::new(SerialLink::new(m.comms_device.clone(), m.baud, m.timeout)),
        Box::new(AtRebooter::new(m.reboot_device.clone(), m.baud, m.timeout)),
    )
}

fn ping_probe(config: &Config) -> PingProbe {
    PingProbe::new(
        config.connectivity.ping_command.clone(),
        config.connectivity.hosts.clone(),
    )
}

fn run(config: &Config) -> anyhow::Result<i32> {
    let mut metrics = FileMetrics::open(config.metrics_path.clone())
        .context("opening metrics store")?;
    let mut tpi = tpi_engine(config);
    let mut modem = modem_engine(config);

    if !tpi.connect() || !modem.start() {
        tracing::error!("connectivity problem with modem or interface module");
        let outcome = triage(&config.host, &mut metrics, &mut SudoHost);
        return Ok(outcome.exit_code());
    }
    clear_reboots(&mut metrics);

    let scanner = config.syslog.enabled.then(|| {
        LogScanner::new(config.syslog.log_path.clone(), config.syslog.offset_path.clone())
    });
    let mut agent = Agent::new(
        config,
        tpi,
        modem,
        scanner,
        Box::new(ping_probe(config)),
        Box::new(metrics),
    );

    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    ctrlc::set_handler(move || {
        tracing::info!("termination requested, stopping");
        flag.store(true, Ordering::Relaxed);
    })
    .context("installing signal handler")?;

    agent.activate();
    agent.run(&stop);
    Ok(0)
}

fn startup(config: &Config) -> anyhow::Result<i32> {
    let mut metrics = FileMetrics::open(config.metrics_path.clone())
        .context("opening metrics store")?;
    let mut tpi = tpi_engine(config);
    let mut modem = modem_engine(config);
    let mut probe = ping_probe(config);

    let code = match housekeeping(
        config,
        &mut modem,
        &mut tpi,
        &mut probe,
        &mut metrics,
        &mut SudoHost,
    ) {
        Ok(()) => 0,
        Err(triage) => triage.exit_code(),
    };
    tracing::info!(code, "startup housekeeping finished");
    Ok(code)
}

fn obscure() -> anyhow::Result<i32> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']);
    let obscurer = Obscurer::from_host().context("deriving host key")?;
    println!("{}", obscurer.obscure(password)?);
    Ok(0)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Run);

    let code = if command == Command::Obscure {
        init_logging(&LoggingSettings::default())?;
        obscure()?
    } else {
        let config = Config::load(&cli.config)
            .with_context(|| format!("loading {}", cli.config.display()))?;
        init_logging(&config.logging)?;
        tracing::info!(config = %cli.config.display(), ?command, "dpm-agent starting");
        match command {
            Command::Startup => startup(&config)?,
            _ => run(&config)?,
        }
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
