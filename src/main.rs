use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::path::Path;
use std::process;
use radiotrack::api::{ConsoleSink, DatabaseSink, RadioConfig};
use radiotrack::args::{Cli, InputSource};
use radiotrack::monitor::Monitor;
use radiotrack::source;
use radiotrack::util::Timestamp;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("Error: {:#}", e);
        process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<RadioConfig> {
    if let Some(path) = &cli.config {
        return RadioConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()));
    }
    match RadioConfig::default_path() {
        Some(path) if path.exists() => {
            info!("Loading configuration from {}", path.display());
            RadioConfig::load(&path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))
        }
        _ => Ok(RadioConfig::default()),
    }
}

fn open_database(path: &Path, run_id: i64) -> Result<DatabaseSink> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Could not create database directory {}", dir.display()))?;
    }
    DatabaseSink::open(path, run_id)
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let file_config = load_config(&cli)?;
    let settings = cli.to_settings(&file_config)?;

    let mut monitor = Monitor::new(settings.detector.clone(), Timestamp::now(), settings.keepalive_secs);
    monitor.add_sink(Box::new(ConsoleSink::new(std::io::stdout())));

    if let Some(path) = &settings.database {
        match open_database(path, settings.run_id) {
            Ok(sink) => {
                info!("Also sending data to database at {} (run {})", path.display(), settings.run_id);
                monitor.add_sink(Box::new(sink));
            }
            Err(e) => warn!("{:#}. Not writing to database.", e),
        }
    }

    info!(
        "Ignoring signals shorter than {} s and longer than {} s",
        settings.detector.lower_limit, settings.detector.upper_limit
    );
    info!("Will print timestamp every {} transforms", monitor.keepalive());

    let mut reader = match &settings.input {
        InputSource::File(path) => source::open_file(path)?,
        InputSource::Stdin => source::open_stdin(),
    };

    let summary = monitor.run(&mut reader)?;
    info!("Reported {} signals, {} keep-alive records", summary.events, summary.heartbeats);
    Ok(())
}
