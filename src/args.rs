use crate::api::RadioConfig;
use crate::detector::DetectorConfig;
use crate::util::{bins_parser, rate_parser, seconds_parser};
use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_KEEPALIVE_SECS: u64 = 300;

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Detect signals within captured rtl-sdr sample streams.")]
pub struct Cli {
    /// Input data file with interleaved 8-bit I/Q samples
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    /// Use STDIN as input
    #[arg(short = 's', long = "stdin", conflicts_with = "input")]
    pub stdin: bool,
    /// Configuration file (KDL)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Detection threshold above the noise template in dB [default: 10]
    #[arg(short = 't', long = "threshold", allow_negative_numbers = true)]
    pub threshold: Option<f32>,
    /// Sampling rate in Hz [default: 250000]
    #[arg(short = 'r', long = "rate", value_parser = rate_parser)]
    pub rate: Option<u32>,
    /// Number of bins used for the FFT [default: 400]
    #[arg(short = 'b', long = "bins", value_parser = bins_parser)]
    pub bins: Option<usize>,
    /// Number of samples per FFT [default: 50]
    #[arg(short = 'n', long = "step", value_parser = rate_parser)]
    pub step: Option<u32>,
    /// Print a keep-alive record every <KEEPALIVE> seconds [default: 300]
    #[arg(short = 'k', long = "keepalive", value_parser = clap::value_parser!(u64).range(1..))]
    pub keepalive: Option<u64>,
    /// Shortest signal duration in seconds that is logged [default: 0]
    #[arg(long = "ll", value_parser = seconds_parser)]
    pub lower_limit: Option<f64>,
    /// Longest signal duration in seconds that is logged [default: 1]
    #[arg(long = "lu", value_parser = seconds_parser)]
    pub upper_limit: Option<f64>,
    /// Write detections to the SQLite database
    #[arg(long = "sql")]
    pub sql: bool,
    /// Database file [default: per-user data directory]
    #[arg(long = "db-path")]
    pub db_path: Option<PathBuf>,
    /// Numeric id of this recording run, links rows to run metadata
    #[arg(long = "db-run-id")]
    pub db_run_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    File(PathBuf),
    Stdin,
}

/// Everything the monitor needs, after merging defaults, file and flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub input: InputSource,
    pub detector: DetectorConfig,
    pub keepalive_secs: u64,
    /// `None` when persistence is disabled.
    pub database: Option<PathBuf>,
    pub run_id: i64,
}

impl Cli {
    /// Merges command-line flags over the file configuration over defaults.
    pub fn to_settings(&self, file: &RadioConfig) -> anyhow::Result<Settings> {
        let input = if self.stdin {
            InputSource::Stdin
        } else if let Some(path) = &self.input {
            InputSource::File(path.clone())
        } else {
            anyhow::bail!("No input given, use --input <FILE> or --stdin");
        };

        let section = file.detector.clone().unwrap_or_default();
        let limits = file.limits.clone().unwrap_or_default();
        let defaults = DetectorConfig::default();

        let detector = DetectorConfig {
            nfft: self.bins.or(section.nfft).unwrap_or(defaults.nfft),
            samples_per_frame: self
                .step
                .or(section.samples_per_frame)
                .unwrap_or(defaults.samples_per_frame),
            sampling_rate: self
                .rate
                .or(section.sampling_rate)
                .unwrap_or(defaults.sampling_rate),
            threshold: self.threshold.or(section.threshold).unwrap_or(defaults.threshold),
            lower_limit: self.lower_limit.or(limits.lower).unwrap_or(defaults.lower_limit),
            upper_limit: self.upper_limit.or(limits.upper).unwrap_or(defaults.upper_limit),
        };
        if detector.nfft < 2 || detector.samples_per_frame == 0 || detector.sampling_rate == 0 {
            anyhow::bail!(
                "Invalid detector configuration: nfft={} samples_per_frame={} sampling_rate={}",
                detector.nfft,
                detector.samples_per_frame,
                detector.sampling_rate
            );
        }

        let keepalive_secs = self
            .keepalive
            .or(file.heartbeat.as_ref().and_then(|h| h.keepalive))
            .unwrap_or(DEFAULT_KEEPALIVE_SECS)
            .max(1);

        let db = file.database.clone().unwrap_or_default();
        let wants_db = self.sql || db.enabled.unwrap_or(false);
        let database = if wants_db {
            self.db_path
                .clone()
                .or(db.path.map(PathBuf::from))
                .or_else(RadioConfig::default_database_path)
        } else {
            None
        };
        if wants_db && database.is_none() {
            log::warn!("No database location available. Not writing to database.");
        }

        Ok(Settings {
            input,
            detector,
            keepalive_secs,
            database,
            run_id: self.db_run_id.or(db.run_id).unwrap_or(0),
        })
    }
}
