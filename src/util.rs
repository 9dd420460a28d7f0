use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

pub const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Absolute or relative point in time kept as whole seconds plus nanoseconds.
/// Repeated additions never drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    pub secs: i64,
    pub nanos: u32,
}

impl Timestamp {
    pub fn new(secs: i64, nanos: u32) -> Self {
        Self {
            secs: secs + (nanos / NANOS_PER_SEC) as i64,
            nanos: nanos % NANOS_PER_SEC,
        }
    }

    pub fn now() -> Self {
        let now = Utc::now();
        Self::new(now.timestamp(), now.timestamp_subsec_nanos())
    }

    pub fn from_transforms(index: u64, samples_per_frame: u32, sampling_rate: u32) -> Self {
        let rate = sampling_rate.max(1) as u128;
        let samples = index as u128 * samples_per_frame as u128;
        let secs = samples / rate;
        let nanos = (samples % rate) * NANOS_PER_SEC as u128 / rate;
        Self::new(secs as i64, nanos as u32)
    }

    pub fn format(&self) -> String {
        match DateTime::<Utc>::from_timestamp(self.secs, 0) {
            Some(dt) => format!("{}.{:09}", dt.format("%Y-%m-%d %H:%M:%S"), self.nanos),
            None => format!("{}.{:09}", self.secs, self.nanos),
        }
    }
}

impl Add for Timestamp {
    type Output = Timestamp;

    fn add(self, other: Timestamp) -> Timestamp {
        let mut secs = self.secs + other.secs;
        let mut nanos = self.nanos + other.nanos;
        if nanos >= NANOS_PER_SEC {
            nanos -= NANOS_PER_SEC;
            secs += 1;
        }
        Timestamp { secs, nanos }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

/// `frame_span` counts PSD frames, each averaging `batch_transforms` transforms.
pub fn transforms_to_seconds(
    batch_transforms: u32,
    frame_span: u32,
    samples_per_frame: u32,
    sampling_rate: u32,
) -> f64 {
    batch_transforms as f64 * frame_span as f64 * samples_per_frame as f64 / sampling_rate as f64
}

pub fn bins_to_hz(width: usize, nfft: usize, sampling_rate: u32) -> f64 {
    width as f64 * sampling_rate as f64 / nfft as f64
}

pub fn normalized_to_hz(freq: f64, sampling_rate: u32) -> f64 {
    freq * sampling_rate as f64
}

pub fn rate_parser(s: &str) -> Result<u32, String> {
    s.trim()
        .parse::<u32>()
        .map_err(|e| format!("Invalid value '{}': {}", s, e))
        .and_then(|v| {
            if v == 0 {
                Err("Value must be greater than zero".to_string())
            } else {
                Ok(v)
            }
        })
}

pub fn bins_parser(s: &str) -> Result<usize, String> {
    s.trim()
        .parse::<usize>()
        .map_err(|e| format!("Invalid bin count '{}': {}", s, e))
        .and_then(|v| {
            if v < 2 {
                Err(format!("Bin count must be at least 2, got {}", v))
            } else {
                Ok(v)
            }
        })
}

pub fn seconds_parser(s: &str) -> Result<f64, String> {
    s.trim()
        .parse::<f64>()
        .map_err(|e| format!("Invalid duration '{}': {}", s, e))
        .and_then(|v| {
            if v.is_finite() && v >= 0.0 {
                Ok(v)
            } else {
                Err(format!("Duration must be a non-negative number, got {}", v))
            }
        })
}
