use serde::{Deserialize, Serialize};
use std::fmt;

use crate::util::Timestamp;

pub const RECORD_HEADER: &str = "timestamp;samples;duration;signal_freq;signal_bw;max_signal;noise";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub timestamp: Timestamp,
    /// Cumulative transform counter when the event was emitted.
    pub samples: u64,
    pub batch_transforms: u32,
    pub duration: f64,
    pub frequency: f64,
    pub bandwidth: f64,
    pub max_signal: f32,
    pub noise: f32,
}

impl fmt::Display for SignalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{};{:<10.6};{:9.6};{:9.6};{:.6};{:.6}",
            self.timestamp, self.samples, self.duration, self.frequency, self.bandwidth, self.max_signal, self.noise
        )
    }
}

pub fn heartbeat_record(timestamp: &Timestamp) -> String {
    format!("{};;;;;;", timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_layout() {
        let event = SignalEvent {
            timestamp: Timestamp::new(0, 1_000),
            samples: 5024,
            batch_transforms: 16,
            duration: 0.0096,
            frequency: -61250.0,
            bandwidth: 3125.0,
            max_signal: 115.0,
            noise: 0.0,
        };
        assert_eq!(
            event.to_string(),
            "1970-01-01 00:00:00.000001000;5024;0.009600  ;-61250.000000;3125.000000;115.000000;0.000000"
        );
        assert_eq!(event.to_string().split(';').count(), RECORD_HEADER.split(';').count());
    }

    #[test]
    fn test_heartbeat_has_empty_fields() {
        let record = heartbeat_record(&Timestamp::new(60, 0));
        assert_eq!(record, "1970-01-01 00:01:00.000000000;;;;;;");
        assert_eq!(record.split(';').count(), RECORD_HEADER.split(';').count());
    }
}
