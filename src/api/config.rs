use knuffel::Decode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const CONFIG_FILE: &str = "radiotrack.kdl";

/// Settings read from a KDL file, e.g.
///
/// ```kdl
/// detector threshold=10.0 sampling-rate=250000 nfft=400 samples-per-frame=50
/// limits lower=0.0 upper=1.0
/// heartbeat keepalive=300
/// database enabled=true path="/var/lib/radiotrack/signals.db" run-id=12
/// ```
#[derive(Decode, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RadioConfig {
    #[knuffel(child)]
    pub detector: Option<DetectorSection>,
    #[knuffel(child)]
    pub limits: Option<LimitsSection>,
    #[knuffel(child)]
    pub heartbeat: Option<HeartbeatSection>,
    #[knuffel(child)]
    pub database: Option<DatabaseSection>,
}

#[derive(Decode, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectorSection {
    #[knuffel(property)]
    pub threshold: Option<f32>,
    #[knuffel(property)]
    pub sampling_rate: Option<u32>,
    #[knuffel(property)]
    pub nfft: Option<usize>,
    #[knuffel(property)]
    pub samples_per_frame: Option<u32>,
}

#[derive(Decode, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LimitsSection {
    #[knuffel(property)]
    pub lower: Option<f64>,
    #[knuffel(property)]
    pub upper: Option<f64>,
}

#[derive(Decode, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatSection {
    #[knuffel(property)]
    pub keepalive: Option<u64>,
}

#[derive(Decode, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSection {
    #[knuffel(property)]
    pub enabled: Option<bool>,
    #[knuffel(property)]
    pub path: Option<String>,
    #[knuffel(property)]
    pub run_id: Option<i64>,
}

impl RadioConfig {
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config = knuffel::parse(CONFIG_FILE, content)?;
        Ok(config)
    }

    /// Location of the per-user configuration file, if it can be determined.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("org", "radiotrack", "radiotrack")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Default SQLite file inside the per-user data directory.
    pub fn default_database_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("org", "radiotrack", "radiotrack")
            .map(|dirs| dirs.data_dir().join("signals.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let config = RadioConfig::parse(
            r#"
            detector threshold=12.5 sampling-rate=1000000 nfft=512 samples-per-frame=100
            limits lower=0.01 upper=2.0
            heartbeat keepalive=60
            database enabled=true path="signals.db" run-id=4
            "#,
        )
        .unwrap();

        let detector = config.detector.unwrap();
        assert_eq!(detector.threshold, Some(12.5));
        assert_eq!(detector.sampling_rate, Some(1_000_000));
        assert_eq!(detector.nfft, Some(512));
        assert_eq!(detector.samples_per_frame, Some(100));
        assert_eq!(config.limits.unwrap().upper, Some(2.0));
        assert_eq!(config.heartbeat.unwrap().keepalive, Some(60));
        let database = config.database.unwrap();
        assert_eq!(database.enabled, Some(true));
        assert_eq!(database.path.as_deref(), Some("signals.db"));
        assert_eq!(database.run_id, Some(4));
    }

    #[test]
    fn test_parse_partial() {
        let config = RadioConfig::parse("detector threshold=6.0").unwrap();
        assert_eq!(config.detector.unwrap().nfft, None);
        assert!(config.limits.is_none());
        assert!(config.database.is_none());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(RadioConfig::parse("detector threshold=\"loud\"").is_err());
    }
}
