use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::api::db::SignalDatabase;
use crate::detector::{heartbeat_record, SignalEvent, RECORD_HEADER};
use crate::util::Timestamp;

/// Downstream consumer of detector output.
pub trait EventSink {
    fn name(&self) -> &str;
    fn on_start(&mut self, _base: &Timestamp) -> Result<()> { Ok(()) }
    fn record_event(&mut self, event: &SignalEvent) -> Result<()>;
    fn record_heartbeat(&mut self, _timestamp: &Timestamp) -> Result<()> { Ok(()) }
}

/// Semicolon-delimited records written to any byte stream.
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EventSink for ConsoleSink<W> {
    fn name(&self) -> &str {
        "console"
    }

    fn on_start(&mut self, base: &Timestamp) -> Result<()> {
        writeln!(self.out, "{}", base)?;
        writeln!(self.out, "{}", RECORD_HEADER)?;
        self.out.flush()?;
        Ok(())
    }

    fn record_event(&mut self, event: &SignalEvent) -> Result<()> {
        writeln!(self.out, "{}", event)?;
        self.out.flush()?;
        Ok(())
    }

    fn record_heartbeat(&mut self, timestamp: &Timestamp) -> Result<()> {
        writeln!(self.out, "{}", heartbeat_record(timestamp))?;
        self.out.flush()?;
        Ok(())
    }
}

pub struct DatabaseSink {
    db: SignalDatabase,
}

impl DatabaseSink {
    pub fn open<P: AsRef<Path>>(path: P, run_id: i64) -> Result<Self> {
        let path = path.as_ref();
        let db = SignalDatabase::open(path, run_id)
            .with_context(|| format!("Failed to open signal database: {}", path.display()))?;
        Ok(Self { db })
    }

    pub fn from_database(db: SignalDatabase) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &SignalDatabase {
        &self.db
    }
}

impl EventSink for DatabaseSink {
    fn name(&self) -> &str {
        "database"
    }

    fn record_event(&mut self, event: &SignalEvent) -> Result<()> {
        self.db.insert_event(event).context("Error while writing to db")
    }

    fn record_heartbeat(&mut self, timestamp: &Timestamp) -> Result<()> {
        self.db.insert_heartbeat(timestamp).context("Error while writing heartbeat to db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> SignalEvent {
        SignalEvent {
            timestamp: Timestamp::new(0, 5),
            samples: 42,
            batch_transforms: 16,
            duration: 0.5,
            frequency: 1000.0,
            bandwidth: 625.0,
            max_signal: 90.5,
            noise: -12.25,
        }
    }

    #[test]
    fn test_console_output() {
        let mut sink = ConsoleSink::new(Vec::new());
        sink.on_start(&Timestamp::new(0, 0)).unwrap();
        sink.record_event(&event()).unwrap();
        sink.record_heartbeat(&Timestamp::new(300, 0)).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "1970-01-01 00:00:00.000000000");
        assert_eq!(lines[1], RECORD_HEADER);
        assert!(lines[2].starts_with("1970-01-01 00:00:00.000000005;42;0.500000  ;"));
        assert_eq!(lines[3], "1970-01-01 00:05:00.000000000;;;;;;");
    }

    #[test]
    fn test_database_sink() {
        let mut sink = DatabaseSink::from_database(SignalDatabase::open_in_memory(3).unwrap());
        sink.record_event(&event()).unwrap();
        sink.record_heartbeat(&Timestamp::new(300, 0)).unwrap();
        let rows = sink.database().list_signals().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].signal_freq, 1000.0);
        assert_eq!(rows[1].run, 3);
    }
}
