use rusqlite::{params, Connection, Result};
use std::path::Path;
use crate::detector::SignalEvent;
use crate::util::Timestamp;

pub struct SignalDatabase {
    conn: Connection,
    run_id: i64,
}

/// Row as stored in the `signals` table.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRow {
    pub timestamp: String,
    pub samples: i64,
    pub duration: f64,
    pub signal_freq: f64,
    pub signal_bw: f64,
    pub max_signal: f64,
    pub noise: f64,
    pub run: i64,
}

impl SignalDatabase {
    pub fn open<P: AsRef<Path>>(path: P, run_id: i64) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn, run_id };
        db.init()?;
        Ok(db)
    }

    pub fn open_in_memory(run_id: i64) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn, run_id };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS signals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                samples INTEGER NOT NULL,
                duration REAL NOT NULL,
                signal_freq REAL NOT NULL,
                signal_bw REAL NOT NULL,
                max_signal REAL NOT NULL,
                noise REAL NOT NULL,
                run INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    pub fn insert_event(&self, event: &SignalEvent) -> Result<()> {
        self.conn.execute(
            "INSERT INTO signals (timestamp, samples, duration, signal_freq, signal_bw, max_signal, noise, run)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                event.timestamp.format(),
                event.samples as i64,
                event.duration,
                event.frequency,
                event.bandwidth,
                event.max_signal as f64,
                event.noise as f64,
                self.run_id
            ],
        )?;
        Ok(())
    }

    /// Liveness row: timestamp only, all metrics zero.
    pub fn insert_heartbeat(&self, timestamp: &Timestamp) -> Result<()> {
        self.conn.execute(
            "INSERT INTO signals (timestamp, samples, duration, signal_freq, signal_bw, max_signal, noise, run)
             VALUES (?1, 0, 0.0, 0.0, 0.0, 0.0, 0.0, ?2)",
            params![timestamp.format(), self.run_id],
        )?;
        Ok(())
    }

    pub fn list_signals(&self) -> Result<Vec<SignalRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT timestamp, samples, duration, signal_freq, signal_bw, max_signal, noise, run
             FROM signals ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SignalRow {
                timestamp: row.get(0)?,
                samples: row.get(1)?,
                duration: row.get(2)?,
                signal_freq: row.get(3)?,
                signal_bw: row.get(4)?,
                max_signal: row.get(5)?,
                noise: row.get(6)?,
                run: row.get(7)?,
            })
        })?;

        let mut signals = Vec::new();
        for row in rows {
            signals.push(row?);
        }
        Ok(signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_list() {
        let db = SignalDatabase::open_in_memory(7).unwrap();
        let event = SignalEvent {
            timestamp: Timestamp::new(1_500_000_000, 250),
            samples: 6000,
            batch_transforms: 16,
            duration: 0.0096,
            frequency: -61250.0,
            bandwidth: 3125.0,
            max_signal: 115.0,
            noise: -3.5,
        };
        db.insert_event(&event).unwrap();
        db.insert_heartbeat(&Timestamp::new(1_500_000_300, 0)).unwrap();

        let rows = db.list_signals().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].timestamp, "2017-07-14 02:40:00.000000250");
        assert_eq!(rows[0].samples, 6000);
        assert_eq!(rows[0].signal_bw, 3125.0);
        assert_eq!(rows[0].noise, -3.5);
        assert_eq!(rows[0].run, 7);
        assert_eq!(rows[1].timestamp, "2017-07-14 02:45:00.000000000");
        assert_eq!(rows[1].samples, 0);
        assert_eq!(rows[1].max_signal, 0.0);
    }
}
