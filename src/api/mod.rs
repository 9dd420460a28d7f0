pub mod sink;
pub mod db;
pub mod config;

pub use sink::{ConsoleSink, DatabaseSink, EventSink};
pub use db::SignalDatabase;
pub use config::RadioConfig;
