pub mod bins;
pub mod engine;
pub mod event;
pub mod groups;
pub mod lifecycle;
pub mod template;

pub use engine::{DetectorConfig, Engine};
pub use event::{heartbeat_record, SignalEvent, RECORD_HEADER};
pub use groups::{Group, GroupMap};
