//! Local structured store: a single SQLite table of event records keyed by id

pub mod events;
pub mod init;

pub use events::{EventStorage, SqliteEventStore};
pub use init::*;
