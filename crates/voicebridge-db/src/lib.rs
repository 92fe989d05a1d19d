//! Durable sink: a single background writer task persisting conversation
//! turns and per-request metrics to SQLite without ever blocking a
//! request on disk I/O, fed by an unbounded mpsc channel so callers
//! never wait on the writer.

mod error;
mod setup;
mod sink;

pub use error::DbError;
pub use setup::{setup_database, setup_test_database};
pub use sink::{DurableSink, WriteJob};
