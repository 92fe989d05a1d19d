//! File-backed session key counter plus in-memory conversation history.
//!
//! A single ASCII integer counter file, formatted as `<prefix>-<n>`,
//! cached in memory and re-read on bump. The locking discipline keeps
//! critical sections short, with a double-checked read after acquiring
//! the write half to avoid clobbering a concurrent bump.

mod store;

pub use store::FileSessionStore;

/// Default starting counter value.
pub const DEFAULT_COUNTER: u64 = 6;

/// Matches the original's `MAX_HISTORY_MESSAGES`.
pub const MAX_HISTORY_MESSAGES: usize = 20;

/// Number of consecutive empty `text_done` responses that triggers an
/// automatic session bump (§4.8.4).
pub const CONSECUTIVE_EMPTY_RESET_THRESHOLD: u32 = 3;
