//! Side-channel queue for extracted canvas/music actions (§4.11). The
//! conversation handler pushes every `action` payload it streams; a
//! separate GET endpoint drains the queue atomically for clients that
//! keep voice and UI-effect channels apart.

use std::sync::Mutex;

use serde_json::Value;

#[derive(Default)]
pub struct SideChannel {
    queue: Mutex<Vec<Value>>,
}

impl SideChannel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, action: Value) {
        self.queue.lock().unwrap().push(action);
    }

    /// Returns and clears everything queued so far.
    pub fn drain(&self) -> Vec<Value> {
        std::mem::take(&mut self.queue.lock().unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_clears_the_queue() {
        let channel = SideChannel::new();
        channel.push(serde_json::json!({"type": "canvas"}));
        channel.push(serde_json::json!({"type": "music"}));

        let drained = channel.drain();
        assert_eq!(drained.len(), 2);
        assert!(channel.drain().is_empty());
    }
}
