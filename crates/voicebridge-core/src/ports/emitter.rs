//! Internal telemetry emitter, separate from the per-request client
//! stream: a trait object the bootstrap composition root can wire to a
//! metrics sink without the orchestrator depending on any concrete sink.

use std::fmt;

#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    RequestStarted { session_key: String },
    RequestCompleted { session_key: String, fallback_used: bool },
    TtsFailed { provider: String, reason: String },
    SessionReset { old: String, new: String, reason: String },
}

pub trait TelemetryEmitter: Send + Sync + fmt::Debug {
    fn emit(&self, event: TelemetryEvent);

    fn clone_box(&self) -> Box<dyn TelemetryEmitter>;
}

#[derive(Debug, Clone, Default)]
pub struct NoopEmitter;

impl TelemetryEmitter for NoopEmitter {
    fn emit(&self, _event: TelemetryEvent) {}

    fn clone_box(&self) -> Box<dyn TelemetryEmitter> {
        Box::new(Self)
    }
}
