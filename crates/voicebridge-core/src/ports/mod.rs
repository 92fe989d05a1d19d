pub mod emitter;
pub mod gateway;
pub mod session;
pub mod tts;

pub use emitter::{NoopEmitter, TelemetryEmitter, TelemetryEvent};
pub use gateway::{GatewayError, GatewayPort, GatewayRequestOpts};
pub use session::{SessionStorePort, StoreError};
pub use tts::{TtsError, TtsProviderInfo, TtsProviderPort, TtsVoiceInfo};
