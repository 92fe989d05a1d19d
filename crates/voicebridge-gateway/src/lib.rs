//! Gateway Registry, cdylib plugin discovery, and the OpenClaw reference
//! gateway. Grounded in `services/gateway_manager.py` and
//! `services/gateways/{base,openclaw}.py`.

pub mod openclaw;
pub mod plugin;
mod registry;

pub use openclaw::{OpenClawConfig, OpenClawGateway};
pub use plugin::{GatewayConstructor, LoadedPlugin, PluginManifest};
pub use registry::{GatewayInfo, GatewayRegistry, DEFAULT_GATEWAY_ID};
