//! Plugin discovery: scans a directory of `plugin.json` manifests and
//! loads each as a cdylib exporting a single constructor symbol. Grounded
//! in `GatewayManager._load_plugins()`'s manifest shape and failure
//! handling (every failure path is a warning, never fatal), adapted from
//! Python's `importlib.util.spec_from_file_location` dynamic import to
//! Rust's `libloading` dynamic library loading (Design Note 9's first
//! option).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::{Library, Symbol};
use serde::Deserialize;
use voicebridge_core::ports::GatewayPort;

#[derive(Debug, Deserialize)]
pub struct PluginManifest {
    pub id: String,
    pub provides: String,
    pub entry: String,
    #[serde(default = "default_gateway_class")]
    pub gateway_class: String,
    #[serde(default)]
    pub requires_env: Vec<String>,
}

fn default_gateway_class() -> String {
    "vb_gateway_create".to_string()
}

/// The exported constructor signature every gateway plugin cdylib must
/// provide, named by `gateway_class` in its manifest. Returns ownership of
/// a heap-allocated trait object to the host.
pub type GatewayConstructor = unsafe extern "C" fn() -> *mut Box<dyn GatewayPort>;

/// Successfully loaded plugin: the constructed gateway plus the library
/// handle, which must outlive every call into the gateway's vtable.
pub struct LoadedPlugin {
    pub gateway: Arc<dyn GatewayPort>,
    #[allow(dead_code)] // kept alive for the process lifetime, never read
    library: Library,
}

#[derive(Debug, thiserror::Error)]
pub enum PluginLoadError {
    #[error("plugin.json missing or malformed: {0}")]
    Manifest(String),
    #[error("manifest declares provides={0!r}, expected \"gateway\"")]
    WrongKind(String),
    #[error("missing required env vars: {0:?}")]
    MissingEnv(Vec<String>),
    #[error("failed to load library {0}: {1}")]
    Library(String, String),
    #[error("constructor symbol {0!r} not found: {1}")]
    Symbol(String, String),
}

/// Scans `plugins_dir` for `<subdir>/plugin.json` gateway manifests,
/// loading each into a [`LoadedPlugin`]. Every failure is logged and
/// skipped; the caller receives only the plugins that loaded cleanly.
#[must_use]
pub fn discover_and_load(plugins_dir: &Path) -> Vec<LoadedPlugin> {
    let mut loaded = Vec::new();
    let Ok(entries) = std::fs::read_dir(plugins_dir) else {
        return loaded;
    };

    let mut dirs: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).filter(|p| p.is_dir()).collect();
    dirs.sort();

    for dir in dirs {
        let manifest_path = dir.join("plugin.json");
        if !manifest_path.exists() {
            continue;
        }
        match load_one(&dir, &manifest_path) {
            Ok(plugin) => {
                tracing::info!("loaded gateway plugin '{}' from {}", plugin.gateway.id(), dir.display());
                loaded.push(plugin);
            }
            Err(PluginLoadError::WrongKind(_)) => {} // not a gateway plugin, skip silently
            Err(e) => tracing::warn!("plugins/{}: {e}", dir.display()),
        }
    }

    loaded
}

fn load_one(dir: &Path, manifest_path: &Path) -> Result<LoadedPlugin, PluginLoadError> {
    let raw = std::fs::read_to_string(manifest_path).map_err(|e| PluginLoadError::Manifest(e.to_string()))?;
    let manifest: PluginManifest =
        serde_json::from_str(&raw).map_err(|e| PluginLoadError::Manifest(e.to_string()))?;

    if manifest.provides != "gateway" {
        return Err(PluginLoadError::WrongKind(manifest.provides));
    }

    let missing: Vec<String> =
        manifest.requires_env.iter().filter(|v| std::env::var(v).is_err()).cloned().collect();
    if !missing.is_empty() {
        return Err(PluginLoadError::MissingEnv(missing));
    }

    let entry_path = dir.join(&manifest.entry);
    // SAFETY: plugins are trusted, operator-installed cdylibs declared by
    // a manifest the operator also controls; this is the same trust model
    // as any other dynamically-loaded native dependency.
    let library = unsafe { Library::new(&entry_path) }
        .map_err(|e| PluginLoadError::Library(entry_path.display().to_string(), e.to_string()))?;

    // SAFETY: the manifest names the exact exported symbol; if its
    // signature doesn't match `GatewayConstructor` the plugin is broken,
    // which is a deployment error the operator must fix, not a condition
    // the host can detect at load time.
    let gateway: Box<dyn GatewayPort> = unsafe {
        let constructor: Symbol<GatewayConstructor> = library
            .get(manifest.gateway_class.as_bytes())
            .map_err(|e| PluginLoadError::Symbol(manifest.gateway_class.clone(), e.to_string()))?;
        let raw = constructor();
        *Box::from_raw(raw)
    };

    Ok(LoadedPlugin { gateway: Arc::from(gateway), library })
}
