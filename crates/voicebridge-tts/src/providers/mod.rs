mod http;
mod local;

pub use http::{HttpTtsConfig, HttpTtsProvider};
pub use local::LocalSilenceProvider;
