//! Offline caching policy for a web application shell.
//!
//! The three service worker phases are plain async functions over an
//! injected [`StoreManager`] and [`Network`]: [`install`] fills the versioned
//! store from the manifest, [`intercept`] answers requests cache-first with a
//! shell fallback and [`activate`] sweeps stores left by older versions.
//! [`OfflineShim`] tracks which of them the host has already run.

pub mod activate;
pub mod config;
pub mod error;
pub mod glue;
pub mod install;
pub mod intercept;
pub mod lifecycle;
pub mod manifest;
pub mod memory;
pub mod request;
pub mod store;
pub mod utils;
pub mod version;

pub use activate::{activate, SweepReport};
pub use config::ShimConfig;
pub use error::{Error, NetworkError};
pub use install::{install, InstallReport};
pub use intercept::{intercept, Interception};
pub use lifecycle::{OfflineShim, Phase, WorkerState};
pub use manifest::Manifest;
pub use request::{Destination, InterceptedRequest, RequestMode, RETRIEVAL_METHODS};
pub use store::{Network, Store, StoreManager};
pub use version::CacheName;

#[cfg(feature = "backend")]
pub use utils::{configure_tracing, load_dotenv};

#[cfg(test)]
pub(crate) mod test_util {
    use std::sync::Arc;

    use crate::{
        memory::StaticNetwork,
        request::Response,
        CacheName, Manifest, ShimConfig,
    };

    pub const ASSETS: [&str; 5] = [
        "./",
        "./main.dart.js",
        "./index.html",
        "./manifest.json",
        "./icons/Icon-192.png",
    ];

    pub fn config(version: &str) -> ShimConfig {
        let name = CacheName::new("car-wash-manager", version.parse().unwrap()).unwrap();
        let manifest = Manifest::new(ASSETS, "./index.html").unwrap();
        ShimConfig::from_scope_str(name, manifest, "https://example.com/app/").unwrap()
    }

    /// Serves every asset of `config`, tagged with its version so copies
    /// from different versions can be told apart
    pub fn online_network(config: &ShimConfig) -> Arc<StaticNetwork> {
        let network = Arc::new(StaticNetwork::new());
        let version = config.cache_name().version();
        for url in config.assets() {
            let body = format!("{} @ {version}", url.path());
            let response = if url == config.shell() {
                Response::ok(body).with_content_type(&mime::TEXT_HTML_UTF_8)
            } else {
                Response::ok(body)
            };
            network.route(url, response);
        }
        network
    }
}
