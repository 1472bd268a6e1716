use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    config::ShimConfig,
    store::{Store, StoreManager},
    Error,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub cache_name: String,
    pub assets: usize,
}

/// Opens the current store and caches every manifest asset into it.
///
/// Any asset failing to fetch fails the whole install and nothing from this
/// attempt is kept, so the host can simply retry. Installing over an already
/// populated store of the same version just refreshes the entries.
#[instrument(skip_all, fields(cache = %config.cache_name()))]
pub async fn install<S: StoreManager>(
    storage: &S,
    config: &ShimConfig,
) -> Result<InstallReport, Error> {
    let name = config.cache_name().as_str();
    let store = storage.open(name).await?;

    debug!("Caching {} assets", config.assets().len());
    store.add_all(config.assets()).await?;

    info!(assets = config.assets().len(), "Install successful");

    Ok(InstallReport {
        cache_name: name.to_string(),
        assets: config.assets().len(),
    })
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use url::Url;

    use super::*;
    use crate::{
        memory::{MemoryStorage, StaticNetwork},
        test_util::{config, online_network},
    };

    #[tokio::test]
    async fn test_every_asset_is_cached() {
        let config = config("1.0.1");
        let storage = MemoryStorage::new(online_network(&config));

        let report = install(&storage, &config).await.unwrap();
        assert_eq!(report.assets, config.manifest().len());

        for url in config.assets() {
            assert!(
                storage.peek(config.cache_name().as_str(), url).is_some(),
                "{url} missing after install"
            );
        }
    }

    #[tokio::test]
    async fn test_failed_asset_fails_install() {
        let config = config("1.0.1");
        let network = online_network(&config);
        let broken: &Url = &config.assets()[3];
        network.reject(broken);
        let storage = MemoryStorage::new(network);

        let err = install(&storage, &config).await.unwrap_err();
        assert!(matches!(err, Error::Populate { .. }), "{err:?}");

        // The store was opened but nothing was committed
        assert_eq!(storage.len(config.cache_name().as_str()), Some(0));
    }

    #[tokio::test]
    async fn test_install_is_idempotent() {
        let config = config("1.0.1");
        let storage = MemoryStorage::new(online_network(&config));

        install(&storage, &config).await.unwrap();
        install(&storage, &config).await.unwrap();

        assert_eq!(
            storage.len(config.cache_name().as_str()),
            Some(config.manifest().len())
        );
    }

    #[tokio::test]
    async fn test_offline_install_fails() {
        let config = config("1.0.1");
        let network = Arc::new(StaticNetwork::new());
        network.set_offline(true);
        let storage = MemoryStorage::new(network);

        assert!(install(&storage, &config).await.is_err());
    }
}
