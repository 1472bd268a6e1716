use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{config::ShimConfig, store::StoreManager, Error};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub retained: Vec<String>,
    pub deleted: Vec<String>,
    /// Stores that are still there. The next activation tries them again
    pub failed: Vec<String>,
}

/// Deletes every store that isn't the current version.
///
/// Deletions run concurrently and all of them settle before this returns. A
/// failed deletion doesn't fail activation; only being unable to list the
/// stores does.
#[instrument(skip_all, fields(cache = %config.cache_name()))]
pub async fn activate<S: StoreManager>(
    storage: &S,
    config: &ShimConfig,
) -> Result<SweepReport, Error> {
    let (retained, stale): (Vec<String>, Vec<String>) = storage
        .keys()
        .await?
        .into_iter()
        .partition(|name| config.cache_name().is_current(name));

    let results = join_all(stale.into_iter().map(|name| async move {
        let result = storage.delete(&name).await;
        (name, result)
    }))
    .await;

    let mut report = SweepReport {
        retained,
        ..Default::default()
    };

    for (name, result) in results {
        match result {
            Ok(true) => {
                debug!("Deleted {name}");
                report.deleted.push(name);
            }
            Ok(false) => debug!("{name} was already gone"),
            Err(e) => {
                warn!("{e}");
                report.failed.push(name);
            }
        }
    }

    info!(
        deleted = report.deleted.len(),
        failed = report.failed.len(),
        "Activate successful"
    );

    Ok(report)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        memory::MemoryStorage,
        test_util::{config, online_network},
    };

    #[tokio::test]
    async fn test_only_current_store_survives() {
        let config = config("1.0.2");
        let storage = MemoryStorage::new(online_network(&config));
        for name in ["car-wash-manager-v1.0.0", "car-wash-manager-v1.0.1", "unrelated"] {
            storage.open(name).await.unwrap();
        }
        storage.open(config.cache_name().as_str()).await.unwrap();

        let report = activate(&storage, &config).await.unwrap();

        assert_eq!(report.retained, [config.cache_name().as_str()]);
        assert_eq!(
            report.deleted,
            ["car-wash-manager-v1.0.0", "car-wash-manager-v1.0.1", "unrelated"]
        );
        assert_eq!(
            storage.keys().await.unwrap(),
            [config.cache_name().as_str()]
        );
    }

    #[tokio::test]
    async fn test_failed_delete_is_retried_next_time() {
        let config = config("1.0.2");
        let storage = MemoryStorage::new(online_network(&config));
        storage.open("car-wash-manager-v1.0.0").await.unwrap();
        storage.open("car-wash-manager-v1.0.1").await.unwrap();
        storage.refuse_delete("car-wash-manager-v1.0.1");

        let report = activate(&storage, &config).await.unwrap();
        assert_eq!(report.deleted, ["car-wash-manager-v1.0.0"]);
        assert_eq!(report.failed, ["car-wash-manager-v1.0.1"]);

        storage.allow_delete("car-wash-manager-v1.0.1");
        let report = activate(&storage, &config).await.unwrap();
        assert_eq!(report.deleted, ["car-wash-manager-v1.0.1"]);
        assert!(storage.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_nothing_to_sweep() {
        let config = config("1.0.2");
        let storage = MemoryStorage::new(online_network(&config));

        assert_eq!(activate(&storage, &config).await.unwrap(), SweepReport::default());
    }
}
