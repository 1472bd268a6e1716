use url::Url;

use crate::{manifest::Manifest, version::CacheName, Error};

/// Everything the handlers need to know about the running worker. Built once
/// per worker and only ever read afterwards.
#[derive(Debug, Clone)]
pub struct ShimConfig {
    cache_name: CacheName,
    manifest: Manifest,
    scope: Url,
    assets: Vec<Url>,
    shell: Url,
}

impl ShimConfig {
    pub fn new(cache_name: CacheName, manifest: Manifest, scope: Url) -> Result<Self, Error> {
        let assets = manifest.resolve(&scope)?;
        let shell = manifest.resolve_shell(&scope)?;

        Ok(Self {
            cache_name,
            manifest,
            scope,
            assets,
            shell,
        })
    }

    /// Parses the scope too, for hosts that hand it over as a string
    pub fn from_scope_str(
        cache_name: CacheName,
        manifest: Manifest,
        scope: &str,
    ) -> Result<Self, Error> {
        let scope = Url::parse(scope).map_err(|e| Error::Resolve {
            scope: scope.to_string(),
            path: String::new(),
            reason: e.to_string(),
        })?;
        Self::new(cache_name, manifest, scope)
    }

    pub fn cache_name(&self) -> &CacheName {
        &self.cache_name
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn scope(&self) -> &Url {
        &self.scope
    }

    /// Absolute asset URLs in manifest order
    pub fn assets(&self) -> &[Url] {
        &self.assets
    }

    pub fn shell(&self) -> &Url {
        &self.shell
    }
}
