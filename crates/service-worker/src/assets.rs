use const_format::concatcp;
use shared::{CacheName, Error, Manifest, ShimConfig};

pub const APP_NAME: &str = "car-wash-manager";

/// Bumping the crate version is what invalidates every cached asset
pub const CACHE_NAME: &str = concatcp!(APP_NAME, "-v", env!("CARGO_PKG_VERSION"));

/// Written by the packaging step, relative to the worker scope
pub const ASSET_MANIFEST: [&str; 9] = [
    "./",
    "./main.dart.js",
    "./index.html",
    "./manifest.json",
    "./icons/Icon-192.png",
    "./icons/Icon-512.png",
    "./assets/FontManifest.json",
    "./assets/AssetManifest.json",
    "./assets/packages/cupertino_icons/assets/CupertinoIcons.ttf",
];

pub const SHELL_DOCUMENT: &str = "./index.html";

/// The worker's configuration for the registration `scope`
pub fn shim_config(scope: &str) -> Result<ShimConfig, Error> {
    let cache_name: CacheName = CACHE_NAME.parse()?;
    let manifest = Manifest::new(ASSET_MANIFEST, SHELL_DOCUMENT)?;
    ShimConfig::from_scope_str(cache_name, manifest, scope)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cache_name_follows_crate_version() {
        let name: CacheName = CACHE_NAME.parse().unwrap();
        assert_eq!(name.app(), APP_NAME);
        assert_eq!(name.version().to_string(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_manifest_resolves_under_scope() {
        let config = shim_config("https://wash.example.com/app/").unwrap();

        assert_eq!(config.assets().len(), ASSET_MANIFEST.len());
        assert_eq!(config.shell().as_str(), "https://wash.example.com/app/index.html");
        assert!(config
            .assets()
            .iter()
            .all(|url| url.as_str().starts_with("https://wash.example.com/app/")));
    }
}
