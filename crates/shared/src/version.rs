use std::{fmt, str::FromStr};

use semver::Version;
use serde::{Serialize, Serializer};

use crate::Error;

const VERSION_SEPARATOR: &str = "-v";

/// Name of a versioned cache store: `<app-name>-v<major>.<minor>.<patch>`
///
/// Bumping the version is the only way previously cached assets get
/// invalidated, so two names are the same store only if both parts match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheName {
    app: String,
    version: Version,
    name: String,
}

impl CacheName {
    pub fn new<S: Into<String>>(app: S, version: Version) -> Result<Self, Error> {
        let app = app.into();
        if app.is_empty() {
            return Err(Error::InvalidCacheName {
                name: format!("{VERSION_SEPARATOR}{version}"),
                reason: "empty app name".to_string(),
            });
        }
        let name = format!("{app}{VERSION_SEPARATOR}{version}");
        Ok(Self { app, version, name })
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// True if `other` is the name of this exact store
    pub fn is_current(&self, other: &str) -> bool {
        self.name == other
    }
}

impl FromStr for CacheName {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| Error::InvalidCacheName {
            name: name.to_string(),
            reason,
        };

        let (app, version) = name
            .rsplit_once(VERSION_SEPARATOR)
            .ok_or_else(|| invalid(format!("missing \"{VERSION_SEPARATOR}\" separator")))?;
        let version = Version::parse(version).map_err(|e| invalid(e.to_string()))?;

        Self::new(app, version).map_err(|_| invalid("empty app name".to_string()))
    }
}

impl fmt::Display for CacheName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Serialize for CacheName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.name)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_round_trips_display() {
        let name: CacheName = "car-wash-manager-v1.0.1".parse().unwrap();
        assert_eq!(name.app(), "car-wash-manager");
        assert_eq!(name.version(), &Version::new(1, 0, 1));
        assert_eq!(name.to_string(), "car-wash-manager-v1.0.1");
    }

    #[test]
    fn test_app_name_may_contain_separator() {
        let name: CacheName = "dev-viewer-v2.3.4".parse().unwrap();
        assert_eq!(name.app(), "dev-viewer");
        assert_eq!(name.version(), &Version::new(2, 3, 4));
    }

    #[test]
    fn test_rejects_bad_names() {
        assert!("car-wash-manager".parse::<CacheName>().is_err());
        assert!("car-wash-manager-v1.0".parse::<CacheName>().is_err());
        assert!("-v1.0.0".parse::<CacheName>().is_err());
    }

    #[test]
    fn test_is_current_compares_whole_name() {
        let name: CacheName = "app-v1.0.2".parse().unwrap();
        assert!(name.is_current("app-v1.0.2"));
        assert!(!name.is_current("app-v1.0.1"));
        assert!(!name.is_current("other-v1.0.2"));
    }
}
