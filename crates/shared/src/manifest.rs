use std::collections::HashSet;

use url::{ParseError, Url};

use crate::Error;

/// The fixed, ordered list of asset paths cached at install time.
///
/// Paths are relative to the worker scope. One of them is the shell
/// document served for client-side routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    paths: Vec<String>,
    shell: String,
}

impl Manifest {
    pub fn new<I, P, S>(paths: I, shell: S) -> Result<Self, Error>
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
        S: Into<String>,
    {
        let paths: Vec<String> = paths.into_iter().map(Into::into).collect();
        let shell = shell.into();

        if paths.is_empty() {
            return Err(Error::InvalidManifest("no asset paths".to_string()));
        }

        let mut seen = HashSet::with_capacity(paths.len());
        for path in paths.iter() {
            match Url::parse(path) {
                Err(ParseError::RelativeUrlWithoutBase) => {}
                Ok(_) => {
                    return Err(Error::InvalidManifest(format!(
                        "{path:?} is absolute, asset paths must be relative to the scope"
                    )))
                }
                Err(e) => return Err(Error::InvalidManifest(format!("{path:?}: {e}"))),
            }
            if !seen.insert(path.as_str()) {
                return Err(Error::InvalidManifest(format!("{path:?} is listed twice")));
            }
        }

        if !seen.contains(shell.as_str()) {
            return Err(Error::InvalidManifest(format!(
                "shell document {shell:?} is not one of the asset paths"
            )));
        }

        Ok(Self { paths, shell })
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Resolves every path against the scope, keeping manifest order
    pub fn resolve(&self, scope: &Url) -> Result<Vec<Url>, Error> {
        self.paths.iter().map(|p| resolve(scope, p)).collect()
    }

    pub fn resolve_shell(&self, scope: &Url) -> Result<Url, Error> {
        resolve(scope, &self.shell)
    }
}

pub(crate) fn resolve(scope: &Url, path: &str) -> Result<Url, Error> {
    scope.join(path).map_err(|e| Error::Resolve {
        scope: scope.to_string(),
        path: path.to_string(),
        reason: e.to_string(),
    })
}
