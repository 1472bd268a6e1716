use tracing::{debug, trace, warn};

use crate::{
    config::ShimConfig,
    request::InterceptedRequest,
    store::{Network, RequestOf, ResponseOf, Store, StoreManager},
    Error,
};

/// Where the answer to an intercepted request came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interception<R> {
    /// Not a retrieval, the request goes to the network untouched
    PassThrough,
    Cached(R),
    /// The shell document, standing in for a client-side route
    Shell(R),
    Network(R),
}

impl<R> Interception<R> {
    pub fn response(self) -> Option<R> {
        match self {
            Self::PassThrough => None,
            Self::Cached(r) | Self::Shell(r) | Self::Network(r) => Some(r),
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            Self::PassThrough => "pass-through",
            Self::Cached(_) => "cache",
            Self::Shell(_) => "shell",
            Self::Network(_) => "network",
        }
    }
}

/// Cache first, then the shell for navigations, then the network.
///
/// Cached entries are served without ever checking the network and misses
/// are never written back, so the store only changes on install.
pub async fn intercept<S, N>(
    storage: &S,
    network: &N,
    config: &ShimConfig,
    request: &RequestOf<S>,
) -> Result<Interception<ResponseOf<S>>, Error>
where
    S: StoreManager,
    N: Network<Request = RequestOf<S>, Response = ResponseOf<S>>,
{
    let url = request.url();

    if !request.is_retrieval() {
        trace!("PASS: {} {url}", request.method());
        return Ok(Interception::PassThrough);
    }

    // A store the sweep removed stays removed, so its absence is a miss
    let store = storage.open_existing(config.cache_name().as_str()).await?;

    if let Some(store) = &store {
        if let Some(response) = store.lookup(request).await? {
            debug!("HIT: {url}");
            return Ok(Interception::Cached(response));
        }
    }
    debug!("MISS: {url}");

    if request.is_navigation() {
        if let Some(shell) = cached_shell(store.as_ref(), config).await? {
            debug!("SHELL: {url}");
            return Ok(Interception::Shell(shell));
        }
        warn!("Shell {} isn't cached, sending navigation to {url} to the network", config.shell());
    }

    match network.fetch(request).await {
        Ok(response) => Ok(Interception::Network(response)),
        Err(e) if request.expects_document() => {
            warn!("{e}, falling back to the shell");
            cached_shell(store.as_ref(), config)
                .await?
                .map(Interception::Shell)
                .ok_or_else(|| Error::ShellMissing {
                    name: config.cache_name().to_string(),
                    url: config.shell().to_string(),
                })
        }
        Err(e) => {
            debug!("{e}");
            Err(Error::Unavailable { url })
        }
    }
}

async fn cached_shell<T: Store>(
    store: Option<&T>,
    config: &ShimConfig,
) -> Result<Option<T::Response>, Error> {
    match store {
        Some(store) => store.lookup_url(config.shell()).await,
        None => Ok(None),
    }
}
