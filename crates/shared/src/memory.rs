//! In-process store manager and network, for native hosts and tests.
//!
//! They follow the browser's behaviour where the policy depends on it:
//! `add_all` is all-or-nothing and rejects non-OK responses, lookups ignore
//! fragments and store names are listed in creation order.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex, MutexGuard,
};

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use futures::future::try_join_all;
use http::Method;
use tracing::{debug, trace};
use url::Url;

use crate::{
    error::NetworkError,
    request::{request_key, Request, Response},
    store::{Network, Store, StoreManager},
    Error,
};

type Entries = Arc<DashMap<String, Response>>;

#[derive(Debug, Default)]
struct Counters {
    opens: AtomicUsize,
    lookups: AtomicUsize,
}

#[derive(Debug)]
pub struct MemoryStorage<N> {
    network: Arc<N>,
    stores: Mutex<Vec<(String, Entries)>>,
    undeletable: DashSet<String>,
    counters: Arc<Counters>,
}

impl<N> MemoryStorage<N>
where
    N: Network<Request = Request, Response = Response>,
{
    /// `network` is what `add_all` fetches through
    pub fn new(network: Arc<N>) -> Self {
        Self {
            network,
            stores: Mutex::new(Vec::new()),
            undeletable: DashSet::new(),
            counters: Arc::default(),
        }
    }

    fn stores(&self) -> MutexGuard<'_, Vec<(String, Entries)>> {
        // Nothing panics while holding the lock
        self.stores.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Makes deleting the named store fail until `allow_delete` is called
    pub fn refuse_delete<S: Into<String>>(&self, name: S) {
        self.undeletable.insert(name.into());
    }

    pub fn allow_delete(&self, name: &str) {
        self.undeletable.remove(name);
    }

    /// Number of opens plus lookups performed so far
    pub fn operations(&self) -> usize {
        self.counters.opens.load(Ordering::SeqCst) + self.counters.lookups.load(Ordering::SeqCst)
    }

    /// Synchronous peek at a store's contents, without counting as a lookup
    pub fn peek(&self, name: &str, url: &Url) -> Option<Response> {
        let key = request_key(&Method::GET, url.as_str());
        self.stores()
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, entries)| entries.get(&key).map(|r| r.clone()))
    }

    pub fn len(&self, name: &str) -> Option<usize> {
        self.stores()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, entries)| entries.len())
    }
}

#[async_trait(?Send)]
impl<N> StoreManager for MemoryStorage<N>
where
    N: Network<Request = Request, Response = Response>,
{
    type Store = MemoryStore<N>;

    async fn open(&self, name: &str) -> Result<Self::Store, Error> {
        self.counters.opens.fetch_add(1, Ordering::SeqCst);

        let mut stores = self.stores();
        let entries = match stores.iter().find(|(n, _)| n == name) {
            Some((_, entries)) => entries.clone(),
            None => {
                debug!("Creating store {name}");
                let entries = Entries::default();
                stores.push((name.to_string(), entries.clone()));
                entries
            }
        };

        Ok(MemoryStore {
            name: name.to_string(),
            entries,
            network: self.network.clone(),
            counters: self.counters.clone(),
        })
    }

    async fn open_existing(&self, name: &str) -> Result<Option<Self::Store>, Error> {
        self.counters.opens.fetch_add(1, Ordering::SeqCst);

        let entries = self
            .stores()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, entries)| entries.clone());

        Ok(entries.map(|entries| MemoryStore {
            name: name.to_string(),
            entries,
            network: self.network.clone(),
            counters: self.counters.clone(),
        }))
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        Ok(self.stores().iter().map(|(n, _)| n.clone()).collect())
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        if self.undeletable.contains(name) {
            return Err(Error::Delete {
                name: name.to_string(),
                message: "store is locked".to_string(),
            });
        }

        let mut stores = self.stores();
        let before = stores.len();
        stores.retain(|(n, _)| n != name);
        Ok(stores.len() != before)
    }
}

#[derive(Debug)]
pub struct MemoryStore<N> {
    name: String,
    entries: Entries,
    network: Arc<N>,
    counters: Arc<Counters>,
}

impl<N> MemoryStore<N> {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<Response> {
        self.counters.lookups.fetch_add(1, Ordering::SeqCst);
        self.entries.get(key).map(|r| r.clone())
    }
}

#[async_trait(?Send)]
impl<N> Store for MemoryStore<N>
where
    N: Network<Request = Request, Response = Response>,
{
    type Request = Request;
    type Response = Response;

    async fn lookup(&self, request: &Request) -> Result<Option<Response>, Error> {
        Ok(self.get(&request.key()))
    }

    async fn lookup_url(&self, url: &Url) -> Result<Option<Response>, Error> {
        Ok(self.get(&request_key(&Method::GET, url.as_str())))
    }

    async fn add_all(&self, urls: &[Url]) -> Result<(), Error> {
        let fetches = urls.iter().map(|url| async move {
            let request = Request::get(url.clone());
            let response = self.network.fetch(&request).await.map_err(|e| Error::Populate {
                name: self.name.clone(),
                message: e.to_string(),
            })?;

            if !response.is_ok() {
                return Err(Error::BadStatus {
                    url: url.to_string(),
                    status: response.status.as_u16(),
                });
            }

            Ok((request.key(), response))
        });

        // Only commit once every fetch has succeeded
        let fetched = try_join_all(fetches).await?;
        for (key, response) in fetched {
            trace!("{}: put {key}", self.name);
            self.entries.insert(key, response);
        }

        Ok(())
    }
}

/// A network that answers from a fixed routing table
#[derive(Debug, Default)]
pub struct StaticNetwork {
    routes: DashMap<String, Response>,
    rejecting: DashSet<String>,
    offline: AtomicBool,
    requests: Mutex<Vec<String>>,
}

impl StaticNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&self, url: &Url, response: Response) {
        self.routes.insert(strip_fragment(url), response);
    }

    /// Makes fetches of `url` reject as if the connection dropped
    pub fn reject(&self, url: &Url) {
        self.rejecting.insert(strip_fragment(url));
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Every request seen so far as `METHOD url`, online or not
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

fn strip_fragment(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.into()
}

#[async_trait(?Send)]
impl Network for StaticNetwork {
    type Request = Request;
    type Response = Response;

    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        let url = strip_fragment(&request.url);
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(format!("{} {url}", request.method));

        if self.offline.load(Ordering::SeqCst) {
            return Err(NetworkError::new(url, "offline"));
        }
        if self.rejecting.contains(&url) {
            return Err(NetworkError::new(url, "connection reset"));
        }

        Ok(self.routes.get(&url).map_or_else(
            || Response::new(http::StatusCode::NOT_FOUND, "Not Found"),
            |r| r.clone(),
        ))
    }
}
