use async_trait::async_trait;
use shared::{Error, Store, StoreManager};
use tracing::trace;
use url::Url;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    js_sys::{Array, Promise},
    Cache, CacheStorage, Response,
};

use crate::{error::js_message, network::FetchRequest};

/// The worker's `caches`
pub struct WebStorage {
    caches: CacheStorage,
}

impl WebStorage {
    pub fn new(caches: CacheStorage) -> Self {
        Self { caches }
    }
}

#[async_trait(?Send)]
impl StoreManager for WebStorage {
    type Store = WebStore;

    async fn open(&self, name: &str) -> Result<WebStore, Error> {
        let open = |e: JsValue| Error::Open {
            name: name.to_string(),
            message: js_message(e),
        };

        let cache: Cache = JsFuture::from(self.caches.open(name))
            .await
            .map_err(open)?
            .dyn_into()
            .map_err(open)?;

        Ok(WebStore {
            name: name.to_string(),
            cache,
        })
    }

    async fn open_existing(&self, name: &str) -> Result<Option<WebStore>, Error> {
        // caches.open() would create it
        let exists = JsFuture::from(self.caches.has(name))
            .await
            .map_err(|e| Error::Open {
                name: name.to_string(),
                message: js_message(e),
            })?;

        if !exists.as_bool().unwrap_or(false) {
            return Ok(None);
        }
        self.open(name).await.map(Some)
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        let keys = |e: JsValue| Error::Keys {
            message: js_message(e),
        };

        let names: Array = JsFuture::from(self.caches.keys())
            .await
            .map_err(keys)?
            .dyn_into()
            .map_err(keys)?;

        Ok(names.iter().filter_map(|n| n.as_string()).collect())
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        let deleted = JsFuture::from(self.caches.delete(name))
            .await
            .map_err(|e| Error::Delete {
                name: name.to_string(),
                message: js_message(e),
            })?;

        Ok(deleted.as_bool().unwrap_or(false))
    }
}

/// One opened `Cache`
pub struct WebStore {
    name: String,
    cache: Cache,
}

impl WebStore {
    // match() resolves to undefined on a miss
    async fn matched(&self, url: &str, promise: Promise) -> Result<Option<Response>, Error> {
        let lookup = |e: JsValue| Error::Lookup {
            url: url.to_string(),
            message: js_message(e),
        };

        let cached = JsFuture::from(promise).await.map_err(lookup)?;
        if cached.is_undefined() {
            return Ok(None);
        }
        cached.dyn_into::<Response>().map(Some).map_err(lookup)
    }
}

#[async_trait(?Send)]
impl Store for WebStore {
    type Request = FetchRequest;
    type Response = Response;

    async fn lookup(&self, request: &FetchRequest) -> Result<Option<Response>, Error> {
        let url = request.inner().url();
        self.matched(&url, self.cache.match_with_request(request.inner()))
            .await
    }

    async fn lookup_url(&self, url: &Url) -> Result<Option<Response>, Error> {
        self.matched(url.as_str(), self.cache.match_with_str(url.as_str()))
            .await
    }

    async fn add_all(&self, urls: &[Url]) -> Result<(), Error> {
        let requests: Array = urls.iter().map(|u| JsValue::from_str(u.as_str())).collect();
        trace!("{}: addAll {} urls", self.name, requests.length());

        // addAll rejects without storing anything if any fetch fails or isn't ok
        JsFuture::from(self.cache.add_all_with_str_sequence(&requests))
            .await
            .map_err(|e| Error::Populate {
                name: self.name.clone(),
                message: js_message(e),
            })?;

        Ok(())
    }
}
