//! Capabilities the handlers are given instead of reaching for the
//! platform's global cache keyspace and `fetch`.
//!
//! Futures are `?Send` because the browser implementation holds `JsValue`s
//! across awaits.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::{error::NetworkError, request::InterceptedRequest, Error};

/// The registry of named cache stores
#[async_trait(?Send)]
pub trait StoreManager {
    type Store: Store;

    /// Opens the named store, creating it if it doesn't exist
    async fn open(&self, name: &str) -> Result<Self::Store, Error>;

    /// Opens the named store only if it already exists. Lookups go through
    /// this so they never bring back a store the sweep deleted
    async fn open_existing(&self, name: &str) -> Result<Option<Self::Store>, Error>;

    /// Names of every existing store
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Deletes the named store. Returns false if there was nothing to delete
    async fn delete(&self, name: &str) -> Result<bool, Error>;
}

/// A single named store mapping requests to responses
#[async_trait(?Send)]
pub trait Store {
    type Request: InterceptedRequest;
    type Response;

    async fn lookup(&self, request: &Self::Request) -> Result<Option<Self::Response>, Error>;

    /// Looks up a plain `GET` of the url
    async fn lookup_url(&self, url: &Url) -> Result<Option<Self::Response>, Error>;

    /// Fetches every url and stores the responses. Either all of them end up
    /// in the store or none do.
    async fn add_all(&self, urls: &[Url]) -> Result<(), Error>;
}

#[async_trait(?Send)]
pub trait Network {
    type Request: InterceptedRequest;
    type Response;

    /// Any response counts as success, only a rejection is an error
    async fn fetch(&self, request: &Self::Request) -> Result<Self::Response, NetworkError>;
}

pub type StoreOf<S> = <S as StoreManager>::Store;
pub type RequestOf<S> = <StoreOf<S> as Store>::Request;
pub type ResponseOf<S> = <StoreOf<S> as Store>::Response;

#[async_trait(?Send)]
impl<T: StoreManager + ?Sized> StoreManager for Arc<T> {
    type Store = T::Store;

    async fn open(&self, name: &str) -> Result<Self::Store, Error> {
        (**self).open(name).await
    }

    async fn open_existing(&self, name: &str) -> Result<Option<Self::Store>, Error> {
        (**self).open_existing(name).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        (**self).keys().await
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        (**self).delete(name).await
    }
}

#[async_trait(?Send)]
impl<T: Network + ?Sized> Network for Arc<T> {
    type Request = T::Request;
    type Response = T::Response;

    async fn fetch(&self, request: &Self::Request) -> Result<Self::Response, NetworkError> {
        (**self).fetch(request).await
    }
}
