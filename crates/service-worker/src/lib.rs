//! Wasm side of the worker. The generated glue script (`shared::glue`) calls
//! these exports from the `install`, `activate` and `fetch` listeners.

pub mod assets;
pub mod cache;
pub mod error;
pub mod network;

use std::{cell::RefCell, rc::Rc};

use console_error_panic_hook::set_once as set_panic_hook;
use gloo::utils::format::JsValueSerdeExt;
use serde::Serialize;
use shared::{
    activate, install, intercept, utils::tracing::configure_tracing_once as configure_tracing,
    Error, Interception, ShimConfig,
};
use tracing::{debug, error};
use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::{js_sys::Promise, Request, Response, ServiceWorkerGlobalScope};

use crate::{
    assets::shim_config,
    cache::WebStorage,
    error::{js_message, to_js},
    network::{FetchRequest, WebNetwork},
};

thread_local! {
    // The config only depends on the scope, which is fixed for a registration
    static CONFIG: RefCell<Option<(String, Rc<ShimConfig>)>> = const { RefCell::new(None) };
}

fn config_for(scope: String) -> Result<Rc<ShimConfig>, Error> {
    CONFIG.with(|cached| {
        let mut cached = cached.borrow_mut();
        if let Some((s, config)) = cached.as_ref() {
            if *s == scope {
                return Ok(config.clone());
            }
        }

        let config = Rc::new(shim_config(&scope)?);
        *cached = Some((scope, config.clone()));
        Ok(config)
    })
}

fn setup(sw: &ServiceWorkerGlobalScope) -> Result<(WebStorage, Rc<ShimConfig>), Error> {
    set_panic_hook();
    configure_tracing();

    let caches = sw.caches().map_err(|e| Error::Host(js_message(e)))?;
    let config = config_for(sw.registration().scope())?;
    Ok((WebStorage::new(caches), config))
}

fn to_js_value<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    <JsValue as JsValueSerdeExt>::from_serde(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Logs the failure and rejects with it
fn reject(e: Error) -> JsValue {
    error!("{e}");
    to_js(e)
}

async fn worker_install_impl(sw: ServiceWorkerGlobalScope) -> Result<JsValue, JsValue> {
    let (storage, config) = setup(&sw).map_err(reject)?;
    let report = install(&storage, &config).await.map_err(reject)?;
    to_js_value(&report)
}

/// Resolves once every asset is cached; a rejection fails the install
#[wasm_bindgen]
pub fn worker_install(sw: ServiceWorkerGlobalScope) -> Promise {
    future_to_promise(worker_install_impl(sw))
}

async fn worker_activate_impl(sw: ServiceWorkerGlobalScope) -> Result<JsValue, JsValue> {
    let (storage, config) = setup(&sw).map_err(reject)?;
    let report = activate(&storage, &config).await.map_err(reject)?;
    to_js_value(&report)
}

/// Resolves once every stale store has been dealt with
#[wasm_bindgen]
pub fn worker_activate(sw: ServiceWorkerGlobalScope) -> Promise {
    future_to_promise(worker_activate_impl(sw))
}

async fn forward(sw: &ServiceWorkerGlobalScope, request: &Request) -> Result<Response, JsValue> {
    let response = JsFuture::from(sw.fetch_with_request(request)).await?;
    response.dyn_into::<Response>()
}

async fn worker_fetch_impl(
    sw: ServiceWorkerGlobalScope,
    request: Request,
) -> Result<JsValue, JsValue> {
    let (storage, config) = setup(&sw).map_err(reject)?;
    let network = WebNetwork::new(sw.clone());
    let request = FetchRequest::from(request);

    let interception = intercept(&storage, &network, &config, &request)
        .await
        .map_err(reject)?;
    debug!(
        "{} {} from {}",
        request.inner().method(),
        request.inner().url(),
        interception.source()
    );

    let response = match interception {
        Interception::PassThrough => forward(&sw, request.inner()).await?,
        Interception::Cached(r) | Interception::Shell(r) | Interception::Network(r) => r,
    };

    Ok(response.into())
}

/// The promise for `respondWith`. Rejecting it shows up as a network error
#[wasm_bindgen]
pub fn worker_fetch(sw: ServiceWorkerGlobalScope, request: Request) -> Promise {
    future_to_promise(worker_fetch_impl(sw, request))
}
