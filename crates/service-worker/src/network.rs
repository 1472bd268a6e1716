use async_trait::async_trait;
use http::{header::ACCEPT, Method};
use shared::{Destination, InterceptedRequest, Network, NetworkError, RequestMode};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    js_sys::Reflect, Request, RequestMode as WebRequestMode, Response, ServiceWorkerGlobalScope,
};

use crate::error::js_message;

/// The request handed to the fetch event
pub struct FetchRequest(Request);

impl FetchRequest {
    pub fn inner(&self) -> &Request {
        &self.0
    }

    // web-sys's RequestDestination has no iframe or frame values, so the
    // property is read as the string the browser reports
    fn raw_destination(&self) -> Option<String> {
        Reflect::get(&self.0, &JsValue::from_str("destination"))
            .ok()
            .and_then(|d| d.as_string())
    }
}

fn mode(mode: WebRequestMode) -> RequestMode {
    match mode {
        WebRequestMode::Navigate => RequestMode::Navigate,
        WebRequestMode::SameOrigin => RequestMode::SameOrigin,
        WebRequestMode::NoCors => RequestMode::NoCors,
        _ => RequestMode::Cors,
    }
}

/// A missing destination is treated as the empty one
fn destination(raw: Option<&str>) -> Destination {
    Destination::from(raw.unwrap_or_default())
}

impl From<Request> for FetchRequest {
    fn from(request: Request) -> Self {
        Self(request)
    }
}

impl InterceptedRequest for FetchRequest {
    fn method(&self) -> Method {
        // Browsers only hand over valid method tokens. Anything else is
        // treated as a non-retrieval and passed through.
        Method::from_bytes(self.0.method().as_bytes()).unwrap_or(Method::OPTIONS)
    }

    fn url(&self) -> String {
        self.0.url()
    }

    fn mode(&self) -> RequestMode {
        mode(self.0.mode())
    }

    fn destination(&self) -> Destination {
        destination(self.raw_destination().as_deref())
    }

    fn accept(&self) -> Option<String> {
        self.0.headers().get(ACCEPT.as_str()).ok().flatten()
    }
}

/// `fetch()` from the worker scope
pub struct WebNetwork {
    sw: ServiceWorkerGlobalScope,
}

impl WebNetwork {
    pub fn new(sw: ServiceWorkerGlobalScope) -> Self {
        Self { sw }
    }
}

#[async_trait(?Send)]
impl Network for WebNetwork {
    type Request = FetchRequest;
    type Response = Response;

    async fn fetch(&self, request: &FetchRequest) -> Result<Response, NetworkError> {
        let url = request.inner().url();
        let response = JsFuture::from(self.sw.fetch_with_request(request.inner()))
            .await
            .map_err(|e| NetworkError::new(&url, js_message(e)))?;

        response.dyn_into::<Response>().map_err(|v| {
            NetworkError::new(
                &url,
                format!("Fetch returned something other than a Response: {v:?}"),
            )
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_frames_are_documents() {
        for raw in ["document", "iframe", "frame"] {
            let request = shared::request::Request::get("https://example.com/embed".parse().unwrap())
                .with_destination(destination(Some(raw)));
            assert!(request.expects_document(), "{raw}");
        }
    }

    #[test]
    fn test_destination() {
        assert_eq!(destination(Some("iframe")), Destination::Iframe);
        assert_eq!(destination(Some("script")), Destination::Script);
        assert_eq!(destination(Some("")), Destination::Empty);
        assert_eq!(destination(None), Destination::Empty);
        assert_eq!(destination(Some("video")), Destination::Other("video".to_string()));
    }

    #[test]
    fn test_mode() {
        assert_eq!(mode(WebRequestMode::Navigate), RequestMode::Navigate);
        assert_eq!(mode(WebRequestMode::SameOrigin), RequestMode::SameOrigin);
        assert_eq!(mode(WebRequestMode::NoCors), RequestMode::NoCors);
        assert_eq!(mode(WebRequestMode::Cors), RequestMode::Cors);
    }
}
