use std::fmt;

use http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use mime::Mime;
use url::Url;

/// Methods whose responses can be served out of the cache. Everything else is
/// passed straight through.
pub const RETRIEVAL_METHODS: [Method; 1] = [Method::GET];

pub fn is_retrieval(method: &Method) -> bool {
    RETRIEVAL_METHODS.contains(method)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    Navigate,
    SameOrigin,
    NoCors,
    Cors,
}

impl From<&str> for RequestMode {
    fn from(value: &str) -> Self {
        match value {
            "navigate" => Self::Navigate,
            "same-origin" => Self::SameOrigin,
            "no-cors" => Self::NoCors,
            _ => Self::Cors,
        }
    }
}

/// What the requester is going to do with the response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Document,
    Iframe,
    Script,
    Style,
    Image,
    Font,
    Manifest,
    Empty,
    Other(String),
}

impl From<&str> for Destination {
    fn from(value: &str) -> Self {
        match value {
            "document" => Self::Document,
            "iframe" | "frame" => Self::Iframe,
            "script" => Self::Script,
            "style" => Self::Style,
            "image" => Self::Image,
            "font" => Self::Font,
            "manifest" => Self::Manifest,
            "" => Self::Empty,
            other => Self::Other(other.to_string()),
        }
    }
}

/// The parts of an intercepted request the routing policy looks at
pub trait InterceptedRequest {
    fn method(&self) -> Method;
    fn url(&self) -> String;
    fn mode(&self) -> RequestMode;
    fn destination(&self) -> Destination;
    fn accept(&self) -> Option<String>;

    fn is_retrieval(&self) -> bool {
        is_retrieval(&self.method())
    }

    fn is_navigation(&self) -> bool {
        self.mode() == RequestMode::Navigate
    }

    /// True if a failure should be answered with the shell document
    fn expects_document(&self) -> bool {
        if matches!(self.destination(), Destination::Document | Destination::Iframe) {
            return true;
        }
        self.accept().is_some_and(|accept| accepts_html(&accept))
    }
}

fn accepts_html(accept: &str) -> bool {
    accept
        .split(',')
        .filter_map(|v| v.trim().parse::<Mime>().ok())
        .any(|m| m.essence_str() == mime::TEXT_HTML.essence_str())
}

/// Request identity inside a store. Fragments never reach the network so they
/// don't take part in matching.
pub fn request_key(method: &Method, url: &str) -> String {
    let url = url.split_once('#').map_or(url, |(u, _)| u);
    format!("{method} {url}")
}

/// A request outside of the browser
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub mode: RequestMode,
    pub destination: Destination,
    pub headers: HeaderMap,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            mode: RequestMode::Cors,
            destination: Destination::Empty,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// A top level page load, the way a browser issues it
    pub fn navigate(url: Url) -> Self {
        let mut request = Self::get(url)
            .with_mode(RequestMode::Navigate)
            .with_destination(Destination::Document);
        request
            .headers
            .insert(header::ACCEPT, HeaderValue::from_static("text/html,*/*;q=0.8"));
        request
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_header(mut self, name: header::HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn key(&self) -> String {
        request_key(&self.method, self.url.as_str())
    }
}

impl InterceptedRequest for Request {
    fn method(&self) -> Method {
        self.method.clone()
    }

    fn url(&self) -> String {
        self.url.to_string()
    }

    fn mode(&self) -> RequestMode {
        self.mode
    }

    fn destination(&self) -> Destination {
        self.destination.clone()
    }

    fn accept(&self) -> Option<String> {
        self.headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

/// A response outside of the browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new<B: Into<Vec<u8>>>(status: StatusCode, body: B) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn ok<B: Into<Vec<u8>>>(body: B) -> Self {
        Self::new(StatusCode::OK, body)
    }

    pub fn with_content_type(mut self, content_type: &Mime) -> Self {
        if let Ok(value) = HeaderValue::from_str(content_type.as_ref()) {
            self.headers.insert(header::CONTENT_TYPE, value);
        }
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_success()
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.status, self.body.len())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse("https://example.com/").unwrap().join(path).unwrap()
    }

    #[test]
    fn test_only_get_is_retrieval() {
        assert!(Request::get(url("a.js")).is_retrieval());
        assert!(!Request::new(Method::POST, url("api")).is_retrieval());
        assert!(!Request::new(Method::HEAD, url("a.js")).is_retrieval());
    }

    #[test]
    fn test_navigation_expects_document() {
        let request = Request::navigate(url("orders/12"));
        assert!(request.is_navigation());
        assert!(request.expects_document());
    }

    #[test]
    fn test_expects_document_from_accept() {
        let script = Request::get(url("a.js")).with_destination(Destination::Script);
        assert!(!script.expects_document());

        let html = Request::get(url("page")).with_header(
            header::ACCEPT,
            HeaderValue::from_static("application/xhtml+xml, text/html;q=0.9"),
        );
        assert!(html.expects_document());

        let frame = Request::get(url("frame")).with_destination(Destination::Iframe);
        assert!(frame.expects_document());
    }

    #[test]
    fn test_key_ignores_fragment() {
        assert_eq!(
            request_key(&Method::GET, "https://example.com/index.html#top"),
            request_key(&Method::GET, "https://example.com/index.html"),
        );
        assert_ne!(
            request_key(&Method::GET, "https://example.com/a"),
            request_key(&Method::POST, "https://example.com/a"),
        );
    }

    #[test]
    fn test_mode_and_destination_from_web_strings() {
        assert_eq!(RequestMode::from("navigate"), RequestMode::Navigate);
        assert_eq!(RequestMode::from("no-cors"), RequestMode::NoCors);
        assert_eq!(Destination::from("document"), Destination::Document);
        assert_eq!(Destination::from(""), Destination::Empty);
        assert_eq!(Destination::from("iframe"), Destination::Iframe);
        assert_eq!(Destination::from("frame"), Destination::Iframe);
        assert_eq!(
            Destination::from("audioworklet"),
            Destination::Other("audioworklet".to_string())
        );
    }
}
