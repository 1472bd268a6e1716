use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::{
    Error as GenericJsError, RangeError as JsRangeError, ReferenceError as JsReferenceError,
    SyntaxError as JsSyntaxError, TypeError as JsTypeError, UriError as JsUriError,
};

/// A rejected promise or thrown exception, sorted by the kind of JS error it
/// was so it prints usefully
#[derive(Debug, Clone, Error)]
pub enum JsError {
    #[error("GenericJs Error: {0:?}")]
    GenericJs(GenericJsError),
    #[error("JsRange Error: {0:?}")]
    JsRange(JsRangeError),
    #[error("JsReference Error: {0:?}")]
    JsReference(JsReferenceError),
    #[error("JsSyntax Error: {0:?}")]
    JsSyntax(JsSyntaxError),
    // fetch() rejects with a TypeError when the network is down
    #[error("JsType Error: {0:?}")]
    JsType(JsTypeError),
    #[error("JsUri Error: {0:?}")]
    JsUri(JsUriError),
    #[error("UnknownJsValue Error: {0}")]
    UnknownJsValue(String),
}

impl From<JsValue> for JsError {
    fn from(err: JsValue) -> JsError {
        if err.is_instance_of::<JsRangeError>() {
            return JsError::JsRange(err.into());
        }
        if err.is_instance_of::<JsReferenceError>() {
            return JsError::JsReference(err.into());
        }
        if err.is_instance_of::<JsSyntaxError>() {
            return JsError::JsSyntax(err.into());
        }
        if err.is_instance_of::<JsTypeError>() {
            return JsError::JsType(err.into());
        }
        if err.is_instance_of::<JsUriError>() {
            return JsError::JsUri(err.into());
        }
        if err.is_instance_of::<GenericJsError>() {
            return JsError::GenericJs(err.into());
        }
        JsError::UnknownJsValue(format!("{:?}", err))
    }
}

/// Renders a JS error for the `message` of a [`shared::Error`]
pub fn js_message(err: JsValue) -> String {
    JsError::from(err).to_string()
}

/// Turns a shim error into something a promise can reject with
pub fn to_js(err: shared::Error) -> JsValue {
    GenericJsError::new(&err.to_string()).into()
}
