use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue},
    response::IntoResponse,
    routing::get,
    Router,
};
use shared::glue::worker_script;
use tower_http::{
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeaderLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::cli::Cli;

async fn serve_worker(State(script): State<Arc<str>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, HeaderValue::from_static("text/javascript"))],
        script.to_string(),
    )
}

/// The worker script, the packaged app, and the shell for every path the app
/// routes on the client
pub fn app(args: &Cli) -> Router {
    let script: Arc<str> = worker_script(&args.wasm_path).into();

    let worker = Router::new()
        .route(&args.worker_path, get(serve_worker))
        // Allow a worker served from a sub path to claim the root scope
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("service-worker-allowed"),
            HeaderValue::from_static("/"),
        ))
        // Browsers must see a version bump as soon as it's deployed
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache"),
        ))
        .with_state(script);

    worker
        .fallback_service(ServeDir::new(&args.static_path).fallback(ServeFile::new(args.shell())))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
