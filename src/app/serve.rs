use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderName, Request, Response, StatusCode},
    middleware,
};
use tower::ServiceBuilder;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{MakeSpan, OnRequest, OnResponse, TraceLayer},
};
use tracing::{Level, Span};

use crate::{
    web::{midware, routes::routes, REQUEST_ID_HEADER},
    App,
};

pub type ServeResult<T> = core::result::Result<T, ServeError>;

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("io error while serving: {0}")]
    Io(#[from] std::io::Error),
}

/// Serves the signup service on the listener bound by `App::build_from_config`.
///
/// Every request gets an `x-request-id`, a `serve` span and passes through the response mapper
/// that turns handler errors into `{ success: false, message }` bodies.
pub async fn serve(app: App) -> ServeResult<()> {
    let App {
        app_state,
        listener,
    } = app;
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    // Requests pass the layers top down, responses bottom up.
    let layers = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(build_trace_layer())
        .layer(middleware::map_response(midware::response_mapper))
        // Runs first on the way out, so the mapper can read the id from the response.
        .layer(PropagateRequestIdLayer::new(request_id_header));

    let router = routes(app_state).layer(layers);
    axum::serve(listener, router).await?;

    Ok(())
}

/// One `serve` span per request, carrying the request id set by `SetRequestIdLayer`.
fn build_trace_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    impl MakeSpan<Body> + Clone,
    impl OnRequest<Body> + Clone,
    impl OnResponse<Body> + Clone,
> {
    TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            let request_id = req
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|id| id.to_str().ok())
                .unwrap_or_default()
                .to_string();

            tracing::error_span!(
                "serve",
                id = request_id,
                method = %req.method(),
                path = req.uri().path()
            )
        })
        .on_request(|req: &Request<Body>, _s: &Span| tracing::debug!("START @ {}", req.uri()))
        .on_response(|res: &Response<Body>, latency: Duration, _s: &Span| {
            let status = res.status();
            let level = response_level(status);
            if level == Level::ERROR {
                tracing::error!("END in: {latency:?} - STATUS: {status}")
            } else if level == Level::INFO {
                tracing::info!("END in: {latency:?} - STATUS: {status}")
            } else {
                tracing::debug!("END in: {latency:?} - STATUS: {status}")
            }
        })
}

/// Only server failures are exceptional. Rejected signups (4xx) are part of normal traffic
/// and their details are logged by the response mapper.
fn response_level(status: StatusCode) -> Level {
    if status.is_server_error() {
        Level::ERROR
    } else if status.is_client_error() {
        Level::INFO
    } else {
        Level::DEBUG
    }
}
