use std::sync::Arc;

use axum::{
    http::{Method, Uri},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::web::{log, types::SignupResponse, Error, REQUEST_ID_HEADER};

/// Turns an `Error` stashed in the response extensions into the client facing
/// `{ success: false, message }` body and logs the request.
pub async fn response_mapper(req_method: Method, uri: Uri, resp: Response) -> Response {
    // Set by `SetRequestIdLayer` on the request and already propagated to the response.
    let req_id = resp
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|id| id.to_str().ok())
        .and_then(|id| Uuid::parse_str(id).ok())
        .unwrap_or_else(Uuid::new_v4);

    let web_error = resp.extensions().get::<Arc<Error>>().map(Arc::as_ref);
    let client_status_and_error = web_error.map(Error::status_code_and_client_error);

    let err_resp = client_status_and_error.as_ref().map(|(status, cl_err)| {
        let body = SignupResponse {
            success: false,
            message: cl_err.to_string(),
        };

        let mut err_resp = (*status, Json(body)).into_response();
        // Keep the propagated request id on the replacement response.
        if let Some(id) = resp.headers().get(REQUEST_ID_HEADER) {
            err_resp
                .headers_mut()
                .insert(REQUEST_ID_HEADER, id.clone());
        }
        err_resp
    });

    log::log_request(
        req_id,
        req_method,
        uri,
        resp.status(),
        web_error,
        client_status_and_error,
    );

    err_resp.unwrap_or(resp)
}
