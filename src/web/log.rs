use axum::http::{Method, StatusCode, Uri};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::error::ClientError;
use crate::web::Error;

/// Emits one structured line per request.
/// Server errors are logged with their full cause, client errors stay at a quieter level.
pub fn log_request(
    uuid: Uuid,
    req_method: Method,
    uri: Uri,
    status_code: StatusCode,
    web_error: Option<&Error>,
    client_status_and_error: Option<(StatusCode, ClientError)>,
) {
    let client_error_type = client_status_and_error
        .as_ref()
        .map(|(_, ce)| ce.as_ref().to_string());
    let status_code = client_status_and_error
        .as_ref()
        .map(|(sc, _)| *sc)
        .unwrap_or(status_code);

    let logline = LogLine {
        timestamp: chrono::Utc::now().to_rfc3339(),
        uuid: uuid.to_string(),
        req_method: req_method.to_string(),
        uri: uri.to_string(),
        status_code: status_code.as_u16(),
        client_error_type,
        web_error_type: web_error.map(|we| we.as_ref().to_string()),
        web_error_kind: web_error.map(|we| we.kind().to_string()),
    };
    let logline = json!(logline);

    match (web_error, client_status_and_error) {
        (Some(er), Some((_, ClientError::ServiceError))) => {
            error!(cause = %er, "LOGLINE: {logline}")
        }
        (Some(er), Some((_, ClientError::VerificationFailed))) => {
            info!(cause = %er, "LOGLINE: {logline}")
        }
        _ => debug!("LOGLINE: {logline}"),
    }
}

#[derive(Serialize)]
struct LogLine {
    timestamp: String,
    uuid: String,

    req_method: String,
    uri: String,
    status_code: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    client_error_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    web_error_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    web_error_kind: Option<String>,
}
