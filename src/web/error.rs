use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use strum_macros::AsRefStr;

use crate::web::routes::SignupError;

pub type WebResult<T> = core::result::Result<T, Error>;

#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("signup error: {0}")]
    Signup(#[from] SignupError),

    #[error("templating error: {0}")]
    Tera(#[from] tera::Error),
}

impl Error {
    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        use ClientError::*;

        match self {
            Error::Signup(SignupError::DataParsing(_)) => (
                StatusCode::BAD_REQUEST,
                InvalidInput("Invalid email address"),
            ),
            Error::Signup(SignupError::MissingToken) => (
                StatusCode::BAD_REQUEST,
                InvalidInput("Missing Turnstile token"),
            ),
            Error::Signup(SignupError::Verification(_)) => {
                (StatusCode::BAD_REQUEST, VerificationFailed)
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, ServiceError),
        }
    }

    /// The cause part of the error name, e.g. `MissingToken` for `Error::Signup(MissingToken)`.
    pub fn kind(&self) -> &str {
        match self {
            Error::Signup(er) => er.as_ref(),
            Error::Tera(_) => self.as_ref(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::debug!("{:<12} - into_response(Error: {self:?})", "INTO_RESP");

        // Construct a response
        let mut res = StatusCode::INTERNAL_SERVER_ERROR.into_response();

        // Insert the Error into response so that it can be retrieved later.
        res.extensions_mut().insert(Arc::new(self));

        res
    }
}

/// What the caller gets to see. Its `Display` output is the response `message`.
#[derive(Debug, AsRefStr, derive_more::Display)]
pub enum ClientError {
    #[display("{_0}")]
    InvalidInput(&'static str),
    #[display("Verification failed")]
    VerificationFailed,
    #[display("Internal server error")]
    ServiceError,
}
