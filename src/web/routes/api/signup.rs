use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::HeaderMap,
    Json,
};
use strum_macros::AsRefStr;
use tracing::{debug, info};

use crate::{
    database::{self, InsertOutcome, SignupStore},
    turnstile::{self, TurnstileClient},
    web::{
        types::{
            DataParsingError, NewSignup, NormalizedEmail, Platform, RequestContext,
            SignupResponse, SignupSubmission,
        },
        WebResult,
    },
    AppState,
};

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum SignupError {
    #[error("data parsing error: {0}")]
    DataParsing(#[from] DataParsingError),
    #[error("turnstile token missing from the submission")]
    MissingToken,
    #[error("turnstile verification failed: {0}")]
    Verification(#[from] turnstile::Error),

    #[error("failed to read the request body: {0}")]
    BodyReading(#[from] BytesRejection),
    #[error("failed to parse the request body: {0}")]
    BodyParsing(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Database(#[from] database::Error),
}

// ###################################
// ->   OUTCOME
// ###################################
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupOutcome {
    Registered,
    AlreadyRegistered,
}

impl SignupOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            SignupOutcome::Registered => "Email submitted successfully",
            SignupOutcome::AlreadyRegistered => "Email already registered",
        }
    }
}

impl From<SignupOutcome> for SignupResponse {
    fn from(outcome: SignupOutcome) -> Self {
        SignupResponse {
            success: true,
            message: outcome.message().to_string(),
        }
    }
}

// ###################################
// ->   API
// ###################################
/// The body is read as raw bytes so that an unreadable or malformed body ends up as an internal
/// error and field level problems are reported by `register` with their own messages.
#[tracing::instrument(name = "Registering a beta signup", skip_all)]
pub async fn signup(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> WebResult<Json<SignupResponse>> {
    let body = body.map_err(SignupError::BodyReading)?;
    let submission = SignupSubmission::from_slice(&body).map_err(SignupError::BodyParsing)?;
    let context = RequestContext::from_headers(&headers);

    let outcome = register(
        &app_state.database_mgr,
        app_state.turnstile_client.as_ref(),
        submission,
        context,
    )
    .await?;

    Ok(Json(outcome.into()))
}

/// Validates the submission, verifies the challenge token when `turnstile` is set and stores the
/// signup unless its email is already registered.
///
/// Checks run in order and the first failing one wins:
/// email contains `@`, token present, token verified.
/// Without a `turnstile` client no token is required.
#[tracing::instrument(
    name = "register",
    skip_all,
    fields(email = tracing::field::Empty, verify = turnstile.is_some())
)]
pub async fn register<S>(
    store: &S,
    turnstile: Option<&TurnstileClient>,
    submission: SignupSubmission,
    context: RequestContext,
) -> Result<SignupOutcome, SignupError>
where
    S: SignupStore,
{
    let raw_email = submission
        .email
        .as_deref()
        .ok_or(DataParsingError::EmailInvalid)?;
    let email = NormalizedEmail::parse(raw_email)?;
    tracing::Span::current().record("email", tracing::field::display(&email));

    if let Some(turnstile) = turnstile {
        let token = submission.token().ok_or(SignupError::MissingToken)?;
        turnstile
            .verify(token, context.ip_address.as_deref())
            .await?;
    }

    if store.signup_exists(&email).await? {
        info!("email already registered");
        return Ok(SignupOutcome::AlreadyRegistered);
    }

    let platform = submission.platform.as_deref().and_then(|value| {
        let platform = Platform::parse(value);
        if platform.is_none() {
            debug!(platform = value, "ignoring unknown platform");
        }
        platform
    });

    let signup = NewSignup::new(email, platform, context, submission.tracking);

    match store.insert_signup(&signup).await? {
        InsertOutcome::Inserted(id) => {
            info!(%id, "new beta signup stored");
            Ok(SignupOutcome::Registered)
        }
        InsertOutcome::AlreadyExists => {
            info!("email registered concurrently");
            Ok(SignupOutcome::AlreadyRegistered)
        }
    }
}
