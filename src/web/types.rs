//! Signup payloads: the lenient JSON submission, the normalized email, the platform,
//! the header derived request context and the record handed to the store.

use axum::http::HeaderMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use strum_macros::AsRefStr;

// ###################################
// ->   SUBMISSION
// ###################################
/// Deserializable signup submission.
///
/// Every field is optional and a value of the wrong JSON type is treated as missing,
/// so that validation can answer with a specific message instead of a generic rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupSubmission {
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub token: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub platform: Option<String>,
    #[serde(flatten)]
    pub tracking: Tracking,
}

/// Marketing attribution and locale hints supplied by the client.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tracking {
    #[serde(default, deserialize_with = "lenient_string")]
    pub utm_source: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub utm_medium: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub utm_campaign: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub utm_term: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub utm_content: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timezone: Option<String>,
}

impl SignupSubmission {
    /// Fails only if the body is not JSON at all.
    /// JSON that isn't an object is read as a submission without any fields.
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_slice(body)?;
        if value.is_object() {
            serde_json::from_value(value)
        } else {
            Ok(Self::default())
        }
    }

    /// The challenge token, if the client sent a non-empty one.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.is_empty())
    }
}

impl Tracking {
    /// Drops empty values so they get stored as NULL.
    fn into_non_empty(self) -> Self {
        Tracking {
            utm_source: non_empty(self.utm_source),
            utm_medium: non_empty(self.utm_medium),
            utm_campaign: non_empty(self.utm_campaign),
            utm_term: non_empty(self.utm_term),
            utm_content: non_empty(self.utm_content),
            language: non_empty(self.language),
            timezone: non_empty(self.timezone),
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(value) => Ok(Some(value)),
        _ => Ok(None),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// ###################################
// ->   VALIDATED TYPES
// ###################################
/// Lowercased and trimmed email, the form used for every lookup and for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEmail(String);

impl AsRef<str> for NormalizedEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NormalizedEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl NormalizedEmail {
    /// The only requirement is an `@` somewhere in the raw value.
    pub fn parse<S>(value: S) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref();

        if !value.contains('@') {
            return Err(DataParsingError::EmailInvalid);
        }

        Ok(NormalizedEmail(value.to_lowercase().trim().to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

impl Platform {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ios" => Some(Platform::Ios),
            "android" => Some(Platform::Android),
            _ => None,
        }
    }
}

/// Tracking data inferred from the request headers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub ip_address: Option<String>,
}

impl RequestContext {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let user_agent = header_string(headers, "user-agent");
        let referrer =
            header_string(headers, "referer").or_else(|| header_string(headers, "referrer"));

        // The first hop of `x-forwarded-for` is the client, proxies append to the right.
        let ip_address = match header_string(headers, "x-forwarded-for") {
            Some(forwarded) => forwarded
                .split(',')
                .next()
                .map(str::trim)
                .filter(|ip| !ip.is_empty())
                .map(str::to_string),
            None => header_string(headers, "x-real-ip"),
        };

        RequestContext {
            user_agent,
            referrer,
            ip_address,
        }
    }
}

/// Header values may carry non ASCII bytes (e.g. UTF-8 user agents), those are kept lossily
/// instead of being dropped.
fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .filter(|value| !value.is_empty())
}

/// A signup ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewSignup {
    pub email: NormalizedEmail,
    pub platform: Option<Platform>,
    pub context: RequestContext,
    pub tracking: Tracking,
}

impl NewSignup {
    pub fn new(
        email: NormalizedEmail,
        platform: Option<Platform>,
        context: RequestContext,
        tracking: Tracking,
    ) -> Self {
        NewSignup {
            email,
            platform,
            context,
            tracking: tracking.into_non_empty(),
        }
    }
}

// ###################################
// ->   RESPONSE
// ###################################
/// The body of every response of the signup endpoint.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignupResponse {
    pub success: bool,
    pub message: String,
}

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum DataParsingError {
    #[error("email invalid")]
    EmailInvalid,
}
