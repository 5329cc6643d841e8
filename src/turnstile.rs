use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Verifies Cloudflare Turnstile tokens against the `siteverify` endpoint.
///
/// Every call is a single attempt bounded by the timeout the client was built with.
#[derive(Debug)]
pub struct TurnstileClient {
    http_client: Client,
    url: reqwest::Url,
    secret: SecretString,
}

impl TurnstileClient {
    pub fn new<S: AsRef<str>>(
        url: S,
        secret: SecretString,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let url =
            reqwest::Url::parse(url.as_ref()).map_err(|e| Error::UrlParsing(e.to_string()))?;

        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(TurnstileClient {
            http_client,
            url,
            secret,
        })
    }

    /// Returns `Ok(())` only if the verifier answered with `"success": true`.
    pub async fn verify(&self, token: &str, remote_ip: Option<&str>) -> Result<()> {
        let request = SiteverifyRequest {
            secret: self.secret.expose_secret(),
            response: token,
            remoteip: remote_ip,
        };

        let resp: SiteverifyResponse = self
            .http_client
            .post(self.url.clone())
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!(success = resp.success, error_codes = ?resp.error_codes, "siteverify response");

        if resp.success {
            Ok(())
        } else {
            Err(Error::Rejected(resp.error_codes))
        }
    }
}

#[derive(Serialize)]
struct SiteverifyRequest<'a> {
    secret: &'a str,
    response: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    remoteip: Option<&'a str>,
}

#[derive(Deserialize)]
struct SiteverifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

// ###################################
// ->   ERROR & RESULT
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse the siteverify url: {0}")]
    UrlParsing(String),
    #[error("token rejected by the verifier: {0:?}")]
    Rejected(Vec<String>),

    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
}
