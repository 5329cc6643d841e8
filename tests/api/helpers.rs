//! Spins up the whole application against a freshly created database.

use std::{net::SocketAddr, sync::OnceLock};

use anyhow::Result;
use beta_signup::{
    config::{get_or_init_config, AppConfig},
    database::DbManager,
    init_dbg_tracing, App,
};
use secrecy::SecretString;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const TURNSTILE_PATH: &str = "/turnstile/v0/siteverify";

pub struct TestApp {
    pub addr: SocketAddr,
    pub dm: DbManager,
    pub http_client: reqwest::Client,
    pub turnstile_server: MockServer,
}

/// A stored signup row as read back from the database.
#[derive(Debug, FromRow)]
pub struct SignupRow {
    pub email: String,
    pub platform: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub ip_address: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub language: Option<String>,
    pub timezone: Option<String>,
}

fn _init_test_subscriber() {
    static SUBSCRIBER: OnceLock<()> = OnceLock::new();
    SUBSCRIBER.get_or_init(|| {
        init_dbg_tracing();
    });
}

impl TestApp {
    /// Verification switched off.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with_secret(None).await
    }

    /// Verification switched on, `siteverify` served by `turnstile_server`.
    pub async fn spawn_with_turnstile() -> Result<Self> {
        Self::spawn_with_secret(Some("test-turnstile-secret")).await
    }

    async fn spawn_with_secret(secret: Option<&str>) -> Result<Self> {
        // _init_test_subscriber();

        let turnstile_server = MockServer::start().await;

        let mut config: AppConfig = get_or_init_config().clone();
        // Trying to bind port 0 will trigger an OS scan for an available port.
        config.net_config.app_port = 0;
        config.net_config.host = [127, 0, 0, 1];
        config.db_config.db_name = Uuid::new_v4().to_string();
        config.turnstile_config.url = format!("{}{TURNSTILE_PATH}", turnstile_server.uri());
        config.turnstile_config.timeout_millis = 200;
        config.turnstile_config.secret_key = secret.map(|s| SecretString::from(s.to_string()));
        config.turnstile_config.site_key = secret.map(|_| "test-site-key".to_string());

        DbManager::create_database(&config.db_config).await?;

        let app = App::build_from_config(&config).await?;
        let addr = app.local_addr()?;
        let dm = app.app_state.database_mgr.clone();

        tokio::spawn(beta_signup::serve(app));

        Ok(TestApp {
            addr,
            dm,
            http_client: reqwest::Client::new(),
            turnstile_server,
        })
    }

    pub fn url(&self, route: &str) -> String {
        format!("http://{}{route}", self.addr)
    }

    pub async fn api_signup_post(&self, body: &Value) -> Result<reqwest::Response> {
        let res = self
            .http_client
            .post(self.url("/api/signup"))
            .json(body)
            .send()
            .await?;
        Ok(res)
    }

    /// Makes `siteverify` answer every request with `{"success": success}`.
    pub async fn turnstile_answers(&self, success: bool, expected_calls: u64) {
        Mock::given(path(TURNSTILE_PATH))
            .and(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": success })),
            )
            .expect(expected_calls)
            .mount(&self.turnstile_server)
            .await;
    }

    pub async fn signups(&self) -> Result<Vec<SignupRow>> {
        let rows = sqlx::query_as::<_, SignupRow>(
            r#"SELECT email, platform, user_agent, referrer, ip_address,
            utm_source, utm_medium, utm_campaign, utm_term, utm_content,
            language, timezone
            FROM beta_signups ORDER BY created_at"#,
        )
        .fetch_all(self.dm.db())
        .await?;
        Ok(rows)
    }
}
