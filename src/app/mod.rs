pub mod serve;

// re-export
pub use serve::serve;

use std::{net::SocketAddr, sync::Arc};

use derive_more::Deref;
use tokio::net::TcpListener;
use tracing::info;

use crate::{
    config::AppConfig, database::DbManager, templ_manager::TemplateManager,
    turnstile::TurnstileClient, Result,
};

// ###################################
// ->  Structs
// ###################################
pub struct App {
    pub app_state: AppState,
    pub listener: TcpListener,
}
impl App {
    pub fn new(app_state: AppState, listener: TcpListener) -> Self {
        App {
            app_state,
            listener,
        }
    }

    /// Connects to the database, applies migrations and binds the listener.
    /// Binding port 0 lets the OS pick a free port, read it back with `App::local_addr`.
    pub async fn build_from_config(config: &AppConfig) -> Result<Self> {
        let dm = DbManager::init(config).await?;
        dm.migrate().await?;
        let tm = TemplateManager::init();

        let turnstile_config = &config.turnstile_config;
        let turnstile_client = match turnstile_config.secret() {
            Some(secret) => Some(TurnstileClient::new(
                &turnstile_config.url,
                secret.clone(),
                turnstile_config.timeout(),
            )?),
            None => {
                info!("{:<20} - No secret configured, signups are not verified", "turnstile");
                None
            }
        };

        let app_state = AppState::new(
            dm,
            tm,
            turnstile_client,
            config.net_config.base_url.clone(),
            turnstile_config.site_key().map(str::to_string),
        );

        let addr = SocketAddr::from((config.net_config.host, config.net_config.app_port));
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        info!("{:<20} - {}", "Listening on:", addr);

        let app = App::new(app_state, listener);
        Ok(app)
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }
}

pub struct InternalState {
    pub database_mgr: DbManager,
    pub templ_mgr: TemplateManager,
    /// `None` means verification is switched off.
    pub turnstile_client: Option<TurnstileClient>,
    pub base_url: String,
    pub site_key: Option<String>,
}

/// Application state containing all global data.
/// It implements `Deref` to easily access the fields on `InternalState`
/// Uses an `Arc` so it can be cloned around.
#[derive(Clone, Deref)]
pub struct AppState(Arc<InternalState>);

impl AppState {
    pub fn new(
        database_mgr: DbManager,
        templ_mgr: TemplateManager,
        turnstile_client: Option<TurnstileClient>,
        base_url: String,
        site_key: Option<String>,
    ) -> Self {
        AppState(Arc::new(InternalState {
            database_mgr,
            templ_mgr,
            turnstile_client,
            base_url,
            site_key,
        }))
    }
}
