mod signups;

pub use signups::{InsertOutcome, SignupStore};

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, Connection, PgConnection, PgPool};
use tracing::info;

use crate::config::{AppConfig, DbConfig};

#[derive(Clone, Debug)]
pub struct DbManager {
    db: PgPool,
}

impl DbManager {
    pub async fn init(config: &AppConfig) -> Result<Self> {
        info!("{:<20} - Initializing the DB pool", "init_db");
        let max_cons = if cfg!(test) { 1 } else { 5 };

        let con_opts = config.db_config.connection_options();

        let db_pool = PgPoolOptions::new()
            .max_connections(max_cons)
            .acquire_timeout(Duration::from_millis(500))
            .connect_with(con_opts)
            .await
            .map_err(|_| Error::FailToCreatePool)?;

        Ok(Self { db: db_pool })
    }

    /// Applies the embedded `migrations/` to the connected database.
    pub async fn migrate(&self) -> Result<()> {
        info!("{:<20} - Running DB migrations", "migrate_db");
        sqlx::migrate!("./migrations").run(&self.db).await?;
        Ok(())
    }

    /// Creates the database named in `db_config` so that `init` can connect to it.
    /// Used by the integration tests, each of which runs against a freshly named database.
    pub async fn create_database(db_config: &DbConfig) -> Result<()> {
        let mut connection =
            PgConnection::connect_with(&db_config.connection_options_without_db()).await?;

        let sql = format!(r#"CREATE DATABASE "{}";"#, db_config.db_name);
        sqlx::query(&sql).execute(&mut connection).await?;

        Ok(())
    }

    pub fn db(&self) -> &PgPool {
        &self.db
    }
}

// ###################################
// ->   ERROR
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create db pool")]
    FailToCreatePool,
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("sqlx migration error: {0}")]
    SqlxMigrate(#[from] sqlx::migrate::MigrateError),
}
