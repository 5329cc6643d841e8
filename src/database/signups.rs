use std::future::Future;

use sqlx::postgres::PgDatabaseError;
use tracing::debug;
use uuid::Uuid;

use super::{DbManager, Result};
use crate::web::types::{NewSignup, NormalizedEmail};

/// Postgres `unique_violation`
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(Uuid),
    /// The insert hit the unique constraint on `email`.
    AlreadyExists,
}

/// Persistence needed by the signup endpoint.
///
/// The existence check and the insert are separate calls, so two identical submissions can both
/// pass the check. Implementations must enforce email uniqueness themselves and report the losing
/// insert as `InsertOutcome::AlreadyExists`.
pub trait SignupStore {
    fn signup_exists(&self, email: &NormalizedEmail) -> impl Future<Output = Result<bool>> + Send;

    fn insert_signup(&self, signup: &NewSignup)
        -> impl Future<Output = Result<InsertOutcome>> + Send;
}

impl SignupStore for DbManager {
    async fn signup_exists(&self, email: &NormalizedEmail) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM beta_signups WHERE email = $1)"#)
                .bind(email.as_ref())
                .fetch_one(self.db())
                .await?;

        Ok(exists)
    }

    async fn insert_signup(&self, signup: &NewSignup) -> Result<InsertOutcome> {
        let NewSignup {
            email,
            platform,
            context,
            tracking,
        } = signup;

        let query_result: std::result::Result<Uuid, sqlx::Error> = sqlx::query_scalar(
            r#"
            INSERT INTO beta_signups (
                email, platform, user_agent, referrer, ip_address,
                utm_source, utm_medium, utm_campaign, utm_term, utm_content,
                language, timezone
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
        "#,
        )
        .bind(email.as_ref())
        .bind(platform.as_ref().map(AsRef::<str>::as_ref))
        .bind(context.user_agent.as_deref())
        .bind(context.referrer.as_deref())
        .bind(context.ip_address.as_deref())
        .bind(tracking.utm_source.as_deref())
        .bind(tracking.utm_medium.as_deref())
        .bind(tracking.utm_campaign.as_deref())
        .bind(tracking.utm_term.as_deref())
        .bind(tracking.utm_content.as_deref())
        .bind(tracking.language.as_deref())
        .bind(tracking.timezone.as_deref())
        .fetch_one(self.db())
        .await;

        match query_result {
            Ok(id) => Ok(InsertOutcome::Inserted(id)),
            Err(sqlx::Error::Database(er))
                if er
                    .try_downcast_ref::<PgDatabaseError>()
                    .is_some_and(|er| er.code() == UNIQUE_VIOLATION) =>
            {
                debug!("lost the insert race for an already registered email");
                Ok(InsertOutcome::AlreadyExists)
            }
            Err(er) => Err(er.into()),
        }
    }
}
