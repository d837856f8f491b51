/**
 * Server Configuration
 *
 * Turns the parts of `AppConfig` that name external services into live
 * handles: the optional PostgreSQL pool and the digest mailer.
 *
 * # Error Handling
 *
 * Failures here are logged but do not prevent startup. Without a database
 * the in-memory store is used; without a working SMTP relay mails are only
 * logged.
 */

use sqlx::PgPool;
use std::sync::Arc;

use crate::backend::digest::{LogMailer, Mailer, SmtpMailer};
use crate::shared::AppConfig;

/// Connect to PostgreSQL and run migrations
///
/// Returns `None` when no URL is configured or the connection fails.
pub async fn load_database(database_url: Option<&str>) -> Option<PgPool> {
    let Some(database_url) = database_url else {
        tracing::warn!("DATABASE_URL not set. Using the in-memory catalog store.");
        return None;
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Falling back to the in-memory catalog store.");
            return None;
        }
    };

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(_) => tracing::info!("Database migrations completed successfully"),
        Err(e) => {
            tracing::error!("Failed to run database migrations: {}", e);
            tracing::warn!("Continuing without migrations - database might not be up to date");
        }
    }

    Some(pool)
}

/// Build the digest mailer from configuration
pub fn load_mailer(config: &AppConfig) -> Arc<dyn Mailer> {
    let Some(smtp) = &config.smtp else {
        tracing::warn!("SMTP_HOST not set. Digest mails will only be logged.");
        return Arc::new(LogMailer);
    };

    match SmtpMailer::new(smtp, &config.mail_from) {
        Ok(mailer) => Arc::new(mailer),
        Err(e) => {
            tracing::error!("Failed to configure SMTP mailer: {}", e);
            tracing::warn!("Digest mails will only be logged.");
            Arc::new(LogMailer)
        }
    }
}
