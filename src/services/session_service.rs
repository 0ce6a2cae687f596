use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::{de::DeserializeOwned, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::database::session_repo;
use crate::services::ticket_id_service;

/// Key holding the ticket id of the submission in progress.
pub const TEMP_TICKET_ID_KEY: &str = "temp_ticket_id";

/// Held while a payment proof is being uploaded and saved.
pub const PROOF_SUBMISSION_KEY: &str = "proof_submission";

/// A submission marker older than this is treated as left behind by a
/// request that never finished.
const SUBMISSION_MARKER_TTL_MINUTES: i64 = 5;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage failed: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("session value {key} is unreadable: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Key-value context that lives as long as one browser session.
#[async_trait]
pub trait SessionContext: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;
    async fn remove(&self, key: &str) -> Result<(), SessionError>;

    /// Stores `value` under `key` unless another live holder already has it.
    async fn claim(&self, key: &str, value: &str) -> Result<bool, SessionError>;

    async fn ticket_id(&self) -> Result<Option<String>, SessionError> {
        self.get(TEMP_TICKET_ID_KEY).await
    }

    /// Returns the session's ticket id, minting and storing one on first use.
    async fn ticket_id_or_generate(&self) -> Result<String, SessionError> {
        if let Some(existing) = self.ticket_id().await? {
            return Ok(existing);
        }
        let ticket_id = ticket_id_service::generate_ticket_id();
        self.set(TEMP_TICKET_ID_KEY, &ticket_id).await?;
        info!("🎟️ Minted ticket id {}", ticket_id);
        Ok(ticket_id)
    }

    async fn clear_ticket_id(&self) -> Result<(), SessionError> {
        self.remove(TEMP_TICKET_ID_KEY).await
    }

    /// False when another request of this session is already submitting.
    async fn begin_proof_submission(&self) -> Result<bool, SessionError> {
        self.claim(PROOF_SUBMISSION_KEY, &Utc::now().to_rfc3339())
            .await
    }

    async fn end_proof_submission(&self) -> Result<(), SessionError> {
        self.remove(PROOF_SUBMISSION_KEY).await
    }
}

pub async fn load_json<T, S>(session: &S, key: &str) -> Result<Option<T>, SessionError>
where
    T: DeserializeOwned,
    S: SessionContext + ?Sized,
{
    let Some(raw) = session.get(key).await? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| SessionError::Corrupt {
            key: key.to_string(),
            source,
        })
}

pub async fn store_json<T, S>(session: &S, key: &str, value: &T) -> Result<(), SessionError>
where
    T: Serialize + ?Sized,
    S: SessionContext + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| SessionError::Corrupt {
        key: key.to_string(),
        source,
    })?;
    session.set(key, &raw).await
}

/// Session values kept in the local SQLite database, keyed by the
/// `session_id` cookie.
#[derive(Debug, Clone)]
pub struct SqliteSession {
    pool: SqlitePool,
    session_id: String,
}

impl SqliteSession {
    pub fn new(pool: SqlitePool, session_id: impl Into<String>) -> Self {
        Self {
            pool,
            session_id: session_id.into(),
        }
    }
}

#[async_trait]
impl SessionContext for SqliteSession {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(session_repo::load_session_value(&self.pool, &self.session_id, key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        session_repo::upsert_session_value(&self.pool, &self.session_id, key, value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        session_repo::delete_session_value(&self.pool, &self.session_id, key).await?;
        Ok(())
    }

    async fn claim(&self, key: &str, value: &str) -> Result<bool, SessionError> {
        let stale_before = Utc::now() - Duration::minutes(SUBMISSION_MARKER_TTL_MINUTES);
        Ok(
            session_repo::claim_session_value(
                &self.pool,
                &self.session_id,
                key,
                value,
                stale_before,
            )
            .await?,
        )
    }
}

/// Deletes session values idle for longer than `idle`. The session cookie
/// carries no expiry, so abandoned sessions are only reclaimed here.
pub async fn sweep_idle_sessions(pool: &SqlitePool, idle: Duration) -> sqlx::Result<u64> {
    let removed = session_repo::delete_stale_session_values(pool, Utc::now() - idle).await?;
    if removed > 0 {
        info!("🧹 Removed {} idle session values", removed);
    }
    Ok(removed)
}
