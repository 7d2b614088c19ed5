//! Session storage.
//!
//! Sessions expire `ttl` after they were created or last saved. Expired
//! sessions are invisible to `get` and `save` immediately and are removed
//! for good by `purge_expired`.
//!
//! Expected PostgreSQL table:
//!
//! ```sql
//! CREATE TABLE sessions (
//!     token      TEXT PRIMARY KEY,
//!     attributes TEXT NOT NULL,
//!     expires_at TIMESTAMP NOT NULL
//! );
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{
    errors::{SessionError, SessionResult},
    models::{SessionAttributes, SessionToken},
};

/// Default session lifetime in seconds (24 hours)
pub const DEFAULT_SESSION_TTL_SECS: i64 = 86_400;

/// Expiry of a session created or saved at `now`.
fn expiry(now: DateTime<Utc>, ttl: Duration) -> SessionResult<DateTime<Utc>> {
    now.checked_add_signed(ttl)
        .ok_or_else(|| SessionError::Backend(format!("session ttl {ttl} overflows the clock")))
}

/// Maps opaque tokens to attribute sets.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Allocate a session and return its token
    async fn create(&self, attributes: &SessionAttributes) -> SessionResult<SessionToken>;

    /// Attributes of a live session; `None` if missing or expired
    async fn get(&self, token: &SessionToken) -> SessionResult<Option<SessionAttributes>>;

    /// Persist attributes of a live session and extend its expiry.
    ///
    /// Fails with `SessionError::NotFound` for unknown or expired tokens.
    async fn save(&self, token: &SessionToken, attributes: &SessionAttributes)
    -> SessionResult<()>;

    /// Expire a session now. Unknown tokens are ignored.
    async fn destroy(&self, token: &SessionToken) -> SessionResult<()>;

    /// Remove expired sessions, returning how many were dropped
    async fn purge_expired(&self) -> SessionResult<u64>;
}

/// PostgreSQL implementation of `SessionStore`
pub struct PgSessionStore {
    pool: PgPool,
    ttl: Duration,
}

impl PgSessionStore {
    pub fn new(pool: PgPool, ttl: Duration) -> Self {
        Self { pool, ttl }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, attributes: &SessionAttributes) -> SessionResult<SessionToken> {
        let token = SessionToken::generate();
        let expires_at = expiry(Utc::now(), self.ttl)?;

        sqlx::query("INSERT INTO sessions (token, attributes, expires_at) VALUES ($1, $2, $3)")
            .bind(token.as_str())
            .bind(serde_json::to_string(attributes)?)
            .bind(expires_at.naive_utc())
            .execute(&self.pool)
            .await?;

        Ok(token)
    }

    async fn get(&self, token: &SessionToken) -> SessionResult<Option<SessionAttributes>> {
        let row = sqlx::query("SELECT attributes FROM sessions WHERE token = $1 AND expires_at > $2")
            .bind(token.as_str())
            .bind(Utc::now().naive_utc())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let raw: String = row.get("attributes");
                Ok(Some(serde_json::from_str(&raw)?))
            }
            None => Ok(None),
        }
    }

    async fn save(
        &self,
        token: &SessionToken,
        attributes: &SessionAttributes,
    ) -> SessionResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET attributes = $2, expires_at = $3
            WHERE token = $1 AND expires_at > $4
            "#,
        )
        .bind(token.as_str())
        .bind(serde_json::to_string(attributes)?)
        .bind(expiry(now, self.ttl)?.naive_utc())
        .bind(now.naive_utc())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(SessionError::NotFound);
        }
        Ok(())
    }

    async fn destroy(&self, token: &SessionToken) -> SessionResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn purge_expired(&self) -> SessionResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(Utc::now().naive_utc())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

struct StoredSession {
    attributes: SessionAttributes,
    expires_at: DateTime<Utc>,
}

impl StoredSession {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// In-memory implementation of `SessionStore`
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionToken, StoredSession>>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Number of stored sessions, expired ones included until purged
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_SESSION_TTL_SECS))
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, attributes: &SessionAttributes) -> SessionResult<SessionToken> {
        let token = SessionToken::generate();
        let session = StoredSession {
            attributes: attributes.clone(),
            expires_at: expiry(Utc::now(), self.ttl)?,
        };

        self.sessions.write().await.insert(token.clone(), session);
        Ok(token)
    }

    async fn get(&self, token: &SessionToken) -> SessionResult<Option<SessionAttributes>> {
        let now = Utc::now();
        Ok(self
            .sessions
            .read()
            .await
            .get(token)
            .filter(|s| s.is_live(now))
            .map(|s| s.attributes.clone()))
    }

    async fn save(
        &self,
        token: &SessionToken,
        attributes: &SessionAttributes,
    ) -> SessionResult<()> {
        let now = Utc::now();
        let expires_at = expiry(now, self.ttl)?;
        let mut sessions = self.sessions.write().await;

        match sessions.get_mut(token) {
            Some(session) if session.is_live(now) => {
                session.attributes = attributes.clone();
                session.expires_at = expires_at;
                Ok(())
            }
            _ => Err(SessionError::NotFound),
        }
    }

    async fn destroy(&self, token: &SessionToken) -> SessionResult<()> {
        self.sessions.write().await.remove(token);
        Ok(())
    }

    async fn purge_expired(&self) -> SessionResult<u64> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, s| s.is_live(now));
        Ok((before - sessions.len()) as u64)
    }
}
