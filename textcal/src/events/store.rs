//! Event storage.
//!
//! Expected PostgreSQL table:
//!
//! ```sql
//! CREATE TABLE events (
//!     id         BIGSERIAL PRIMARY KEY,
//!     username   TEXT NOT NULL REFERENCES users (username),
//!     title      TEXT NOT NULL,
//!     start_date TEXT NOT NULL,
//!     end_date   TEXT NOT NULL
//! );
//! ```

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use tokio::sync::RwLock;

use super::{
    errors::EventResult,
    models::{DateRange, Event},
};

/// Per-user event storage.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Store an event and return it with its id
    async fn insert(&self, username: &str, title: &str, range: &DateRange) -> EventResult<Event>;

    /// Remove one event matching all fields; `false` if none matched
    async fn remove_one(&self, username: &str, title: &str, range: &DateRange)
    -> EventResult<bool>;

    /// All events of a user, ordered by start date
    async fn list_for_user(&self, username: &str) -> EventResult<Vec<Event>>;
}

/// PostgreSQL implementation of `EventStore`
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn event_from_row(row: &PgRow) -> Event {
    Event {
        id: row.get("id"),
        username: row.get("username"),
        title: row.get("title"),
        start: row.get("start_date"),
        end: row.get("end_date"),
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn insert(&self, username: &str, title: &str, range: &DateRange) -> EventResult<Event> {
        let row = sqlx::query(
            r#"
            INSERT INTO events (username, title, start_date, end_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, title, start_date, end_date
            "#,
        )
        .bind(username)
        .bind(title)
        .bind(&range.start)
        .bind(&range.end)
        .fetch_one(&self.pool)
        .await?;

        Ok(event_from_row(&row))
    }

    async fn remove_one(
        &self,
        username: &str,
        title: &str,
        range: &DateRange,
    ) -> EventResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM events
            WHERE id = (
                SELECT id FROM events
                WHERE username = $1 AND title = $2 AND start_date = $3 AND end_date = $4
                ORDER BY id
                LIMIT 1
            )
            "#,
        )
        .bind(username)
        .bind(title)
        .bind(&range.start)
        .bind(&range.end)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_for_user(&self, username: &str) -> EventResult<Vec<Event>> {
        let rows = sqlx::query(
            r#"
            SELECT id, username, title, start_date, end_date
            FROM events
            WHERE username = $1
            ORDER BY start_date, id
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(event_from_row).collect())
    }
}

#[derive(Default)]
struct MemoryEvents {
    next_id: i64,
    events: Vec<Event>,
}

/// In-memory implementation of `EventStore`
#[derive(Default)]
pub struct MemoryEventStore {
    inner: RwLock<MemoryEvents>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn insert(&self, username: &str, title: &str, range: &DateRange) -> EventResult<Event> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;

        let event = Event {
            id: inner.next_id,
            username: username.to_string(),
            title: title.to_string(),
            start: range.start.clone(),
            end: range.end.clone(),
        };
        inner.events.push(event.clone());
        Ok(event)
    }

    async fn remove_one(
        &self,
        username: &str,
        title: &str,
        range: &DateRange,
    ) -> EventResult<bool> {
        let mut inner = self.inner.write().await;

        let position = inner.events.iter().position(|e| {
            e.username == username && e.title == title && e.start == range.start && e.end == range.end
        });

        match position {
            Some(index) => {
                inner.events.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_for_user(&self, username: &str) -> EventResult<Vec<Event>> {
        let inner = self.inner.read().await;

        let mut events: Vec<Event> = inner
            .events
            .iter()
            .filter(|e| e.username == username)
            .cloned()
            .collect();
        events.sort_by(|a, b| a.start.cmp(&b.start).then(a.id.cmp(&b.id)));
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: &str, end: &str) -> DateRange {
        DateRange {
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let store = MemoryEventStore::new();
        let a = store.insert("alice", "a", &range("1", "2")).await.unwrap();
        let b = store.insert("alice", "b", &range("1", "2")).await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn test_remove_one_removes_a_single_duplicate() {
        let store = MemoryEventStore::new();
        let r = range("2024-05-01", "2024-05-01");
        store.insert("alice", "dentist", &r).await.unwrap();
        store.insert("alice", "dentist", &r).await.unwrap();

        assert!(store.remove_one("alice", "dentist", &r).await.unwrap());
        assert_eq!(store.list_for_user("alice").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_is_scoped_to_owner() {
        let store = MemoryEventStore::new();
        let r = range("2024-05-01", "2024-05-01");
        store.insert("alice", "dentist", &r).await.unwrap();

        assert!(!store.remove_one("bob", "dentist", &r).await.unwrap());
        assert_eq!(store.list_for_user("alice").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_is_sorted_and_filtered() {
        let store = MemoryEventStore::new();
        store.insert("alice", "later", &range("2024-06-01", "2024-06-01")).await.unwrap();
        store.insert("bob", "other", &range("2024-01-01", "2024-01-01")).await.unwrap();
        store.insert("alice", "sooner", &range("2024-05-01", "2024-05-01")).await.unwrap();

        let titles: Vec<String> = store
            .list_for_user("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["sooner", "later"]);
    }
}
