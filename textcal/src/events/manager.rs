//! Event manager implementation.

use std::sync::Arc;

use super::{
    errors::{EventError, EventResult},
    extractor::DateExtractor,
    models::{DateRange, Event},
    store::EventStore,
};

/// Registers and removes a user's events, resolving dates through a
/// [`DateExtractor`].
#[derive(Clone)]
pub struct EventManager {
    extractor: Arc<dyn DateExtractor>,
    store: Arc<dyn EventStore>,
}

impl EventManager {
    pub fn new(extractor: Arc<dyn DateExtractor>, store: Arc<dyn EventStore>) -> Self {
        Self { extractor, store }
    }

    async fn resolve(&self, text: &str) -> EventResult<DateRange> {
        if text.trim().is_empty() {
            return Err(EventError::EmptyText);
        }
        if text.contains('\0') {
            return Err(EventError::InvalidText);
        }
        Ok(self.extractor.extract(text).await?)
    }

    /// Extract dates from `text` and store it as an event owned by `username`.
    ///
    /// # Errors
    ///
    /// * `EventError::EmptyText` - Text is empty or whitespace
    /// * `EventError::InvalidText` - Text contains a NUL character
    /// * `EventError::NoDateFound` - Extractor found no date
    /// * `EventError::Extraction` - Extractor failed
    /// * `EventError::Database` - Storage failure
    pub async fn register(&self, username: &str, text: &str) -> EventResult<Event> {
        let range = self.resolve(text).await?;
        let event = self.store.insert(username, text, &range).await?;

        log::info!("Event {} registered for {username}", event.id);
        Ok(event)
    }

    /// Remove one event of `username` matching `text` and its extracted dates.
    ///
    /// Returns the dates of the removed event.
    ///
    /// # Errors
    ///
    /// Same as [`register`](Self::register), plus `EventError::NotFound` when
    /// no event matches.
    pub async fn remove(&self, username: &str, text: &str) -> EventResult<DateRange> {
        let range = self.resolve(text).await?;

        if !self.store.remove_one(username, text, &range).await? {
            return Err(EventError::NotFound);
        }
        Ok(range)
    }

    /// Events of `username`, ordered by start date
    pub async fn list(&self, username: &str) -> EventResult<Vec<Event>> {
        self.store.list_for_user(username).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ExtractionError, MemoryEventStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Treats the first word as both start and end; "nodate" yields no date.
    #[derive(Default)]
    struct FirstWordExtractor {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DateExtractor for FirstWordExtractor {
        async fn extract(&self, text: &str) -> Result<DateRange, ExtractionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match text.split_whitespace().next() {
                Some("nodate") | None => Err(ExtractionError::NoDate("no date info".to_string())),
                Some(word) => Ok(DateRange {
                    start: word.to_string(),
                    end: word.to_string(),
                }),
            }
        }
    }

    fn manager() -> (EventManager, Arc<FirstWordExtractor>) {
        let extractor = Arc::new(FirstWordExtractor::default());
        let manager = EventManager::new(extractor.clone(), Arc::new(MemoryEventStore::new()));
        (manager, extractor)
    }

    #[tokio::test]
    async fn test_register_and_list() {
        let (events, _) = manager();

        let event = events.register("alice", "2024-05-01 dentist").await.unwrap();
        assert_eq!(event.start, "2024-05-01");
        assert_eq!(event.title, "2024-05-01 dentist");

        let listed = events.list("alice").await.unwrap();
        assert_eq!(listed, vec![event]);
        assert!(events.list("bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_text_skips_extractor() {
        let (events, extractor) = manager();

        assert!(matches!(
            events.register("alice", "   ").await,
            Err(EventError::EmptyText)
        ));
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_nul_in_text_is_rejected_before_extraction() {
        let (events, extractor) = manager();

        assert!(matches!(
            events.register("alice", "2024-05-01\0dentist").await,
            Err(EventError::InvalidText)
        ));
        assert!(matches!(
            events.remove("alice", "2024-05-01\0dentist").await,
            Err(EventError::InvalidText)
        ));
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_date() {
        let (events, _) = manager();
        assert!(matches!(
            events.register("alice", "nodate at all").await,
            Err(EventError::NoDateFound(_))
        ));
    }

    #[tokio::test]
    async fn test_remove() {
        let (events, _) = manager();
        events.register("alice", "2024-05-01 dentist").await.unwrap();

        let range = events.remove("alice", "2024-05-01 dentist").await.unwrap();
        assert_eq!(range.start, "2024-05-01");

        assert!(matches!(
            events.remove("alice", "2024-05-01 dentist").await,
            Err(EventError::NotFound)
        ));
    }
}
