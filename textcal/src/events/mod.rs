//! Calendar events whose dates come from free text.
//!
//! Date parsing is delegated to a [`DateExtractor`]. The bundled
//! [`ProcessDateExtractor`] runs an external script; anything else that
//! implements the trait can stand in for it.

pub mod errors;
pub mod extractor;
pub mod manager;
pub mod models;
pub mod store;

pub use errors::{EventError, EventResult, ExtractionError};
pub use extractor::{DEFAULT_EXTRACTOR_TIMEOUT, DateExtractor, ProcessDateExtractor};
pub use manager::EventManager;
pub use models::{DateRange, Event};
pub use store::{EventStore, MemoryEventStore, PgEventStore};
