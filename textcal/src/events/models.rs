//! Event data models.

use serde::{Deserialize, Serialize};

/// Start and end of an event as reported by the date extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// A stored calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub id: i64,
    #[serde(skip)]
    pub username: String,
    pub title: String,
    pub start: String,
    pub end: String,
}
