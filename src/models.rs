use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One notebook: a video paired with rich-text notes and a playback position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notebook {
    pub id: i64,
    pub title: String,
    /// Canonical watch-URL, set at creation and never mutated afterward.
    pub video_url: String,
    /// Notes as HTML markup from the rich-text editor.
    pub notes: String,
    pub progress_time_seconds: u32,
    pub created_at: DateTime<Utc>,
}

/// A row read from an external database during import. The source's own id
/// is never carried over; the destination assigns fresh ids.
#[derive(Debug, Clone)]
pub struct ImportedNotebook {
    pub title: String,
    pub video_url: String,
    pub notes: String,
    pub progress_time_seconds: u32,
    /// Source timestamp text, preserved verbatim when the source has one.
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
}
