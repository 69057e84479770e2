/*
 * Responsibility
 * - The Note record and the storage contract every backend implements
 * - Conditional semantics live in the backend (single-record atomic), never in handlers
 */
use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::error::StoreResult;

/// A persisted note. `note_id` and `timestamp` are assigned on creation and never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub note_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl Note {
    /// Build a new note with a fresh identifier and the current time.
    ///
    /// The timestamp is cut to milliseconds so every backend stores it unchanged.
    pub fn create(title: Option<String>, body: Option<String>) -> Self {
        Self {
            note_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().trunc_subsecs(3),
            title,
            body,
        }
    }

    pub fn apply(&mut self, patch: &NotePatch) {
        if let Some(title) = &patch.title {
            self.title = Some(title.clone());
        }
        if let Some(body) = &patch.body {
            self.body = Some(body.clone());
        }
    }
}

/// Fields to overwrite on update. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl NotePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none()
    }
}

/// Key-value table of notes addressed by `note_id`.
///
/// Implementations must be cheap to share (`Arc<dyn NoteStore>` in `AppState`).
#[async_trait]
pub trait NoteStore: Send + Sync + 'static {
    // Backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Insert the note unless a note with the same id exists.
    // -> Err(ConditionFailed) when the id is taken
    async fn put_if_absent(&self, note: &Note) -> StoreResult<()>;

    // Unfiltered traversal bounded by `limit`. No ordering guarantee.
    async fn scan(&self, limit: usize) -> StoreResult<Vec<Note>>;

    async fn get(&self, note_id: &str) -> StoreResult<Option<Note>>;

    // Overwrite the patched fields and return the whole record after the update.
    // -> Err(ConditionFailed) when the id does not exist
    async fn update_if_exists(&self, note_id: &str, patch: &NotePatch) -> StoreResult<Note>;

    // -> Err(ConditionFailed) when the id does not exist
    async fn delete_if_exists(&self, note_id: &str) -> StoreResult<()>;
}
