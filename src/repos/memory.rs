//! Process-local note table, used in development and tests.
//!
//! Each operation holds the write lock for its whole check-and-mutate step,
//! which gives the same per-record atomicity the remote backends provide.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::repos::error::{StoreError, StoreResult};
use crate::repos::note_repo::{Note, NotePatch, NoteStore};

#[derive(Debug, Default)]
pub struct MemoryNoteStore {
    notes: RwLock<HashMap<String, Note>>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.notes.read().await.len()
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn put_if_absent(&self, note: &Note) -> StoreResult<()> {
        let mut notes = self.notes.write().await;
        if notes.contains_key(&note.note_id) {
            return Err(StoreError::ConditionFailed);
        }
        notes.insert(note.note_id.clone(), note.clone());
        Ok(())
    }

    async fn scan(&self, limit: usize) -> StoreResult<Vec<Note>> {
        let notes = self.notes.read().await;
        Ok(notes.values().take(limit).cloned().collect())
    }

    async fn get(&self, note_id: &str) -> StoreResult<Option<Note>> {
        Ok(self.notes.read().await.get(note_id).cloned())
    }

    async fn update_if_exists(&self, note_id: &str, patch: &NotePatch) -> StoreResult<Note> {
        let mut notes = self.notes.write().await;
        let note = notes.get_mut(note_id).ok_or(StoreError::ConditionFailed)?;
        note.apply(patch);
        Ok(note.clone())
    }

    async fn delete_if_exists(&self, note_id: &str) -> StoreResult<()> {
        self.notes
            .write()
            .await
            .remove(note_id)
            .map(|_| ())
            .ok_or(StoreError::ConditionFailed)
    }
}
