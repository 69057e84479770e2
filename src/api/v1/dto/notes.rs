/*
 * Responsibility
 * - Notes request DTOs (the response side is repos::Note itself)
 * - A field counts as supplied only when present and non-empty
 */
use serde::Deserialize;

use crate::repos::NotePatch;

pub const DEFAULT_LIST_LIMIT: usize = 10;

/// Body of create and update: `{title?, body?}`.
#[derive(Debug, Default, Deserialize)]
pub struct NoteInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

impl NoteInput {
    /// Only non-empty fields become part of an update.
    pub fn into_patch(self) -> Result<NotePatch, &'static str> {
        let patch = NotePatch {
            title: self.title.filter(|s| !s.is_empty()),
            body: self.body.filter(|s| !s.is_empty()),
        };
        if patch.is_empty() {
            return Err("The request must contain either a title or a body");
        }
        Ok(patch)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListNotesQuery {
    pub limit: Option<String>,
}

impl ListNotesQuery {
    pub fn limit(&self) -> Result<usize, &'static str> {
        match self.limit.as_deref().map(str::trim) {
            None | Some("") => Ok(DEFAULT_LIST_LIMIT),
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or("limit must be a positive integer"),
        }
    }
}
