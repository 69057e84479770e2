/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 *   - notes: the process-wide store handle, auth: the authorizer (with its key cache)
 * - Cloned per request, so everything inside is behind Arc
 */
use std::sync::Arc;

use crate::repos::NoteStore;
use crate::services::auth::Authorizer;

#[derive(Clone)]
pub struct AppState {
    pub notes: Arc<dyn NoteStore>,
    pub auth: Arc<Authorizer>,
    // resource ids handed to the authorizer are `<prefix>/<METHOD><path>`
    pub resource_prefix: Arc<str>,
}

impl AppState {
    pub fn new(
        notes: Arc<dyn NoteStore>,
        auth: Arc<Authorizer>,
        resource_prefix: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            notes,
            auth,
            resource_prefix: resource_prefix.into(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("notes", &self.notes.backend_name())
            .field("auth", &self.auth)
            .field("resource_prefix", &self.resource_prefix)
            .finish()
    }
}
