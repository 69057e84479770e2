/// Factory: build the process-wide `NoteStore` from application `Config`.
use std::sync::Arc;

use crate::config::{Config, StoreBackend};
use crate::repos::{
    MemoryNoteStore, NoteStore, StoreResult, postgres::PgNoteStore, valkey::ValkeyNoteStore,
};

pub fn build_note_store(config: &Config) -> StoreResult<Arc<dyn NoteStore>> {
    let store: Arc<dyn NoteStore> = match &config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("using the in-memory note store; notes are lost on restart");
            Arc::new(MemoryNoteStore::new())
        }
        StoreBackend::Postgres(url) => Arc::new(PgNoteStore::connect_lazy(
            url,
            &config.notes_table_name,
            config.store_policy,
        )?),
        StoreBackend::Valkey(url) => Arc::new(ValkeyNoteStore::new(
            url,
            &config.notes_table_name,
            config.store_policy,
        )?),
    };

    tracing::info!(
        backend = store.backend_name(),
        table = %config.notes_table_name,
        max_attempts = config.store_policy.max_attempts,
        timeout_ms = config.store_policy.timeout.as_millis() as u64,
        "note store configured"
    );

    Ok(store)
}
