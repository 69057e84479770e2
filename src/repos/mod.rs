pub mod error;
pub mod factory;
pub mod memory;
pub mod note_repo;
pub mod postgres;
pub mod retry;
pub mod valkey;

pub use error::{StoreError, StoreResult};
pub use factory::build_note_store;
pub use memory::MemoryNoteStore;
pub use note_repo::{Note, NotePatch, NoteStore};
pub use retry::ClientPolicy;
