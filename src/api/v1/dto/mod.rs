pub mod authorize;
pub mod notes;
