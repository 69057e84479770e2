pub mod authorize;
pub mod health;
pub mod notes;
