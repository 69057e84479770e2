pub mod auth_ctx;
pub mod json_body;
pub mod params;

pub use auth_ctx::{AuthCtx, AuthCtxExtractor};
pub use json_body::JsonBody;
pub use params::{PathParam, QueryParams};
