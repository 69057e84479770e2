pub mod authorizer;
pub mod factory;
pub mod id_token;
pub mod jwks;
pub mod policy;

pub use authorizer::{Authorized, Authorizer, AuthorizerError};
pub use factory::build_authorizer;
pub use id_token::{IdTokenClaims, IdTokenVerifier};
pub use policy::{AuthPolicy, Effect};
