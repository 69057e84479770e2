/*
 * Responsibility
 * - The "authorized request" context handlers see
 * - The gate middleware verifies the token and stores this in request extensions;
 *   handlers only ever receive this type
 *
 * Notes
 * - Token verification and policy evaluation belong to middleware/services
 */

/// Context attached to an authorized request: the verified `sub` of the identity token.
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub subject: String,
}

impl AuthCtx {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }
}
