/*
 * Responsibility
 * - Access decision shape returned by the authorizer (API Gateway policy document)
 * - Exact-resource check used by the gate to enforce that decision
 */
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const POLICY_VERSION: &str = "2012-10-17";
pub const INVOKE_ACTION: &str = "execute-api:Invoke";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub action: String,
    pub effect: Effect,
    pub resource: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<PolicyStatement>,
}

/// The authorizer's answer for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPolicy {
    pub principal_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_document: Option<PolicyDocument>,
    #[serde(default)]
    pub context: BTreeMap<String, String>,
}

impl AuthPolicy {
    /// A policy document is attached only when both `effect` and `resource` are given.
    pub fn generate(
        principal_id: impl Into<String>,
        effect: Option<Effect>,
        resource: Option<&str>,
        context: BTreeMap<String, String>,
    ) -> Self {
        let policy_document = match (effect, resource) {
            (Some(effect), Some(resource)) => Some(PolicyDocument {
                version: POLICY_VERSION.to_string(),
                statement: vec![PolicyStatement {
                    action: INVOKE_ACTION.to_string(),
                    effect,
                    resource: resource.to_string(),
                }],
            }),
            _ => None,
        };

        Self {
            principal_id: principal_id.into(),
            policy_document,
            context,
        }
    }

    /// True when the document allows invoking exactly `resource`.
    pub fn permits(&self, resource: &str) -> bool {
        self.policy_document.as_ref().is_some_and(|document| {
            document.statement.iter().any(|s| {
                s.effect == Effect::Allow && s.action == INVOKE_ACTION && s.resource == resource
            })
        })
    }
}
