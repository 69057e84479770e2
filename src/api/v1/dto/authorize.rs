use serde::Deserialize;

/// Token-authorizer event: the raw `Authorization` header value and the method being invoked.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeRequest {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    pub authorization_token: String,
    pub method_arn: String,
}
