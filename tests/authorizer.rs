mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{
    CLIENT_ID, FOREIGN_KEY_PEM, KID, SIGNING_KEY_PEM, authorizer, call, id_claims, mint_token,
    now, request, sign_with, test_app, valid_token,
};
use notes_api::services::auth::{AuthorizerError, Effect};

const METHOD_ARN: &str = "arn:aws:execute-api:us-west-2:123456789012:abcdef/dev/GET/notes";

async fn rejected(token: &str) -> bool {
    matches!(
        authorizer().authorize(token, METHOD_ARN).await,
        Err(AuthorizerError::Unauthorized)
    )
}

#[tokio::test]
async fn valid_identity_token_gets_an_allow_policy_for_the_resource() {
    let authorized = authorizer()
        .authorize(&valid_token(), METHOD_ARN)
        .await
        .unwrap();

    let policy = authorized.policy;
    assert_eq!(policy.principal_id, "user");
    assert_eq!(policy.context.get("foo").map(String::as_str), Some("bar"));

    let document = policy.policy_document.as_ref().unwrap();
    assert_eq!(document.version, "2012-10-17");
    assert_eq!(document.statement.len(), 1);
    assert_eq!(document.statement[0].action, "execute-api:Invoke");
    assert_eq!(document.statement[0].effect, Effect::Allow);
    assert_eq!(document.statement[0].resource, METHOD_ARN);

    assert!(policy.permits(METHOD_ARN));
    assert!(!policy.permits("arn:aws:execute-api:us-west-2:123456789012:abcdef/dev/DELETE/notes"));

    assert_eq!(authorized.claims.username.as_deref(), Some("alice"));
}

#[tokio::test]
async fn bearer_prefix_is_stripped() {
    let token = format!("Bearer {}", valid_token());
    assert!(authorizer().authorize(&token, METHOD_ARN).await.is_ok());
}

#[tokio::test]
async fn tampered_payload_is_rejected() {
    let genuine = valid_token();
    let mut claims = id_claims();
    claims["sub"] = json!("someone-else");
    let other = mint_token(&claims);

    let genuine: Vec<&str> = genuine.split('.').collect();
    let other: Vec<&str> = other.split('.').collect();
    let forged = format!("{}.{}.{}", genuine[0], other[1], genuine[2]);

    assert!(rejected(&forged).await);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let mut claims = id_claims();
    claims["iat"] = json!(now() - 7200);
    claims["exp"] = json!(now() - 3600);

    assert!(rejected(&mint_token(&claims)).await);
}

#[tokio::test]
async fn token_from_another_user_pool_is_rejected() {
    let mut claims = id_claims();
    claims["iss"] = json!("https://cognito-idp.us-west-2.amazonaws.com/us-west-2_OtherPool");

    assert!(rejected(&mint_token(&claims)).await);
}

#[tokio::test]
async fn token_for_another_client_is_rejected() {
    let mut claims = id_claims();
    claims["aud"] = json!("some-other-client");

    assert!(rejected(&mint_token(&claims)).await);
}

#[tokio::test]
async fn access_tokens_are_not_identity_tokens() {
    let mut claims = id_claims();
    claims["token_use"] = json!("access");

    assert!(rejected(&mint_token(&claims)).await);
}

#[tokio::test]
async fn unpublished_signing_key_is_rejected() {
    // right kid, wrong key
    let token = sign_with(FOREIGN_KEY_PEM, Some(KID), &id_claims());
    assert!(rejected(&token).await);
}

#[tokio::test]
async fn unknown_or_missing_kid_is_rejected() {
    let unknown = sign_with(SIGNING_KEY_PEM, Some("no-such-key"), &id_claims());
    assert!(rejected(&unknown).await);

    let missing = sign_with(SIGNING_KEY_PEM, None, &id_claims());
    assert!(rejected(&missing).await);
}

#[tokio::test]
async fn garbage_and_blank_tokens_are_rejected() {
    assert!(rejected("").await);
    assert!(rejected("Bearer").await);
    assert!(rejected("not-a-jwt").await);
    assert!(rejected("Basic dXNlcjpwYXNz").await);
}

#[tokio::test]
async fn missing_subject_is_rejected() {
    let mut claims = id_claims();
    claims["sub"] = json!("");

    assert!(rejected(&mint_token(&claims)).await);
}

#[tokio::test]
async fn authorize_endpoint_returns_the_policy() {
    let (app, _store) = test_app();
    let event = json!({
        "type": "TOKEN",
        "authorizationToken": valid_token(),
        "methodArn": METHOD_ARN,
    });

    let (status, body) = call(
        &app,
        request("POST", "/api/v1/authorize", None, Some(&event.to_string())),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "principalId": "user",
            "policyDocument": {
                "Version": "2012-10-17",
                "Statement": [{
                    "Action": "execute-api:Invoke",
                    "Effect": "Allow",
                    "Resource": METHOD_ARN,
                }],
            },
            "context": {"foo": "bar"},
        })
    );
}

#[tokio::test]
async fn empty_method_arn_yields_no_policy_document() {
    let authorized = authorizer().authorize(&valid_token(), "").await.unwrap();
    assert!(authorized.policy.policy_document.is_none());
    assert!(!authorized.policy.permits(""));

    let (app, _store) = test_app();
    let event = json!({
        "type": "TOKEN",
        "authorizationToken": valid_token(),
        "methodArn": "",
    });
    let (status, body) = call(
        &app,
        request("POST", "/api/v1/authorize", None, Some(&event.to_string())),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"principalId": "user", "context": {"foo": "bar"}}));
}

#[tokio::test]
async fn authorize_endpoint_failure_is_opaque() {
    let (app, _store) = test_app();
    let mut claims = id_claims();
    claims["aud"] = json!(format!("{CLIENT_ID}-other"));
    let event = json!({
        "type": "TOKEN",
        "authorizationToken": mint_token(&claims),
        "methodArn": METHOD_ARN,
    });

    let (status, body) = call(
        &app,
        request("POST", "/api/v1/authorize", None, Some(&event.to_string())),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"message": "Unauthorized"}));
}
