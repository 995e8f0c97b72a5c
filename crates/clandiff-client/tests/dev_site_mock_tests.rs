//! End-to-end client tests against a local mock of the developer site and API.

mod support;

use clandiff_client::auth::DEFAULT_KEY_NAME;
use clandiff_client::{Client, ClientError, DevSiteAuthenticator, RawPayload};
use clandiff_core_types::Sensitive;
use serde_json::json;
use support::{api_key, clan_body, CALLER_IP, PASSWORD};

fn password() -> Sensitive<String> {
    Sensitive::new(PASSWORD.to_string())
}

fn client_for(server: &support::MockServer, raw: bool) -> Client {
    Client::builder()
        .base_url(server.api_url())
        .raw_attribute(raw)
        .authenticator(DevSiteAuthenticator::with_base_url(server.dev_site_url()).unwrap())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_login_reuses_key_bound_to_caller_ip() {
    let server = support::start(vec![api_key(
        "k1",
        DEFAULT_KEY_NAME,
        "existing-token",
        &format!("{CALLER_IP}/32"),
    )])
    .await;

    let mut client = client_for(&server, true);
    client.login("dev@example.com", &password()).await.unwrap();
    let clan = client.get_clan("#2pp").await.unwrap();

    assert_eq!(clan.tag, "#2PP");
    assert_eq!(server.created(), 0);
    assert!(server.revoked().is_empty());
    client.close().await;
}

#[tokio::test]
async fn test_login_revokes_stale_key_and_creates_new_one() {
    let server = support::start(vec![
        api_key("stale", DEFAULT_KEY_NAME, "old-token", "10.9.9.9/32"),
        api_key("other", "someone else's key", "foreign", "10.9.9.9/32"),
    ])
    .await;

    let mut client = client_for(&server, false);
    client.login("dev@example.com", &password()).await.unwrap();

    assert_eq!(server.revoked(), vec!["stale".to_string()]);
    assert_eq!(server.created(), 1);

    // The freshly created key is the one the API accepts.
    client.get_clan("2PP").await.unwrap();
}

#[tokio::test]
async fn test_raw_payload_matches_response_body() {
    let server = support::start(Vec::new()).await;

    let mut client = client_for(&server, true);
    client.login("dev@example.com", &password()).await.unwrap();
    let clan = client.get_clan("#2PP").await.unwrap();

    assert_eq!(clan.raw_payload(), Some(&clan_body()));
    assert_eq!(clan.raw_payload().unwrap()["chatLanguage"]["name"], json!("English"));
}

#[tokio::test]
async fn test_raw_payload_absent_without_raw_attribute() {
    let server = support::start(Vec::new()).await;

    let mut client = client_for(&server, false);
    client.login("dev@example.com", &password()).await.unwrap();
    let clan = client.get_clan("#2PP").await.unwrap();

    assert_eq!(clan.name, "Mock Clan");
    assert!(clan.raw_payload().is_none());
}

#[tokio::test]
async fn test_wrong_password_is_invalid_credentials() {
    let server = support::start(Vec::new()).await;

    let mut client = client_for(&server, true);
    let err = client
        .login("dev@example.com", &Sensitive::new("nope".to_string()))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::InvalidCredentials));
    assert!(!client.is_logged_in());
}

#[tokio::test]
async fn test_unknown_clan_is_not_found_with_corrected_tag() {
    let server = support::start(Vec::new()).await;

    let mut client = client_for(&server, true);
    client.login("dev@example.com", &password()).await.unwrap();
    let err = client.get_clan("ooo").await.unwrap_err();

    match err {
        ClientError::NotFound { tag } => assert_eq!(tag, "#000"),
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert_eq!(server.clan_requests(), vec!["#000".to_string()]);
}

#[tokio::test]
async fn test_upstream_error_status_is_reported() {
    let server = support::start(Vec::new()).await;
    server.state.lock().unwrap().fail_clans_with = Some(503);

    let mut client = client_for(&server, true);
    client.login("dev@example.com", &password()).await.unwrap();
    let err = client.get_clan("#2PP").await.unwrap_err();

    match err {
        ClientError::Status { status, body, .. } => {
            assert_eq!(status, 503);
            assert!(body.contains("upstream exploded"));
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fixed_ip_overrides_token_ip() {
    let server = support::start(vec![api_key(
        "pinned",
        DEFAULT_KEY_NAME,
        "pinned-token",
        "192.0.2.10/32",
    )])
    .await;

    let auth = DevSiteAuthenticator::with_base_url(server.dev_site_url())
        .unwrap()
        .fixed_ip("192.0.2.10");
    let mut client = Client::builder()
        .base_url(server.api_url())
        .authenticator(auth)
        .build()
        .unwrap();
    client.login("dev@example.com", &password()).await.unwrap();

    assert_eq!(server.created(), 0);
    assert!(server.revoked().is_empty());
    client.get_clan("#2PP").await.unwrap();
}
