//! Full runs: mock API on one side, scripted external client on the other.
#![cfg(unix)]

use axum::routing::get;
use axum::{Json, Router};
use clandiff_client::StaticTokens;
use clandiff_core::errors::ExErrorKind;
use clandiff_core::payload::{CompareOptions, Equivalence, NormalizeRules};
use clandiff_core::RunConfig;
use clandiff_engine::{run_compare, ExternalCommand, ExternalFetcher, InProcessFetcher};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

async fn start_api() -> String {
    let app = Router::new().route(
        "/v1/clans/:tag",
        get(|| async {
            Json(json!({
                "tag": "#2PP",
                "name": "Mock Clan",
                "clanPoints": 41000,
                "labels": [{"id": 1, "name": "Clan Wars"}],
                "timestamp": 1700000000,
                "_links": {}
            }))
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/v1", addr)
}

fn in_process(api: String) -> InProcessFetcher {
    let config = RunConfig::from_lookup(|name| match name {
        "COC_EMAIL" => Some("dev@example.com".to_string()),
        "COC_PASSWORD" => Some("pw".to_string()),
        _ => None,
    })
    .unwrap();
    InProcessFetcher::new(config.credentials)
        .with_api_url(api)
        .with_authenticator(Arc::new(StaticTokens::new(["t"])))
}

fn external(dir: &TempDir, json: &str) -> ExternalFetcher {
    let path = dir.path().join("out.json");
    std::fs::write(&path, json).unwrap();
    ExternalFetcher::new(ExternalCommand::new("cat").args([path.display().to_string()]))
}

#[tokio::test]
async fn test_equivalent_after_normalization() {
    let api = start_api().await;
    let dir = TempDir::new().unwrap();
    let right = external(
        &dir,
        r##"{"name": "Mock Clan", "tag": "#2PP", "clanPoints": 41000,
            "labels": [{"name": "Clan Wars", "id": 1}], "timestamp": 1}"##,
    );
    let mut progress = Vec::new();

    let report = run_compare(
        &in_process(api),
        &right,
        "#2PP",
        &CompareOptions::default(),
        &mut progress,
    )
    .await
    .unwrap();

    assert_eq!(report.equivalence, Equivalence::Identical);
    assert_eq!(report.clan_tag, "#2PP");
    let progress = String::from_utf8(progress).unwrap();
    assert!(progress.contains("Fetching clan #2PP using in-process client..."));
    assert!(progress.contains("Fetching clan using external client..."));
}

#[tokio::test]
async fn test_float_points_tolerated_unless_strict() {
    let api = start_api().await;
    let dir = TempDir::new().unwrap();
    let body = r##"{"tag": "#2PP", "name": "Mock Clan", "clanPoints": 41000.0,
                   "labels": [{"id": 1, "name": "Clan Wars"}]}"##;

    let report = run_compare(
        &in_process(api.clone()),
        &external(&dir, body),
        "#2PP",
        &CompareOptions::default(),
        &mut std::io::sink(),
    )
    .await
    .unwrap();
    assert_eq!(report.equivalence, Equivalence::Canonical);
    assert_eq!(
        report.summary,
        "Success: in-process and external responses match after key normalization."
    );

    let err = run_compare(
        &in_process(api),
        &external(&dir, body),
        "#2PP",
        &CompareOptions::default().strict(true),
        &mut std::io::sink(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Mismatch);
    assert_eq!(err.subject(), Some("root.clanPoints"));
}

#[tokio::test]
async fn test_first_difference_reported() {
    let api = start_api().await;
    let dir = TempDir::new().unwrap();
    let right = external(
        &dir,
        r##"{"tag": "#2PP", "name": "Mock Clan", "clanPoints": 41000,
            "labels": [{"id": 1, "name": "Clan War League"}]}"##,
    );

    let err = run_compare(
        &in_process(api),
        &right,
        "#2PP",
        &CompareOptions::default(),
        &mut std::io::sink(),
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Mismatch);
    assert_eq!(
        err.message(),
        "Mismatch detected between in-process and external payloads: \
         root.labels[0].name: value mismatch \"Clan Wars\" vs \"Clan War League\""
    );
}

#[tokio::test]
async fn test_extra_ignored_field_masks_difference() {
    let api = start_api().await;
    let dir = TempDir::new().unwrap();
    let right = external(
        &dir,
        r##"{"tag": "#2PP", "name": "Renamed", "clanPoints": 41000,
            "labels": [{"id": 1, "name": "Clan Wars"}]}"##,
    );
    let options =
        CompareOptions::default().with_rules(NormalizeRules::default().ignore_field("name"));

    let report = run_compare(
        &in_process(api),
        &right,
        "#2PP",
        &options,
        &mut std::io::sink(),
    )
    .await
    .unwrap();

    assert_eq!(report.equivalence, Equivalence::Identical);
}

#[tokio::test]
async fn test_external_failure_ends_run() {
    let api = start_api().await;
    let right = ExternalFetcher::new(ExternalCommand::new("sh").args(["-c", "exit 7"]));

    let err = run_compare(
        &in_process(api),
        &right,
        "#2PP",
        &CompareOptions::default(),
        &mut std::io::sink(),
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::ExternalProcess);
    assert_eq!(
        err.message(),
        "External client execution failed with exit code 7"
    );
}
