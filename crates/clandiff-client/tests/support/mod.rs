//! In-process stand-in for the developer site and the public API.

#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

pub const PASSWORD: &str = "correct-horse";
pub const CALLER_IP: &str = "127.0.0.1";

#[derive(Default)]
pub struct MockState {
    pub keys: Vec<Value>,
    pub revoked: Vec<String>,
    pub created: usize,
    pub clan_requests: Vec<String>,
    pub fail_clans_with: Option<u16>,
}

pub type Shared = Arc<Mutex<MockState>>;

pub struct MockServer {
    pub url: String,
    pub state: Shared,
}

impl MockServer {
    pub fn dev_site_url(&self) -> String {
        self.url.clone()
    }

    pub fn api_url(&self) -> String {
        format!("{}/v1", self.url)
    }

    pub fn revoked(&self) -> Vec<String> {
        self.state.lock().unwrap().revoked.clone()
    }

    pub fn created(&self) -> usize {
        self.state.lock().unwrap().created
    }

    pub fn clan_requests(&self) -> Vec<String> {
        self.state.lock().unwrap().clan_requests.clone()
    }
}

pub fn clan_body() -> Value {
    json!({
        "tag": "#2PP",
        "name": "Mock Clan",
        "type": "open",
        "clanLevel": 9,
        "members": 2,
        "labels": [],
        "memberList": [
            {"tag": "#P1", "name": "alpha", "role": "leader"},
            {"tag": "#P2", "name": "beta", "role": "member"}
        ],
        "chatLanguage": {"id": 75000000, "name": "English"}
    })
}

pub fn api_key(id: &str, name: &str, key: &str, cidr: &str) -> Value {
    json!({"id": id, "name": name, "key": key, "cidrRanges": [cidr]})
}

fn temporary_token(ip: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"typ":"JWT","alg":"HS512"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({
            "limits": [
                {"tier": "developer/bronze", "type": "throttling"},
                {"cidrs": [format!("{ip}/32")], "type": "client"}
            ]
        })
        .to_string(),
    );
    format!("{header}.{payload}.signature")
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] != json!(PASSWORD) {
        return (StatusCode::FORBIDDEN, Json(json!({"status": "forbidden"}))).into_response();
    }
    Json(json!({"status": {"code": 0}, "temporaryAPIToken": temporary_token(CALLER_IP)}))
        .into_response()
}

async fn list_keys(State(state): State<Shared>) -> Response {
    let keys = state.lock().unwrap().keys.clone();
    Json(json!({ "keys": keys })).into_response()
}

async fn create_key(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut s = state.lock().unwrap();
    s.created += 1;
    let token = format!("created-{}", s.created);
    let key = json!({
        "id": format!("new-{}", s.created),
        "name": body["name"],
        "key": token,
        "cidrRanges": body["cidrRanges"],
    });
    s.keys.push(key.clone());
    Json(json!({ "key": key })).into_response()
}

async fn revoke_key(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let id = body["id"].as_str().unwrap_or_default().to_string();
    let mut s = state.lock().unwrap();
    s.keys.retain(|k| k["id"] != json!(id));
    s.revoked.push(id);
    Json(json!({})).into_response()
}

async fn get_clan(
    State(state): State<Shared>,
    Path(tag): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut s = state.lock().unwrap();
    s.clan_requests.push(tag.clone());

    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);
    let known = s
        .keys
        .iter()
        .any(|k| bearer.as_deref().is_some() && k["key"].as_str() == bearer.as_deref());
    if !known {
        return (StatusCode::FORBIDDEN, Json(json!({"reason": "accessDenied"}))).into_response();
    }

    if let Some(code) = s.fail_clans_with {
        let status = StatusCode::from_u16(code).unwrap();
        return (status, "upstream exploded").into_response();
    }
    if tag == "#2PP" {
        Json(clan_body()).into_response()
    } else {
        (StatusCode::NOT_FOUND, Json(json!({"reason": "notFound"}))).into_response()
    }
}

/// Start the mock on an ephemeral port
pub async fn start(initial_keys: Vec<Value>) -> MockServer {
    let state: Shared = Arc::new(Mutex::new(MockState {
        keys: initial_keys,
        ..MockState::default()
    }));

    let app = Router::new()
        .route("/api/login", post(login))
        .route("/api/apikey/list", post(list_keys))
        .route("/api/apikey/create", post(create_key))
        .route("/api/apikey/revoke", post(revoke_key))
        .route("/v1/clans/:tag", get(get_clan))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockServer {
        url: format!("http://{}", addr),
        state,
    }
}
