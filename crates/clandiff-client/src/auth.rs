//! API token acquisition.
//!
//! The public API wants a bearer token bound to the caller's IP. The
//! developer site hands those out to logged-in accounts; `DevSiteAuthenticator`
//! drives that flow the same way the other client implementations do, so
//! both sides of a comparison end up sharing keys instead of churning them.

use crate::error::{ClientError, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use clandiff_core_types::Sensitive;
use serde::Deserialize;
use serde_json::{json, Value};

pub const DEFAULT_DEV_SITE_URL: &str = "https://developer.clashofclans.com";
pub const DEFAULT_KEY_NAME: &str = "Created with clandiff";
pub const DEFAULT_KEY_SCOPE: &str = "clash";

/// Upper bound the developer site places on keys per account
pub const MAX_KEYS: usize = 10;

/// Source of API tokens
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Produce up to `count` tokens usable against the public API
    async fn obtain_tokens(
        &self,
        email: &str,
        password: &Sensitive<String>,
        count: usize,
    ) -> Result<Vec<Sensitive<String>>>;
}

/// Hands out a fixed list of tokens and ignores the credentials
#[derive(Debug, Clone)]
pub struct StaticTokens(Vec<Sensitive<String>>);

impl StaticTokens {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tokens.into_iter().map(|t| Sensitive::new(t.into())).collect())
    }
}

#[async_trait]
impl Authenticator for StaticTokens {
    async fn obtain_tokens(
        &self,
        _email: &str,
        _password: &Sensitive<String>,
        count: usize,
    ) -> Result<Vec<Sensitive<String>>> {
        Ok(self.0.iter().take(count.max(1)).cloned().collect())
    }
}

#[derive(Debug, Deserialize)]
struct KeyList {
    #[serde(default)]
    keys: Vec<ApiKey>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiKey {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    cidr_ranges: Vec<String>,
}

impl ApiKey {
    fn bound_to(&self, ip: &str) -> bool {
        self.cidr_ranges.iter().any(|c| c.starts_with(ip))
    }
}

/// Logs into the developer site and reuses or creates IP-bound API keys
#[derive(Debug, Clone)]
pub struct DevSiteAuthenticator {
    http: reqwest::Client,
    base_url: String,
    fixed_ip: Option<String>,
}

impl DevSiteAuthenticator {
    /// Authenticator against the public developer site
    ///
    /// # Errors
    ///
    /// `ClientError::Transport` if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_DEV_SITE_URL)
    }

    /// Authenticator against a different developer-site root
    ///
    /// # Errors
    ///
    /// `ClientError::Transport` if the HTTP client cannot be built.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        // The site tracks the login through a session cookie.
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            fixed_ip: None,
        })
    }

    /// Bind keys to this IP instead of the one reported by the login token
    pub fn fixed_ip(mut self, ip: impl Into<String>) -> Self {
        self.fixed_ip = Some(ip.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn login(&self, email: &str, password: &Sensitive<String>) -> Result<String> {
        let resp = self
            .http
            .post(self.url("/api/login"))
            .header("Accept", "application/json")
            .json(&json!({ "email": email, "password": password.expose() }))
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status == 403 {
            return Err(ClientError::InvalidCredentials);
        }
        if !(200..300).contains(&status) {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::DevSite {
                op: "login",
                status,
                body,
            });
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| ClientError::MalformedLogin {
                reason: e.to_string(),
            })?;

        if let Some(ip) = self.fixed_ip.as_ref().filter(|ip| !ip.trim().is_empty()) {
            return Ok(ip.clone());
        }
        let token = body
            .get("temporaryAPIToken")
            .and_then(Value::as_str)
            .ok_or_else(|| ClientError::MalformedLogin {
                reason: "temporaryAPIToken missing in login response".to_string(),
            })?;
        ip_from_temporary_token(token)
    }

    async fn list_keys(&self) -> Result<Vec<ApiKey>> {
        let resp = self
            .http
            .post(self.url("/api/apikey/list"))
            .header("Accept", "application/json")
            .send()
            .await?;
        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::DevSite {
                op: "list keys",
                status,
                body,
            });
        }
        let list: KeyList = resp
            .json()
            .await
            .map_err(|e| ClientError::decode("key list", e))?;
        Ok(list.keys)
    }

    /// Revoke keys carrying our name but bound to another IP.
    ///
    /// Best effort: failures are logged and swallowed, creation may still succeed.
    async fn revoke_stale_keys(&self, keys: &[ApiKey], ip: &str) {
        for key in keys
            .iter()
            .filter(|k| k.name == DEFAULT_KEY_NAME && !k.bound_to(ip))
        {
            let Some(id) = key.id.as_deref() else {
                continue;
            };
            let result = self
                .http
                .post(self.url("/api/apikey/revoke"))
                .header("Accept", "application/json")
                .json(&json!({ "id": id }))
                .send()
                .await;
            if let Err(e) = result {
                tracing::warn!(key_id = id, error = %e, "failed to revoke stale api key");
            }
        }
    }

    async fn create_key(&self, ip: &str) -> Result<Sensitive<String>> {
        let description = format!(
            "Created on {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        let resp = self
            .http
            .post(self.url("/api/apikey/create"))
            .header("Accept", "application/json")
            .json(&json!({
                "name": DEFAULT_KEY_NAME,
                "description": description,
                "cidrRanges": [ip],
                "scopes": [DEFAULT_KEY_SCOPE],
            }))
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::DevSite {
                op: "create key",
                status,
                body,
            });
        }
        let body: Value = resp
            .json()
            .await
            .map_err(|e| ClientError::decode("create key response", e))?;

        // Usually {"key": {"key": "..."}}, occasionally flat.
        body.pointer("/key/key")
            .and_then(Value::as_str)
            .or_else(|| body.get("key").and_then(Value::as_str))
            .map(|k| Sensitive::new(k.to_string()))
            .ok_or_else(|| ClientError::decode("create key response", "key missing"))
    }
}

#[async_trait]
impl Authenticator for DevSiteAuthenticator {
    async fn obtain_tokens(
        &self,
        email: &str,
        password: &Sensitive<String>,
        count: usize,
    ) -> Result<Vec<Sensitive<String>>> {
        let needed = count.clamp(1, MAX_KEYS);
        let ip = self.login(email, password).await?;
        tracing::debug!(ip = %ip, "developer site login succeeded");

        let keys = self.list_keys().await?;
        let mut tokens: Vec<Sensitive<String>> = keys
            .iter()
            .filter(|k| k.name == DEFAULT_KEY_NAME && k.bound_to(&ip))
            .filter_map(|k| k.key.clone())
            .take(needed)
            .map(Sensitive::new)
            .collect();

        if tokens.len() < needed {
            self.revoke_stale_keys(&keys, &ip).await;
            while tokens.len() < needed {
                tokens.push(self.create_key(&ip).await?);
            }
            tracing::debug!(created = true, count = tokens.len(), "api keys ready");
        }
        Ok(tokens)
    }
}

/// Extract the caller IP from the developer site's temporary JWT.
///
/// The JWT payload lists access limits; the second limit carries the CIDR
/// the session was opened from.
///
/// # Errors
///
/// `ClientError::MalformedLogin` if the token is not a JWT or lacks the CIDR.
pub fn ip_from_temporary_token(token: &str) -> Result<String> {
    let malformed = |reason: &str| ClientError::MalformedLogin {
        reason: reason.to_string(),
    };

    let payload_b64 = token
        .split('.')
        .nth(1)
        .ok_or_else(|| malformed("Invalid temporaryAPIToken format"))?
        .trim_end_matches('=');

    let bytes = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .or_else(|_| STANDARD_NO_PAD.decode(payload_b64))
        .map_err(|_| malformed("temporaryAPIToken payload is not base64"))?;
    let payload: Value = serde_json::from_slice(&bytes)
        .map_err(|_| malformed("temporaryAPIToken payload is not JSON"))?;

    let cidr = payload
        .pointer("/limits/1/cidrs/0")
        .and_then(Value::as_str)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| malformed("Could not extract IP from token"))?;

    Ok(cidr.split('/').next().unwrap_or(cidr).to_string())
}
