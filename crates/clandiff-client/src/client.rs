//! Public API client.

use crate::auth::{Authenticator, DevSiteAuthenticator, MAX_KEYS};
use crate::clan::Clan;
use crate::error::{ClientError, Result};
use crate::tag::{correct_tag, encode_for_path};
use clandiff_core_types::Sensitive;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const DEFAULT_API_URL: &str = "https://api.clashofclans.com/v1";

/// Builder for [`Client`]
pub struct ClientBuilder {
    base_url: String,
    raw_attribute: bool,
    key_count: usize,
    authenticator: Option<Arc<dyn Authenticator>>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            raw_attribute: false,
            key_count: 1,
            authenticator: None,
        }
    }
}

impl ClientBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Keep the raw JSON body on every decoded model
    pub fn raw_attribute(mut self, enabled: bool) -> Self {
        self.raw_attribute = enabled;
        self
    }

    /// Number of API keys to request at login (clamped to 1..=10)
    pub fn key_count(mut self, count: usize) -> Self {
        self.key_count = count.clamp(1, MAX_KEYS);
        self
    }

    pub fn authenticator(mut self, authenticator: impl Authenticator + 'static) -> Self {
        self.authenticator = Some(Arc::new(authenticator));
        self
    }

    /// Same as [`ClientBuilder::authenticator`] for an authenticator that is shared
    pub fn shared_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Build the client; defaults to the developer-site authenticator
    ///
    /// # Errors
    ///
    /// `ClientError::Transport` if an HTTP client cannot be built.
    pub fn build(self) -> Result<Client> {
        let authenticator = match self.authenticator {
            Some(a) => a,
            None => Arc::new(DevSiteAuthenticator::new()?),
        };
        Ok(Client {
            http: Some(reqwest::Client::builder().build()?),
            authenticator,
            base_url: self.base_url,
            raw_attribute: self.raw_attribute,
            key_count: self.key_count,
            tokens: Vec::new(),
            cursor: AtomicUsize::new(0),
        })
    }
}

/// Client for the public game-data API
///
/// Call [`Client::login`] before any fetch and [`Client::close`] when done;
/// a closed client refuses further calls.
pub struct Client {
    http: Option<reqwest::Client>,
    authenticator: Arc<dyn Authenticator>,
    base_url: String,
    raw_attribute: bool,
    key_count: usize,
    tokens: Vec<Sensitive<String>>,
    cursor: AtomicUsize,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("raw_attribute", &self.raw_attribute)
            .field("open", &self.is_open())
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn is_raw_attribute_enabled(&self) -> bool {
        self.raw_attribute
    }

    /// True until `close` is called
    pub fn is_open(&self) -> bool {
        self.http.is_some()
    }

    pub fn is_logged_in(&self) -> bool {
        self.is_open() && !self.tokens.is_empty()
    }

    /// Obtain API tokens through the configured authenticator
    ///
    /// # Errors
    ///
    /// Whatever the authenticator reports, or `ClientError::NoTokens` if it
    /// succeeds with an empty list.
    pub async fn login(&mut self, email: &str, password: &Sensitive<String>) -> Result<()> {
        if !self.is_open() {
            return Err(ClientError::NotLoggedIn);
        }
        let tokens = self
            .authenticator
            .obtain_tokens(email, password, self.key_count)
            .await?;
        if tokens.is_empty() {
            return Err(ClientError::NoTokens);
        }
        tracing::debug!(tokens = tokens.len(), "client logged in");
        self.tokens = tokens;
        Ok(())
    }

    /// Round-robin over the tokens obtained at login
    fn next_token(&self) -> Result<&Sensitive<String>> {
        if self.tokens.is_empty() {
            return Err(ClientError::NotLoggedIn);
        }
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed) % self.tokens.len();
        Ok(&self.tokens[idx])
    }

    /// Fetch one clan by tag
    ///
    /// The tag is corrected (see [`correct_tag`]) before use.
    ///
    /// # Errors
    ///
    /// - `NotLoggedIn` before login or after close
    /// - `NotFound` on HTTP 404
    /// - `Status` on any other non-2xx
    /// - `Decode` if the body is not a clan
    /// - `Transport` on connection failure
    pub async fn get_clan(&self, tag: &str) -> Result<Clan> {
        let http = self.http.as_ref().ok_or(ClientError::NotLoggedIn)?;
        let token = self.next_token()?;

        let corrected = correct_tag(tag);
        let url = format!("{}/clans/{}", self.base_url, encode_for_path(&corrected));

        let resp = http
            .get(&url)
            .header("Accept", "application/json")
            .bearer_auth(token.expose())
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status == 404 {
            return Err(ClientError::NotFound { tag: corrected });
        }
        let bytes = resp.bytes().await?;
        if !(200..300).contains(&status) {
            return Err(ClientError::Status {
                op: "get_clan",
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let value: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| ClientError::decode("clan JSON", e))?;
        Clan::from_value(value, self.raw_attribute).map_err(|e| ClientError::decode("clan JSON", e))
    }

    /// Release the HTTP client and forget the tokens
    ///
    /// Safe to call more than once.
    pub async fn close(&mut self) {
        self.http = None;
        self.tokens.clear();
    }
}
