//! Fetcher backed by the in-process API client.

use super::Fetcher;
use async_trait::async_trait;
use clandiff_client::auth::DEFAULT_DEV_SITE_URL;
use clandiff_client::client::DEFAULT_API_URL;
use clandiff_client::{Authenticator, Client, ClientError, DevSiteAuthenticator, RawPayload};
use clandiff_core::errors::{ExError, ExErrorKind};
use clandiff_core::{log_op_end, log_op_error, log_op_start};
use clandiff_core::{Credentials, Payload, Result};
use std::sync::Arc;

const OP: &str = "fetch_in_process";

/// Logs in, fetches one clan and returns the raw response body
pub struct InProcessFetcher {
    credentials: Credentials,
    label: String,
    api_url: String,
    dev_site_url: String,
    raw_attribute: bool,
    authenticator: Option<Arc<dyn Authenticator>>,
}

impl InProcessFetcher {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            label: "in-process".to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            dev_site_url: DEFAULT_DEV_SITE_URL.to_string(),
            raw_attribute: true,
            authenticator: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_dev_site_url(mut self, url: impl Into<String>) -> Self {
        self.dev_site_url = url.into();
        self
    }

    /// Whether the client keeps raw bodies. Without them the fetch fails.
    pub fn raw_attribute(mut self, enabled: bool) -> Self {
        self.raw_attribute = enabled;
        self
    }

    /// Use this authenticator instead of logging into the developer site
    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    fn build_client(&self) -> Result<Client> {
        let authenticator: Arc<dyn Authenticator> = match &self.authenticator {
            Some(a) => Arc::clone(a),
            None => Arc::new(
                DevSiteAuthenticator::with_base_url(&self.dev_site_url)
                    .map_err(|e| client_error_to_ex(e, ""))?,
            ),
        };
        Client::builder()
            .base_url(&self.api_url)
            .raw_attribute(self.raw_attribute)
            .key_count(1)
            .shared_authenticator(authenticator)
            .build()
            .map_err(|e| client_error_to_ex(e, ""))
    }

    async fn fetch_with(&self, client: &mut Client, tag: &str) -> Result<Payload> {
        client
            .login(&self.credentials.email, &self.credentials.password)
            .await
            .map_err(|e| client_error_to_ex(e, tag))?;

        let clan = client
            .get_clan(tag)
            .await
            .map_err(|e| client_error_to_ex(e, tag))?;

        clan.raw_payload().cloned().ok_or_else(|| {
            ExError::new(ExErrorKind::RawDataUnavailable)
                .with_op(OP)
                .with_subject(tag)
                .with_message("In-process client did not expose raw data; enable raw_attribute")
        })
    }
}

#[async_trait]
impl Fetcher for InProcessFetcher {
    fn label(&self) -> &str {
        &self.label
    }

    async fn fetch(&self, tag: &str) -> Result<Payload> {
        log_op_start!(OP, clan_tag = tag);
        let start = std::time::Instant::now();

        let result = match self.build_client() {
            Ok(mut client) => {
                let result = self.fetch_with(&mut client, tag).await;
                // Released on both paths.
                client.close().await;
                result
            }
            Err(e) => Err(e),
        };

        match &result {
            Ok(_) => {
                log_op_end!(OP, duration_ms = start.elapsed().as_millis() as u64);
            }
            Err(e) => {
                log_op_error!(OP, *e, duration_ms = start.elapsed().as_millis() as u64);
            }
        }
        result
    }
}

/// Classify a client failure for the run
///
/// `tag` becomes the error subject for fetch failures that concern the clan.
pub fn client_error_to_ex(err: ClientError, tag: &str) -> ExError {
    let message = format!("In-process client failed: {}", err);
    let base = match &err {
        ClientError::InvalidCredentials
        | ClientError::DevSite { .. }
        | ClientError::MalformedLogin { .. }
        | ClientError::NoTokens
        | ClientError::NotLoggedIn => ExError::new(ExErrorKind::Auth),
        ClientError::NotFound { tag: corrected } => {
            return ExError::new(ExErrorKind::NotFound)
                .with_op(OP)
                .with_subject(corrected.clone())
                .with_message(message);
        }
        ClientError::Status { body, .. } => {
            ExError::new(ExErrorKind::UpstreamStatus).with_detail(body.clone())
        }
        ClientError::Decode { .. } => ExError::new(ExErrorKind::InvalidPayload),
        ClientError::Transport(_) => ExError::new(ExErrorKind::Transport),
    };
    let base = base.with_op(OP).with_message(message);
    if tag.is_empty() {
        base
    } else {
        base.with_subject(tag)
    }
}
