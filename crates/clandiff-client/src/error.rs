use thiserror::Error;

/// Result type alias using ClientError
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors raised by the in-process API client
#[derive(Error, Debug)]
pub enum ClientError {
    /// Developer site rejected the email/password pair (HTTP 403)
    #[error("Invalid credentials for developer site")]
    InvalidCredentials,

    /// Developer-site call returned a non-success status
    #[error("Developer site {op} failed: HTTP {status}")]
    DevSite {
        op: &'static str,
        status: u16,
        body: String,
    },

    /// Login succeeded but the response did not carry what we need
    #[error("Failed to parse login response: {reason}")]
    MalformedLogin { reason: String },

    /// Authenticator produced zero tokens
    #[error("Authenticator returned no tokens")]
    NoTokens,

    /// API call attempted before `login` or after `close`
    #[error("Client not logged in")]
    NotLoggedIn,

    /// API answered 404 for the requested clan
    #[error("Clan not found: {tag}")]
    NotFound { tag: String },

    /// API answered with any other non-success status
    #[error("HTTP {status} calling {op}: {body}")]
    Status {
        op: &'static str,
        status: u16,
        body: String,
    },

    /// Response body was not the JSON we expected
    #[error("Failed to decode {what}: {message}")]
    Decode { what: &'static str, message: String },

    /// Connection, TLS or protocol failure below HTTP
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    pub(crate) fn decode(what: &'static str, err: impl std::fmt::Display) -> Self {
        ClientError::Decode {
            what,
            message: err.to_string(),
        }
    }
}
