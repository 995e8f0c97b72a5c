//! Run configuration resolved from the environment.
//!
//! Both clients log in with the same developer-site credentials, so the
//! resolver reads them once and hands them to each fetcher. Lookup goes
//! through a closure so tests never touch the process environment.

use crate::errors::ConfigError;
use clandiff_core_types::Sensitive;
use std::path::Path;

pub const ENV_EMAIL: &str = "COC_EMAIL";
pub const ENV_PASSWORD: &str = "COC_PASSWORD";
pub const ENV_CLAN_TAG: &str = "COC_CLAN_TAG";

/// Clan compared when `COC_CLAN_TAG` is not set
pub const DEFAULT_CLAN_TAG: &str = "#2JLYPYRRY";

/// Developer-site login
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: Sensitive<String>,
}

/// Everything a comparison run needs from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub credentials: Credentials,
    pub clan_tag: String,
}

impl RunConfig {
    /// Resolve configuration from the process environment
    ///
    /// # Errors
    ///
    /// `ConfigError::MissingEnv` if `COC_EMAIL` or `COC_PASSWORD` is unset or blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve configuration through an arbitrary lookup
    ///
    /// Required values are checked in order (email, then password) so the
    /// first missing one is reported. A blank clan tag falls back to the default.
    ///
    /// # Errors
    ///
    /// `ConfigError::MissingEnv` naming the first missing required variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let email = require(&lookup, ENV_EMAIL)?;
        let password = require(&lookup, ENV_PASSWORD)?;
        let clan_tag = lookup(ENV_CLAN_TAG)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CLAN_TAG.to_string());

        Ok(Self {
            credentials: Credentials {
                email,
                password: Sensitive::new(password),
            },
            clan_tag,
        })
    }

    /// Override the clan tag (e.g. from a CLI argument)
    pub fn with_clan_tag(mut self, tag: impl Into<String>) -> Self {
        self.clan_tag = tag.into();
        self
    }

    /// Environment pairs an external client needs to share this login.
    ///
    /// Only variables missing from `existing` are returned, so values the
    /// caller already exported take precedence.
    pub fn credential_env<F>(&self, existing: F) -> Vec<(&'static str, String)>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut out = Vec::new();
        if existing(ENV_EMAIL).is_none() {
            out.push((ENV_EMAIL, self.credentials.email.clone()));
        }
        if existing(ENV_PASSWORD).is_none() {
            out.push((ENV_PASSWORD, self.credentials.password.expose().clone()));
        }
        out
    }
}

fn require<F>(lookup: &F, name: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnv {
            name: name.to_string(),
        }),
    }
}

/// Load a `.env` file into the process environment if one exists.
///
/// Variables already set are left alone. With `path = None` the usual
/// dotenv search (current directory and its parents) applies. A missing file
/// is not an error.
///
/// # Errors
///
/// `ConfigError::DotEnv` if a file is found but cannot be parsed.
pub fn load_dotenv(path: Option<&Path>) -> Result<(), ConfigError> {
    let result = match path {
        Some(p) => dotenvy::from_path(p),
        None => dotenvy::dotenv().map(|_| ()),
    };
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ConfigError::DotEnv {
            message: e.to_string(),
        }),
    }
}
