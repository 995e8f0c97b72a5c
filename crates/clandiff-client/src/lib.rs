//! clandiff Client - in-process client for the Clash of Clans public API
//!
//! Covers what a consistency check needs and nothing more:
//! - Tag correction and path encoding
//! - Developer-site login with IP-bound API key reuse/creation
//! - Clan lookup with optional access to the raw response body

pub mod auth;
pub mod clan;
pub mod client;
pub mod error;
pub mod tag;

pub use auth::{Authenticator, DevSiteAuthenticator, StaticTokens};
pub use clan::{Clan, RawPayload};
pub use client::{Client, ClientBuilder};
pub use error::{ClientError, Result};
