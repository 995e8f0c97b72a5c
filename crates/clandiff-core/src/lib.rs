//! clandiff Core - payload comparison kernel
//!
//! This crate provides the pieces of a cross-client consistency check that do
//! not touch the network or spawn processes:
//! - Payload model with explicit kind inspection
//! - Normalization (ignore set, private-key prefix)
//! - Two-tier equivalence check and first-divergence localization
//! - Error facility with a stable code taxonomy
//! - Logging facility (profiles, canonical macros, test capture)
//! - Run configuration resolved from the environment

pub mod config;
pub mod errors;
pub mod logging_facility;
pub mod payload;

// Logging macros refer to schema constants through this path.
pub use clandiff_core_types as core_types;

// Re-export commonly used types
pub use config::{Credentials, RunConfig, DEFAULT_CLAN_TAG};
pub use errors::{ConfigError, ExError, ExErrorKind, Result};
pub use payload::{
    compare_payloads, evaluate, CompareOptions, Difference, Equivalence, NormalizeRules, Payload,
    Verdict,
};
