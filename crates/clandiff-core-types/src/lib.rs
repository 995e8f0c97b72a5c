//! Core types shared across clandiff facilities
//!
//! This crate provides foundational types used by the error, logging and
//! client layers:
//!
//! - **Correlation types**: RunId for tagging every event of one comparison run
//! - **Sensitive data**: Sensitive<T> marker for automatic redaction
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::RunId;
pub use sensitive::Sensitive;
