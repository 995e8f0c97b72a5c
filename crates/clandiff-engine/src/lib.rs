//! clandiff Engine - fetch adapters and run orchestration
//!
//! Ties the pieces together:
//! - [`fetch::InProcessFetcher`] drives the Rust API client
//! - [`fetch::ExternalFetcher`] runs another client as a subprocess
//! - [`run::run_compare`] fetches both sides in order and compares them
//!
//! ## Logging Ownership
//!
//! The engine owns lifecycle logging (`log_op_start!`/`log_op_end!`/
//! `log_op_error!`) for fetches and runs. The client crate only emits
//! `tracing::debug!` details.

pub mod fetch;
pub mod run;

pub use fetch::{ExternalCommand, ExternalFetcher, Fetcher, InProcessFetcher};
pub use run::{run_compare, RunReport};
