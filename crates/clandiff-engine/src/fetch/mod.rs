//! Fetch adapters.
//!
//! Each adapter turns a clan tag into a [`Payload`] or a terminal error. The
//! run never retries and never compares partial results.

mod external;
mod in_process;

pub use external::{parse_output, ExternalCommand, ExternalFetcher, DEFAULT_TASK, TAG_PLACEHOLDER};
pub use in_process::{client_error_to_ex, InProcessFetcher};

use async_trait::async_trait;
use clandiff_core::{Payload, Result};

/// One side of a comparison
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Short name used in progress lines and mismatch messages
    fn label(&self) -> &str;

    /// Line printed before the fetch starts
    fn progress_line(&self, tag: &str) -> String {
        format!("Fetching clan {} using {} client...", tag, self.label())
    }

    /// Fetch the clan identified by `tag`
    ///
    /// # Errors
    ///
    /// Any fetch-class `ExError` (see `ExErrorKind::is_fetch`).
    async fn fetch(&self, tag: &str) -> Result<Payload>;
}
