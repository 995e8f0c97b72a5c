//! Compare-run orchestration.
//!
//! ## Sequence (strict, no overlap):
//! 1. Fetch the left payload
//! 2. Fetch the right payload
//! 3. Compare under the configured options
//!
//! Any failure ends the run; nothing is compared until both payloads are in
//! hand.

use crate::fetch::Fetcher;
use clandiff_core::payload::{compare_payloads, CompareOptions, Equivalence};
use clandiff_core::{log_op_end, log_op_error, log_op_start};
use clandiff_core::{ExError, Result};
use clandiff_core_types::RunId;
use std::io::Write;

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub run_id: RunId,
    pub clan_tag: String,
    pub equivalence: Equivalence,
    /// Success line ready to print
    pub summary: String,
}

/// Fetch `tag` through both fetchers and compare the payloads
///
/// Progress lines go to `progress` before each fetch. The comparison labels
/// are taken from the fetchers.
///
/// # Errors
///
/// The first fetch error, an `Io` error if `progress` cannot be written, or
/// `Mismatch` if the payloads are not equivalent.
pub async fn run_compare(
    left: &dyn Fetcher,
    right: &dyn Fetcher,
    tag: &str,
    options: &CompareOptions,
    progress: &mut (dyn Write + Send),
) -> Result<RunReport> {
    let run_id = RunId::new();
    log_op_start!("compare_run", run_id = run_id.as_str(), clan_tag = tag);
    let start = std::time::Instant::now();

    let result = run_compare_impl(left, right, tag, options, progress).await;

    match result {
        Ok(equivalence) => {
            log_op_end!(
                "compare_run",
                duration_ms = start.elapsed().as_millis() as u64,
                run_id = run_id.as_str(),
                equivalence = ?equivalence
            );
            let options = labelled(options, left, right);
            Ok(RunReport {
                summary: equivalence.summary(&options),
                run_id,
                clan_tag: tag.to_string(),
                equivalence,
            })
        }
        Err(e) => {
            log_op_error!(
                "compare_run",
                e,
                duration_ms = start.elapsed().as_millis() as u64,
                run_id = run_id.as_str()
            );
            Err(e)
        }
    }
}

async fn run_compare_impl(
    left: &dyn Fetcher,
    right: &dyn Fetcher,
    tag: &str,
    options: &CompareOptions,
    progress: &mut (dyn Write + Send),
) -> Result<Equivalence> {
    announce(progress, &left.progress_line(tag))?;
    let left_payload = left.fetch(tag).await?;

    announce(progress, &right.progress_line(tag))?;
    let right_payload = right.fetch(tag).await?;

    compare_payloads(
        &left_payload,
        &right_payload,
        &labelled(options, left, right),
    )
}

fn labelled(options: &CompareOptions, left: &dyn Fetcher, right: &dyn Fetcher) -> CompareOptions {
    options.clone().with_labels(left.label(), right.label())
}

fn announce(out: &mut (dyn Write + Send), line: &str) -> Result<()> {
    writeln!(out, "{}", line)
        .and_then(|_| out.flush())
        .map_err(|e| ExError::from(e).with_op("compare_run"))
}
