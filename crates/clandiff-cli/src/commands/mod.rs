//! Subcommands and the helpers they share.

pub mod compare;
pub mod diff;
pub mod dump;

use clandiff_core::config::load_dotenv;
use clandiff_core::errors::{ExError, ExErrorKind};
use clandiff_core::payload::{CompareOptions, NormalizeRules};
use clandiff_core::{Result, RunConfig};
use clap::Args;
use std::future::Future;
use std::path::Path;

/// Comparison flags shared by `compare` and `diff`
#[derive(Debug, Args)]
pub struct CompareFlags {
    /// Also ignore this field at every depth (repeatable)
    #[arg(long = "ignore-field", value_name = "FIELD")]
    pub ignore_fields: Vec<String>,

    /// Require structural equality; do not accept canonical-text matches
    #[arg(long)]
    pub strict: bool,
}

impl CompareFlags {
    pub fn options(&self) -> CompareOptions {
        CompareOptions::default()
            .with_rules(NormalizeRules::default().ignore_fields(self.ignore_fields.iter().cloned()))
            .strict(self.strict)
    }
}

/// Load `.env`, then resolve credentials and the clan tag
///
/// A tag given on the command line wins over `COC_CLAN_TAG`.
pub fn resolve_config(env_file: Option<&Path>, tag: Option<&str>) -> Result<RunConfig> {
    load_dotenv(env_file)?;
    let config = RunConfig::from_env()?;
    Ok(match tag {
        Some(t) if !t.trim().is_empty() => config.with_clan_tag(t),
        _ => config,
    })
}

/// Run `fut` until it finishes or the user interrupts
pub async fn cancellable<T, F>(fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = tokio::signal::ctrl_c() => Err(ExError::new(ExErrorKind::Cancelled).with_message("Cancelled")),
        result = fut => result,
    }
}

/// Print an error the way every subcommand reports failure
pub fn report_error(err: &ExError) {
    tracing::debug!(err_code = err.code(), error = %err, "command failed");
    if err.message().is_empty() {
        eprintln!("Error: {}", err);
    } else {
        eprintln!("Error: {}", err.message());
    }
    if let Some(detail) = err.detail() {
        let detail = detail.trim_end();
        if !detail.is_empty() {
            eprintln!("{}", detail);
        }
    }
}
