//! Dump command
//!
//! Usage: clandiff dump [TAG] [--pretty]

use super::{cancellable, resolve_config};
use clandiff_client::auth::DEFAULT_DEV_SITE_URL;
use clandiff_client::client::DEFAULT_API_URL;
use clandiff_core::errors::{ExError, ExErrorKind};
use clandiff_core::Result;
use clandiff_engine::{Fetcher, InProcessFetcher};
use clap::Args;
use std::path::Path;

#[derive(Debug, Args)]
pub struct DumpArgs {
    /// Clan tag (default: $COC_CLAN_TAG, then #2JLYPYRRY)
    pub tag: Option<String>,

    /// Indent the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Public API base URL
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Developer site base URL
    #[arg(long, default_value = DEFAULT_DEV_SITE_URL)]
    pub dev_site_url: String,
}

/// Execute dump command
pub async fn execute(args: DumpArgs, env_file: Option<&Path>) -> Result<()> {
    let config = resolve_config(env_file, args.tag.as_deref())?;

    let fetcher = InProcessFetcher::new(config.credentials)
        .with_api_url(args.api_url)
        .with_dev_site_url(args.dev_site_url);
    let payload = cancellable(fetcher.fetch(&config.clan_tag)).await?;

    let text = if args.pretty {
        serde_json::to_string_pretty(&payload)
    } else {
        serde_json::to_string(&payload)
    }
    .map_err(|e| {
        ExError::new(ExErrorKind::Internal)
            .with_op("dump")
            .with_message(format!("Failed to serialize payload: {}", e))
    })?;

    println!("{}", text);
    Ok(())
}
