//! Compare command
//!
//! Usage: clandiff compare [TAG] [--repo-root <DIR>] [--external-cmd <PROGRAM>]
//!        [--external-arg <ARG>]... [--ignore-field <FIELD>]... [--strict]

use super::{cancellable, resolve_config, CompareFlags};
use clandiff_client::auth::DEFAULT_DEV_SITE_URL;
use clandiff_client::client::DEFAULT_API_URL;
use clandiff_core::{Result, RunConfig};
use clandiff_engine::{run_compare, ExternalCommand, ExternalFetcher, InProcessFetcher};
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Clan tag (default: $COC_CLAN_TAG, then #2JLYPYRRY)
    pub tag: Option<String>,

    /// Repository root holding the Gradle wrapper of the external client
    #[arg(long, default_value = ".")]
    pub repo_root: PathBuf,

    /// Run this program instead of the Gradle wrapper
    #[arg(long, value_name = "PROGRAM")]
    pub external_cmd: Option<PathBuf>,

    /// Argument for the external program; `{tag}` is replaced (repeatable)
    #[arg(long = "external-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub external_args: Vec<String>,

    #[command(flatten)]
    pub flags: CompareFlags,

    /// Public API base URL
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Developer site base URL
    #[arg(long, default_value = DEFAULT_DEV_SITE_URL)]
    pub dev_site_url: String,
}

/// Execute compare command
pub async fn execute(args: CompareArgs, env_file: Option<&Path>) -> Result<()> {
    let config = resolve_config(env_file, args.tag.as_deref())?;

    let left = InProcessFetcher::new(config.credentials.clone())
        .with_api_url(&args.api_url)
        .with_dev_site_url(&args.dev_site_url);
    let right = ExternalFetcher::new(external_command(&args, &config));

    let mut stdout = std::io::stdout();
    let report = cancellable(run_compare(
        &left,
        &right,
        &config.clan_tag,
        &args.flags.options(),
        &mut stdout,
    ))
    .await?;

    tracing::debug!(run_id = %report.run_id, "compare finished");
    println!("{}", report.summary);
    Ok(())
}

fn external_command(args: &CompareArgs, config: &RunConfig) -> ExternalCommand {
    let command = match &args.external_cmd {
        Some(program) => ExternalCommand::new(program)
            .args(["{tag}"])
            .current_dir(&args.repo_root),
        None => ExternalCommand::gradle(&args.repo_root),
    };
    let command = if args.external_args.is_empty() {
        command
    } else {
        command.args(args.external_args.iter().cloned())
    };
    command.with_credentials(config)
}
