//! Diff command
//!
//! Usage: clandiff diff <LEFT> <RIGHT> [--ignore-field <FIELD>]... [--strict]
//!
//! Offline counterpart of `compare`: same normalization, same verdicts, same
//! exit behavior, but the payloads come from files.

use super::CompareFlags;
use clandiff_core::errors::{ExError, ExErrorKind};
use clandiff_core::payload::compare_payloads;
use clandiff_core::{Payload, Result};
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Left payload (JSON file)
    pub left: PathBuf,

    /// Right payload (JSON file)
    pub right: PathBuf,

    #[command(flatten)]
    pub flags: CompareFlags,
}

/// Execute diff command
pub fn execute(args: DiffArgs) -> Result<()> {
    let left = read_payload(&args.left)?;
    let right = read_payload(&args.right)?;

    let options = args.flags.options();
    let equivalence = compare_payloads(&left, &right, &options)?;
    println!("{}", equivalence.summary(&options));
    Ok(())
}

fn read_payload(path: &Path) -> Result<Payload> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        ExError::new(ExErrorKind::Io)
            .with_op("read_payload")
            .with_subject(path.display().to_string())
            .with_message(format!("Failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&text).map_err(|e| {
        ExError::new(ExErrorKind::InvalidPayload)
            .with_op("read_payload")
            .with_subject(path.display().to_string())
            .with_message(format!("Failed to parse {} as JSON: {}", path.display(), e))
    })
}
