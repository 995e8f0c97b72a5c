//! Fetcher backed by an external client process.
//!
//! The other client ships a task that prints one clan's raw JSON to stdout.
//! We run it, wait for it, and parse whatever it printed. stderr is captured
//! and only surfaced when the process fails. Dropping the fetch future kills
//! the child, so an interrupted run never leaves it behind.

use super::Fetcher;
use async_trait::async_trait;
use clandiff_core::errors::{ExError, ExErrorKind};
use clandiff_core::{log_op_end, log_op_error, log_op_start};
use clandiff_core::{Payload, Result, RunConfig};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

const OP: &str = "fetch_external";

/// Build task that dumps a clan as raw JSON
pub const DEFAULT_TASK: &str = ":coc-java:runClanRawDump";

/// Replaced by the clan tag in every argument
pub const TAG_PLACEHOLDER: &str = "{tag}";

/// Program, argument template, working directory and extra environment
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalCommand {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    env: Vec<(String, String)>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
        }
    }

    /// The Gradle wrapper under `repo_root`, running [`DEFAULT_TASK`]
    pub fn gradle(repo_root: &Path) -> Self {
        let wrapper = if cfg!(windows) {
            "gradlew.bat"
        } else {
            "gradlew"
        };
        Self::new(repo_root.join(wrapper))
            .args(["-q", DEFAULT_TASK, "--args={tag}"])
            .current_dir(repo_root)
    }

    /// Replace the argument template
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Share the run's credentials with the child
    ///
    /// Variables already present in the process environment are inherited
    /// as-is and not overridden.
    pub fn with_credentials(mut self, config: &RunConfig) -> Self {
        for (key, value) in config.credential_env(|name| std::env::var(name).ok()) {
            self.env.push((key.to_string(), value));
        }
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments with the tag substituted
    pub fn resolved_args(&self, tag: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.replace(TAG_PLACEHOLDER, tag))
            .collect()
    }

    /// Display form for messages; environment values are left out
    pub fn display(&self, tag: &str) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.resolved_args(tag));
        parts.join(" ")
    }
}

/// Runs an [`ExternalCommand`] and parses its stdout as the payload
#[derive(Debug, Clone)]
pub struct ExternalFetcher {
    command: ExternalCommand,
    label: String,
}

impl ExternalFetcher {
    pub fn new(command: ExternalCommand) -> Self {
        Self {
            command,
            label: "external".to_string(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Run the command to completion
    ///
    /// # Errors
    ///
    /// - `Io` if the process cannot be started
    /// - `ExternalProcess` on non-zero exit (stderr attached as detail)
    /// - `EmptyOutput` / `InvalidPayload` from [`parse_output`]
    pub async fn run(&self, tag: &str) -> Result<Payload> {
        let mut cmd = Command::new(&self.command.program);
        cmd.args(self.command.resolved_args(tag))
            .envs(self.command.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = &self.command.cwd {
            cmd.current_dir(dir);
        }

        tracing::debug!(command = %self.command.display(tag), "spawning external client");
        let output = cmd.output().await.map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op(OP)
                .with_subject(self.command.program.display().to_string())
                .with_message(format!(
                    "Failed to start external client {}: {}",
                    self.command.program.display(),
                    e
                ))
        })?;

        if !output.status.success() {
            let status = match output.status.code() {
                Some(code) => format!("exit code {}", code),
                None => "no exit code (terminated by signal)".to_string(),
            };
            return Err(ExError::new(ExErrorKind::ExternalProcess)
                .with_op(OP)
                .with_subject(tag)
                .with_message(format!("External client execution failed with {}", status))
                .with_detail(String::from_utf8_lossy(&output.stderr).into_owned()));
        }

        parse_output(&String::from_utf8_lossy(&output.stdout))
    }
}

#[async_trait]
impl Fetcher for ExternalFetcher {
    fn label(&self) -> &str {
        &self.label
    }

    fn progress_line(&self, _tag: &str) -> String {
        format!("Fetching clan using {} client...", self.label)
    }

    async fn fetch(&self, tag: &str) -> Result<Payload> {
        log_op_start!(OP, clan_tag = tag);
        let start = std::time::Instant::now();

        let result = self.run(tag).await;

        match &result {
            Ok(_) => {
                log_op_end!(OP, duration_ms = start.elapsed().as_millis() as u64);
            }
            Err(e) => {
                log_op_error!(OP, *e, duration_ms = start.elapsed().as_millis() as u64);
            }
        }
        result
    }
}

/// Parse captured stdout into a payload
///
/// Surrounding whitespace is ignored.
///
/// # Errors
///
/// - `EmptyOutput` if nothing but whitespace was printed
/// - `InvalidPayload` if the text is not JSON; the text is attached as detail
pub fn parse_output(stdout: &str) -> Result<Payload> {
    let output = stdout.trim();
    if output.is_empty() {
        return Err(ExError::new(ExErrorKind::EmptyOutput)
            .with_op(OP)
            .with_message("External client did not return any JSON output"));
    }
    serde_json::from_str(output).map_err(|e| {
        ExError::new(ExErrorKind::InvalidPayload)
            .with_op(OP)
            .with_message(format!(
                "Failed to parse external client output as JSON: {}",
                e
            ))
            .with_detail(output.to_string())
    })
}
