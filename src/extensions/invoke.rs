//! Command invocation.
//!
//! A command runs as `<entrypoint> <command>` with `SUNBEAM=1` set and the
//! resolved parameter map written to stdin as one JSON object.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::Stdio;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::components::Params;
use super::error::{ExtensionError, ExtensionResult};
use super::manifest::{CommandSpec, Extension, ParamSpec};

/// Environment marker set for every extension process.
pub const ENV_MARKER: &str = "SUNBEAM";

/// Environment variable carrying the live query of dynamic lists.
pub const ENV_QUERY: &str = "SUNBEAM_QUERY";

static ANSI_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").expect("valid ANSI pattern"));

/// Remove terminal color and cursor sequences.
pub fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}

/// Required params of `command` that `params` does not supply.
pub fn missing_params<'a>(command: &'a CommandSpec, params: &Params) -> Vec<&'a ParamSpec> {
    command
        .params
        .iter()
        .filter(|spec| spec.is_required() && !params.contains_key(&spec.name))
        .collect()
}

/// Fill in defaults and check that every required param is present.
///
/// Params the command does not declare are passed through untouched.
pub fn resolve_params(command: &CommandSpec, params: &Params) -> ExtensionResult<Params> {
    let mut resolved = params.clone();

    for spec in &command.params {
        if resolved.contains_key(&spec.name) {
            continue;
        }
        match &spec.default {
            Some(default) => {
                resolved.insert(spec.name.clone(), default.clone());
            }
            None if spec.optional => {}
            None => {
                return Err(ExtensionError::MissingRequiredParam {
                    command: command.name.clone(),
                    param: spec.name.clone(),
                });
            }
        }
    }

    Ok(resolved)
}

/// A fully resolved command invocation, ready to spawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub entrypoint: PathBuf,
    pub command: String,
    pub params: Params,
    pub query: Option<String>,
}

impl Invocation {
    /// Resolve params against the command spec. Fails before anything is
    /// spawned when a required param is missing.
    pub fn new(
        extension: &Extension,
        command: &CommandSpec,
        params: &Params,
    ) -> ExtensionResult<Self> {
        Ok(Self {
            entrypoint: extension.entrypoint.clone(),
            command: command.name.clone(),
            params: resolve_params(command, params)?,
            query: None,
        })
    }

    pub fn with_query(mut self, query: Option<String>) -> Self {
        self.query = query;
        self
    }

    fn payload(&self) -> ExtensionResult<Vec<u8>> {
        Ok(serde_json::to_vec(&self.params)?)
    }

    fn std_command(&self) -> std::process::Command {
        let mut command = std::process::Command::new(&self.entrypoint);
        command.arg(&self.command);
        command.env(ENV_MARKER, "1");
        if let Some(query) = &self.query {
            command.env(ENV_QUERY, query);
        }
        if let Some(dir) = self.entrypoint.parent() {
            command.current_dir(dir);
        }
        command
    }

    /// Run to completion and return captured stdout.
    pub async fn output(&self) -> ExtensionResult<Vec<u8>> {
        let payload = self.payload()?;
        debug!(
            entrypoint = %self.entrypoint.display(),
            command = %self.command,
            "invoking command"
        );

        let mut child = tokio::process::Command::from(self.std_command())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child.stdin.take();
        let write = async move {
            if let Some(mut stdin) = stdin {
                match stdin.write_all(&payload).await {
                    Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e),
                    _ => {}
                }
            }
            Ok(())
        };

        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output?;

        if !output.status.success() {
            return Err(ExtensionError::CommandFailed(failure_message(
                &output.stderr,
                output.status,
            )));
        }
        written?;

        Ok(output.stdout)
    }

    /// Run with stdout and stderr attached to the launcher's own streams.
    pub fn run_inherited(&self) -> ExtensionResult<()> {
        let payload = self.payload()?;
        let mut child = self
            .std_command()
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(&payload) {
                Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e.into()),
                _ => {}
            }
        }

        let status = child.wait()?;
        if !status.success() {
            return Err(ExtensionError::CommandFailed(format!(
                "{} exited with {}",
                self.command, status
            )));
        }
        Ok(())
    }
}

/// Diagnostic text for a failed extension process.
pub(crate) fn failure_message(stderr: &[u8], status: std::process::ExitStatus) -> String {
    let stderr = strip_ansi(&String::from_utf8_lossy(stderr));
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("process exited with {}", status)
    } else {
        stderr.to_string()
    }
}
