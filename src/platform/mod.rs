//! Platform abstraction layer.
//!
//! The `Platform` trait covers the OS integration the launcher needs once an
//! action resolves to a side effect: writing the clipboard, opening a URL or
//! path, and handing the terminal to an editor.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Mutex;

use tracing::debug;

use crate::config::Config;
use crate::error::{SunbeamError, SunbeamResult};

/// Platform-specific operations.
pub trait Platform {
    /// Write text to the system clipboard.
    fn copy(&self, text: &str) -> SunbeamResult<()>;

    /// Open a URL or path, optionally with a specific application.
    fn open(&self, target: &str, app: Option<&str>) -> SunbeamResult<()>;

    /// Open `path` in the user's editor and wait for it to exit.
    ///
    /// The caller must release the terminal first.
    fn edit(&self, path: &Path) -> SunbeamResult<()>;
}

/// Default platform: arboard clipboard (or a configured copy command), the
/// `open` crate, and a shell-launched editor.
pub struct SystemPlatform {
    clipboard: Mutex<Option<arboard::Clipboard>>,
    copy_command: Option<String>,
    editor: String,
}

impl SystemPlatform {
    pub fn new(config: &Config) -> Self {
        Self {
            clipboard: Mutex::new(None),
            copy_command: config.general.copy_command.clone(),
            editor: config.editor(),
        }
    }

    fn copy_with_command(&self, command: &str, text: &str) -> SunbeamResult<()> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| SunbeamError::Clipboard(e.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|e| SunbeamError::Clipboard(e.to_string()))?;
        }

        let status = child
            .wait()
            .map_err(|e| SunbeamError::Clipboard(e.to_string()))?;
        if !status.success() {
            return Err(SunbeamError::Clipboard(format!(
                "'{}' exited with {}",
                command, status
            )));
        }
        Ok(())
    }
}

impl Platform for SystemPlatform {
    fn copy(&self, text: &str) -> SunbeamResult<()> {
        if let Some(command) = &self.copy_command {
            debug!(command = %command, "copying with command");
            return self.copy_with_command(command, text);
        }

        let mut guard = self
            .clipboard
            .lock()
            .map_err(|e| SunbeamError::Clipboard(e.to_string()))?;
        if guard.is_none() {
            *guard = Some(
                arboard::Clipboard::new().map_err(|e| SunbeamError::Clipboard(e.to_string()))?,
            );
        }
        match guard.as_mut() {
            Some(clipboard) => clipboard
                .set_text(text)
                .map_err(|e| SunbeamError::Clipboard(e.to_string())),
            None => Err(SunbeamError::Clipboard("clipboard unavailable".to_string())),
        }
    }

    fn open(&self, target: &str, app: Option<&str>) -> SunbeamResult<()> {
        debug!(target = %target, app = ?app, "opening");
        match app {
            Some(app) => open::with(target, app),
            None => open::that(target),
        }
        .map_err(|e| SunbeamError::Open(format!("{}: {}", target, e)))
    }

    fn edit(&self, path: &Path) -> SunbeamResult<()> {
        let status = Command::new("sh")
            .arg("-c")
            .arg(format!("{} \"$1\"", self.editor))
            .arg("sh")
            .arg(path)
            .status()
            .map_err(|e| SunbeamError::Editor(e.to_string()))?;

        if !status.success() {
            return Err(SunbeamError::Editor(format!(
                "'{}' exited with {}",
                self.editor, status
            )));
        }
        Ok(())
    }
}
