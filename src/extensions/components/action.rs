//! Action definitions.
//!
//! Actions are attached to list items, lists and detail views, returned by
//! `action`-mode commands, and declared as root items in manifests. They are a
//! closed set tagged by `type`.

use serde::{Deserialize, Serialize};

use super::common::Params;

/// A single action that can be triggered by the user or an extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Display title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Single-character shortcut, triggered with Alt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(flatten)]
    pub kind: ActionKind,
}

/// The tagged payload of an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActionKind {
    /// Run a command, of this extension unless `extension` names another one
    Run {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        extension: Option<String>,
        command: String,
        #[serde(default, skip_serializing_if = "Params::is_empty")]
        params: Params,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        reload: bool,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        exit: bool,
    },
    /// Open a URL or path
    Open {
        target: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        app: Option<String>,
    },
    /// Copy text to the clipboard
    Copy { text: String },
    /// Reload the current view, merging params
    Reload {
        #[serde(default, skip_serializing_if = "Params::is_empty")]
        params: Params,
    },
    /// Exit the launcher
    Exit,
}

/// Tags accepted in the `type` field.
pub const ACTION_TYPES: [&str; 5] = ["run", "open", "copy", "reload", "exit"];

impl Action {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            title: None,
            key: None,
            kind,
        }
    }

    pub fn run(command: impl Into<String>) -> Self {
        Self::new(ActionKind::Run {
            extension: None,
            command: command.into(),
            params: Params::new(),
            reload: false,
            exit: false,
        })
    }

    /// Title shown in footers and the action panel.
    pub fn display_title(&self) -> &str {
        if let Some(title) = self.title.as_deref() {
            return title;
        }
        match &self.kind {
            ActionKind::Run { .. } => "Run",
            ActionKind::Open { .. } => "Open",
            ActionKind::Copy { .. } => "Copy",
            ActionKind::Reload { .. } => "Reload",
            ActionKind::Exit => "Exit",
        }
    }

    /// Shortcut character, if one is bound.
    pub fn shortcut(&self) -> Option<char> {
        self.key.as_deref().and_then(|k| k.chars().next())
    }

    /// Fill in the extension a run action targets when it is left implicit.
    pub fn bind_extension(mut self, extension: &str) -> Self {
        if let ActionKind::Run {
            extension: target @ None,
            ..
        } = &mut self.kind
        {
            *target = Some(extension.to_string());
        }
        self
    }
}
