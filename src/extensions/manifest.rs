//! Extension manifest types.
//!
//! An extension describes itself by printing a manifest on stdout when run
//! with no arguments. The manifest defines:
//! - Extension metadata (title, description)
//! - Root actions surfaced in the top-level list
//! - Commands, each with a display mode and parameter specs

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::components::{Action, ParamValue};
use super::error::ExtensionError;

/// Complete manifest as printed by an extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub root: Vec<Action>,

    #[serde(default)]
    pub commands: Vec<CommandSpec>,
}

impl Manifest {
    pub fn command(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.iter().find(|c| c.name == name)
    }
}

/// A named operation within an extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub mode: Mode,

    #[serde(default)]
    pub params: Vec<ParamSpec>,
}

impl CommandSpec {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }
}

/// How a command's output is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// List re-generated by the command on every query
    Search,
    /// List filtered by the launcher
    Filter,
    /// Text or markdown view
    Detail,
    /// Runs without output, then exits or reloads
    Silent,
    /// Output is an action to dispatch
    Action,
}

/// Modes accepted in a manifest.
pub const MODES: [&str; 5] = ["search", "filter", "detail", "silent", "action"];

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Filter => "filter",
            Self::Detail => "detail",
            Self::Silent => "silent",
            Self::Action => "action",
        }
    }

    /// Modes that render a page in the terminal.
    pub fn is_view(&self) -> bool {
        matches!(self, Self::Search | Self::Filter | Self::Detail)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ExtensionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "search" => Ok(Self::Search),
            "filter" => Ok(Self::Filter),
            "detail" => Ok(Self::Detail),
            "silent" => Ok(Self::Silent),
            "action" => Ok(Self::Action),
            other => Err(ExtensionError::UnknownMode(other.to_string())),
        }
    }
}

/// A declared command parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "type")]
    pub kind: ParamKind,

    #[serde(default)]
    pub optional: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ParamValue>,
}

impl ParamSpec {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Required params without a default must be supplied by the caller.
    pub fn is_required(&self) -> bool {
        !self.optional && self.default.is_none()
    }
}

/// Type of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Boolean,
    Number,
}

/// A loaded extension: identity plus its manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct Extension {
    /// Stable name derived from the entrypoint's file name
    pub name: String,
    /// Executable path
    pub entrypoint: PathBuf,
    pub manifest: Manifest,
}

impl Extension {
    pub fn title(&self) -> &str {
        &self.manifest.title
    }

    pub fn command(&self, name: &str) -> Result<&CommandSpec, ExtensionError> {
        self.manifest
            .command(name)
            .ok_or_else(|| ExtensionError::CommandNotFound {
                extension: self.name.clone(),
                command: name.to_string(),
            })
    }

    /// Root actions with their target extension bound to this one.
    pub fn root_actions(&self) -> Vec<Action> {
        self.manifest
            .root
            .iter()
            .cloned()
            .map(|action| action.bind_extension(&self.name))
            .collect()
    }
}
