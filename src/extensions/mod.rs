//! Extension system for Sunbeam.
//!
//! Extensions are executables that speak a small JSON protocol:
//!
//! - Run with no arguments (and `SUNBEAM=1` set), an extension prints its
//!   [`Manifest`]: title, root actions and command specs.
//! - Run with a command name as its only argument, it reads the resolved
//!   parameter map from stdin and prints a document matching the command's
//!   [`Mode`]: a list, a detail view, or an action.
//!
//! # Architecture
//!
//! - [`registry`] - Manifest extraction and on-disk cache
//! - [`invoke`] - Parameter resolution and subprocess invocation
//! - [`schema`] - Validation of every document before it is trusted
//! - [`components`] - Typed protocol documents
//! - [`catalog`] - The set of loaded extensions

pub mod catalog;
pub mod components;
pub mod error;
pub mod invoke;
pub mod manifest;
pub mod registry;
pub mod schema;

pub use catalog::{Catalog, RootEntry};
pub use components::{Action, ActionKind, Detail, List, ListItem, ParamValue, Params};
pub use error::{ExtensionError, ExtensionResult};
pub use invoke::{resolve_params, Invocation};
pub use manifest::{CommandSpec, Extension, Manifest, Mode, ParamKind, ParamSpec};
pub use registry::Registry;
