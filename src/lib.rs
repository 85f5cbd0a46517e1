//! Sunbeam - extensible terminal launcher.
//!
//! Extensions are plain executables that describe themselves with a JSON
//! manifest and answer command invocations with JSON lists, details or
//! actions. Sunbeam discovers them, caches their manifests, and renders
//! their output as a keyboard-driven terminal UI.
//!
//! # Architecture
//!
//! - [`extensions`] - Protocol types, schema validation, manifest cache and
//!   subprocess invocation
//! - [`core`] - Incremental fuzzy filter
//! - [`tui`] - Page stack, runners, action dispatch and views
//! - [`services`] - Root item history
//! - [`platform`] - Clipboard, opener and editor integration
//! - [`config`] - Configuration loading
//! - [`cli`] - Command-line entry point
//!
//! # Example
//!
//! ```ignore
//! use sunbeam::{Registry, Catalog};
//!
//! let registry = Registry::new(Registry::default_cache_dir());
//! let catalog: Catalog = registry
//!     .scan("~/.config/sunbeam/extensions".as_ref(), false)
//!     .into_iter()
//!     .collect();
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod extensions;
pub mod platform;
pub mod services;
pub mod tui;

mod error;

pub use config::Config;
pub use core::{Filter, FilterItem};
pub use error::{SunbeamError, SunbeamResult};
pub use extensions::{Action, Catalog, Extension, ExtensionError, Manifest, Registry};
pub use platform::{Platform, SystemPlatform};
