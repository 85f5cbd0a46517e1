//! Command-line entry point.
//!
//! `sunbeam` with no arguments opens the root list. Every other first
//! argument names an extension, whose commands become subcommands built from
//! its manifest (see [`extension`]).

pub mod extension;
pub mod validate;

use std::fs;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::config::Config;
use crate::extensions::{Catalog, Registry};
use crate::platform::SystemPlatform;
use crate::services::History;
use crate::tui::runner::root_list;
use crate::tui::{App, Context, Page, Runner, Theme};

#[derive(Parser)]
#[command(name = "sunbeam")]
#[command(about = "Extensible terminal launcher", long_about = None, version)]
pub struct Cli {
    /// Re-extract every extension manifest, ignoring the cache
    #[arg(long, global = true)]
    pub reload: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a document against the extension protocol
    Validate {
        /// Kind of document
        #[arg(value_enum)]
        kind: validate::DocumentArg,

        /// File to read (default: stdin)
        file: Option<PathBuf>,
    },

    /// Run an extension: sunbeam <extension> [command] [--param value]...
    #[command(external_subcommand)]
    External(Vec<String>),
}

/// Loaded state shared by every entry point.
pub struct Session {
    pub config: Config,
    pub registry: Registry,
    pub catalog: Catalog,
    pub history: History,
}

impl Session {
    /// Load config, extensions and history. Failing extensions are skipped.
    pub fn load(reload: bool) -> anyhow::Result<Self> {
        let config = Config::load();
        let registry = Registry::new(Registry::default_cache_dir());
        fs::create_dir_all(registry.cache_dir()).with_context(|| {
            format!(
                "failed to create cache directory {}",
                registry.cache_dir().display()
            )
        })?;

        let mut extensions = registry.scan(&config.extensions_dir(), reload);
        for (alias, path) in config.extension_paths() {
            match registry.load_as(alias, &path, reload) {
                Ok(extension) => extensions.push(extension),
                Err(e) => warn!(alias = %alias, error = %e, "skipping extension"),
            }
        }
        let catalog: Catalog = extensions.into_iter().collect();
        info!(extensions = catalog.len(), "extensions loaded");

        let history = config
            .history_path()
            .map(|path| History::load(&path))
            .unwrap_or_default();

        Ok(Self {
            config,
            registry,
            catalog,
            history,
        })
    }

    /// Open the terminal UI with the page built by `root`.
    pub fn run_tui(self, root: impl FnOnce(Context) -> Box<dyn Page>) -> anyhow::Result<()> {
        let theme = Theme::from_config(&self.config);
        let platform = SystemPlatform::new(&self.config);
        let height = self.config.appearance.height;
        let ctx = Context::new(self.catalog, self.history, theme);
        let page = root(ctx);
        App::new(self.registry, Box::new(platform), height).run(page)
    }

    /// Root list across the catalog, or of one extension.
    pub fn run_root(self, only: Option<String>) -> anyhow::Result<()> {
        if !io::stdout().is_terminal() {
            let list = root_list(&self.catalog, &self.history, only.as_deref());
            println!("{}", serde_json::to_string_pretty(&list)?);
            return Ok(());
        }
        self.run_tui(|ctx| Box::new(Runner::root(ctx, only)))
    }
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Validate { kind, file }) => validate::run(kind.into(), file.as_deref()),
        Some(Commands::External(args)) => extension::run(Session::load(cli.reload)?, args),
        None => Session::load(cli.reload)?.run_root(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_external_subcommand_collects_args() {
        let cli = Cli::try_parse_from(["sunbeam", "--reload", "files", "browse", "--dir", "/tmp"])
            .unwrap();
        assert!(cli.reload);
        match cli.command {
            Some(Commands::External(args)) => {
                assert_eq!(args, vec!["files", "browse", "--dir", "/tmp"])
            }
            _ => panic!("expected an extension invocation"),
        }
    }

    #[test]
    fn test_validate_subcommand() {
        let cli = Cli::try_parse_from(["sunbeam", "validate", "list", "out.json"]).unwrap();
        match cli.command {
            Some(Commands::Validate { kind, file }) => {
                assert_eq!(kind, validate::DocumentArg::List);
                assert_eq!(file, Some(PathBuf::from("out.json")));
            }
            _ => panic!("expected validate"),
        }
    }
}
