use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{SunbeamError, SunbeamResult};

/// Environment variable overriding the config file location.
pub const ENV_CONFIG: &str = "SUNBEAM_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub appearance: AppearanceConfig,
    /// Extra entrypoints by alias
    #[serde(default)]
    pub extensions: BTreeMap<String, ExtensionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory scanned for extension entrypoints
    pub extensions_dir: String,
    /// Editor command; falls back to $VISUAL, then $EDITOR
    pub editor: Option<String>,
    /// Shell command that receives copied text on stdin
    pub copy_command: Option<String>,
    /// History file; defaults to the platform state directory
    pub history_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    pub accent_color: String,
    /// Rows used by the UI; 0 means the full terminal
    pub height: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            extensions_dir: "~/.config/sunbeam/extensions".to_string(),
            editor: None,
            copy_command: None,
            history_path: None,
        }
    }
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            accent_color: "#cba6f7".to_string(),
            height: 0,
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(ENV_CONFIG) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|h| h.join(".config"))
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
            })
            .join("sunbeam")
            .join("config.toml")
    }

    /// Load config from the default path, or return defaults if not found
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`; unreadable or invalid files yield defaults
    pub fn load_from(path: &Path) -> Self {
        let mut config = if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => config,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "failed to parse config");
                        Self::default()
                    }
                },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to read config");
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        config.validate();
        config
    }

    /// Parse config from a TOML string
    pub fn parse(content: &str) -> SunbeamResult<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.validate();
        Ok(config)
    }

    /// Clamp values to acceptable ranges
    fn validate(&mut self) {
        if self.appearance.height != 0 {
            self.appearance.height = self.appearance.height.clamp(5, 200);
        }

        if parse_hex_color(&self.appearance.accent_color).is_none() {
            warn!(color = %self.appearance.accent_color, "invalid accent color");
            self.appearance.accent_color = AppearanceConfig::default().accent_color;
        }

        for value in [&mut self.general.editor, &mut self.general.copy_command] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *value = None;
            }
        }
    }

    pub fn extensions_dir(&self) -> PathBuf {
        expand_path(&self.general.extensions_dir)
    }

    pub fn history_path(&self) -> Option<PathBuf> {
        match &self.general.history_path {
            Some(path) => Some(expand_path(path)),
            None => crate::services::History::default_path(),
        }
    }

    /// Extra entrypoints declared under `[extensions.<alias>]`
    pub fn extension_paths(&self) -> impl Iterator<Item = (&str, PathBuf)> + '_ {
        self.extensions
            .iter()
            .map(|(alias, ext)| (alias.as_str(), expand_path(&ext.path)))
    }

    /// Editor command: config, then $VISUAL, then $EDITOR, then vi
    pub fn editor(&self) -> String {
        self.general
            .editor
            .clone()
            .or_else(|| std::env::var("VISUAL").ok().filter(|v| !v.is_empty()))
            .or_else(|| std::env::var("EDITOR").ok().filter(|v| !v.is_empty()))
            .unwrap_or_else(|| "vi".to_string())
    }

    /// Save config to file
    pub fn save(&self) -> SunbeamResult<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| SunbeamError::Config(e.to_string()))?;
        fs::write(&path, content)?;

        Ok(())
    }
}

/// Expand `~` and environment variables in a path
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::full(path).map(|p| p.into_owned()).unwrap_or_else(|_| {
        shellexpand::tilde(path).into_owned()
    }))
}

/// Parse a hex color string like "#cba6f7" to (r, g, b)
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.appearance.height, 0);
        assert!(config.general.copy_command.is_none());
        assert!(config.extensions.is_empty());
    }

    #[test]
    fn test_parse_partial_config() {
        let config = Config::parse(
            r##"
            [general]
            editor = "nvim"

            [extensions.gh]
            path = "/opt/ext/github.sh"
            "##,
        )
        .unwrap();

        assert_eq!(config.editor(), "nvim");
        assert_eq!(config.appearance.accent_color, "#cba6f7");
        let paths: Vec<_> = config.extension_paths().collect();
        assert_eq!(paths, vec![("gh", PathBuf::from("/opt/ext/github.sh"))]);
    }

    #[test]
    fn test_validate_clamps() {
        let config = Config::parse(
            r##"
            [general]
            copy_command = "  "

            [appearance]
            height = 2
            accent_color = "purple"
            "##,
        )
        .unwrap();

        assert_eq!(config.appearance.height, 5);
        assert_eq!(config.appearance.accent_color, "#cba6f7");
        assert!(config.general.copy_command.is_none());
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "this is = = not toml").unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.general.extensions_dir, "~/.config/sunbeam/extensions");
    }

    #[test]
    fn test_parse_error_is_reported() {
        assert!(matches!(
            Config::parse("[general"),
            Err(SunbeamError::TomlParse(_))
        ));
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_path("~/ext");
        assert!(!expanded.to_string_lossy().starts_with('~'));
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#cba6f7"), Some((203, 166, 247)));
        assert_eq!(parse_hex_color("fff"), None);
    }
}
