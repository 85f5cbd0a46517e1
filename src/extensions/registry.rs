//! Extension registry.
//!
//! The registry turns entrypoints into [`Extension`]s. Manifests are extracted
//! by running the entrypoint with no arguments and cached on disk, one JSON
//! file per extension. A cached manifest is trusted only while it is at least
//! as new as the entrypoint.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::SystemTime;

use tracing::{debug, info, warn};

use super::error::{ExtensionError, ExtensionResult};
use super::invoke::{failure_message, ENV_MARKER};
use super::manifest::{Extension, Manifest};
use super::schema;

/// Loads extensions and maintains the manifest cache.
#[derive(Debug, Clone)]
pub struct Registry {
    cache_dir: PathBuf,
    nested: bool,
}

impl Registry {
    /// Create a registry caching manifests under `cache_dir`.
    ///
    /// Running inside an extension (`SUNBEAM` set) is detected here.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            nested: std::env::var_os(ENV_MARKER).is_some(),
        }
    }

    pub fn with_nested(mut self, nested: bool) -> Self {
        self.nested = nested;
        self
    }

    /// Default cache location.
    pub fn default_cache_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("sunbeam")
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of the cached manifest for an extension.
    pub fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir
            .join("extensions")
            .join(format!("{}.json", name))
    }

    /// Load an extension, from cache when fresh.
    pub fn load(&self, entrypoint: &Path, force: bool) -> ExtensionResult<Extension> {
        let name = extension_name(entrypoint)
            .ok_or_else(|| ExtensionError::NotFound(entrypoint.to_path_buf()))?;
        self.load_as(&name, entrypoint, force)
    }

    /// Load an extension under an explicit name.
    pub fn load_as(
        &self,
        name: &str,
        entrypoint: &Path,
        force: bool,
    ) -> ExtensionResult<Extension> {
        let resolved = fs::canonicalize(entrypoint)
            .map_err(|_| ExtensionError::NotFound(entrypoint.to_path_buf()))?;
        let modified = fs::metadata(&resolved)?.modified()?;

        let cache_path = self.cache_path(name);
        let cached = if force {
            None
        } else {
            self.read_cache(&cache_path, modified)
        };

        let manifest = match cached {
            Some(manifest) => {
                debug!(extension = name, "using cached manifest");
                manifest
            }
            None => {
                let manifest = self.extract(&resolved)?;
                self.write_cache(&cache_path, &manifest)?;
                info!(extension = name, "extracted manifest");
                manifest
            }
        };

        Ok(Extension {
            name: name.to_string(),
            entrypoint: resolved,
            manifest,
        })
    }

    /// Load every entrypoint in a directory. Failures are logged and skipped.
    pub fn scan(&self, dir: &Path, force: bool) -> Vec<Extension> {
        let Ok(entries) = fs::read_dir(dir) else {
            debug!(dir = %dir.display(), "extensions directory not readable");
            return Vec::new();
        };

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                let hidden = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with('.'))
                    .unwrap_or(true);
                !hidden && path.is_file()
            })
            .collect();
        paths.sort();

        let mut extensions = Vec::new();
        for path in paths {
            match self.load(&path, force) {
                Ok(extension) => extensions.push(extension),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping extension"),
            }
        }
        extensions
    }

    /// The cached manifest, if it exists, decodes, and is not older than
    /// the entrypoint.
    fn read_cache(&self, path: &Path, entrypoint_modified: SystemTime) -> Option<Manifest> {
        let cache_modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
        if cache_modified < entrypoint_modified {
            debug!(cache = %path.display(), "cached manifest is stale");
            return None;
        }

        let bytes = fs::read(path).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                warn!(cache = %path.display(), error = %e, "ignoring corrupt manifest cache");
                None
            }
        }
    }

    fn write_cache(&self, path: &Path, manifest: &Manifest) -> ExtensionResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec_pretty(manifest)?)?;
        Ok(())
    }

    /// Run the entrypoint with no arguments and decode its manifest.
    fn extract(&self, entrypoint: &Path) -> ExtensionResult<Manifest> {
        if self.nested {
            return Err(ExtensionError::Nested);
        }

        let mut command = Command::new(entrypoint);
        command
            .env(ENV_MARKER, "1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = entrypoint.parent() {
            command.current_dir(dir);
        }

        let output = command
            .output()
            .map_err(|e| ExtensionError::ExecutionFailed {
                entrypoint: entrypoint.to_path_buf(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ExtensionError::ExecutionFailed {
                entrypoint: entrypoint.to_path_buf(),
                message: failure_message(&output.stderr, output.status),
            });
        }

        schema::decode_manifest(&output.stdout)
    }
}

/// Extension name for an entrypoint: its file name without extension.
pub fn extension_name(entrypoint: &Path) -> Option<String> {
    entrypoint
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_name() {
        assert_eq!(
            extension_name(Path::new("/ext/github.sh")).as_deref(),
            Some("github")
        );
        assert_eq!(extension_name(Path::new("/ext/files")).as_deref(), Some("files"));
    }

    #[test]
    fn test_load_missing_entrypoint() {
        let temp = tempfile::tempdir().unwrap();
        let registry = Registry::new(temp.path()).with_nested(false);

        let err = registry
            .load(&temp.path().join("absent.sh"), false)
            .unwrap_err();
        assert!(matches!(err, ExtensionError::NotFound(_)));
    }

    #[test]
    fn test_scan_nonexistent_dir() {
        let temp = tempfile::tempdir().unwrap();
        let registry = Registry::new(temp.path()).with_nested(false);
        assert!(registry.scan(&temp.path().join("nope"), false).is_empty());
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use filetime::FileTime;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::tempdir;

        const MANIFEST_A: &str =
            r#"{"title": "First", "commands": [{"name": "a", "mode": "filter"}]}"#;
        const MANIFEST_B: &str =
            r#"{"title": "Second", "commands": [{"name": "b", "mode": "detail"}]}"#;

        fn write_extension(dir: &Path, name: &str, manifest: &str) -> PathBuf {
            let path = dir.join(format!("{}.sh", name));
            fs::write(&path, format!("#!/bin/sh\ncat <<'EOF'\n{}\nEOF\n", manifest)).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn set_mtime(path: &Path, unix_secs: i64) {
            filetime::set_file_mtime(path, FileTime::from_unix_time(unix_secs, 0)).unwrap();
        }

        #[test]
        fn test_load_extracts_and_caches() {
            let ext_dir = tempdir().unwrap();
            let cache_dir = tempdir().unwrap();
            let path = write_extension(ext_dir.path(), "first", MANIFEST_A);
            let registry = Registry::new(cache_dir.path()).with_nested(false);

            let extension = registry.load(&path, false).unwrap();
            assert_eq!(extension.name, "first");
            assert_eq!(extension.title(), "First");
            assert!(registry.cache_path("first").exists());
        }

        #[test]
        fn test_fresh_cache_is_trusted() {
            let ext_dir = tempdir().unwrap();
            let cache_dir = tempdir().unwrap();
            let path = write_extension(ext_dir.path(), "ext", MANIFEST_A);
            let registry = Registry::new(cache_dir.path()).with_nested(false);
            registry.load(&path, false).unwrap();

            // Rewrite the source but keep it older than the cache.
            write_extension(ext_dir.path(), "ext", MANIFEST_B);
            set_mtime(&path, 1_000_000);
            set_mtime(&registry.cache_path("ext"), 2_000_000);

            let extension = registry.load(&path, false).unwrap();
            assert_eq!(extension.title(), "First");
        }

        #[test]
        fn test_equal_timestamps_trust_cache() {
            let ext_dir = tempdir().unwrap();
            let cache_dir = tempdir().unwrap();
            let path = write_extension(ext_dir.path(), "ext", MANIFEST_A);
            let registry = Registry::new(cache_dir.path()).with_nested(false);
            registry.load(&path, false).unwrap();

            write_extension(ext_dir.path(), "ext", MANIFEST_B);
            set_mtime(&path, 1_500_000);
            set_mtime(&registry.cache_path("ext"), 1_500_000);

            assert_eq!(registry.load(&path, false).unwrap().title(), "First");
        }

        #[test]
        fn test_newer_entrypoint_reextracts() {
            let ext_dir = tempdir().unwrap();
            let cache_dir = tempdir().unwrap();
            let path = write_extension(ext_dir.path(), "ext", MANIFEST_A);
            let registry = Registry::new(cache_dir.path()).with_nested(false);
            registry.load(&path, false).unwrap();

            write_extension(ext_dir.path(), "ext", MANIFEST_B);
            set_mtime(&registry.cache_path("ext"), 1_000_000);
            set_mtime(&path, 2_000_000);

            let extension = registry.load(&path, false).unwrap();
            assert_eq!(extension.title(), "Second");
        }

        #[test]
        fn test_force_reload_bypasses_cache() {
            let ext_dir = tempdir().unwrap();
            let cache_dir = tempdir().unwrap();
            let path = write_extension(ext_dir.path(), "ext", MANIFEST_A);
            let registry = Registry::new(cache_dir.path()).with_nested(false);
            registry.load(&path, false).unwrap();

            write_extension(ext_dir.path(), "ext", MANIFEST_B);
            set_mtime(&path, 1_000_000);
            set_mtime(&registry.cache_path("ext"), 2_000_000);

            assert_eq!(registry.load(&path, true).unwrap().title(), "Second");
        }

        #[test]
        fn test_reextraction_is_idempotent() {
            let ext_dir = tempdir().unwrap();
            let cache_dir = tempdir().unwrap();
            let path = write_extension(ext_dir.path(), "ext", MANIFEST_A);
            let registry = Registry::new(cache_dir.path()).with_nested(false);

            let first = registry.load(&path, true).unwrap();
            let cached_first = fs::read(registry.cache_path("ext")).unwrap();
            let second = registry.load(&path, true).unwrap();
            let cached_second = fs::read(registry.cache_path("ext")).unwrap();

            assert_eq!(first.manifest, second.manifest);
            assert_eq!(cached_first, cached_second);
        }

        #[test]
        fn test_nested_extraction_rejected() {
            let ext_dir = tempdir().unwrap();
            let cache_dir = tempdir().unwrap();
            let path = write_extension(ext_dir.path(), "ext", MANIFEST_A);
            let registry = Registry::new(cache_dir.path()).with_nested(true);

            assert!(matches!(
                registry.load(&path, false),
                Err(ExtensionError::Nested)
            ));
        }

        #[test]
        fn test_failing_extension_reports_stderr() {
            let ext_dir = tempdir().unwrap();
            let cache_dir = tempdir().unwrap();
            let path = ext_dir.path().join("bad.sh");
            fs::write(&path, "#!/bin/sh\necho 'broken' >&2\nexit 1\n").unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            let registry = Registry::new(cache_dir.path()).with_nested(false);

            match registry.load(&path, false) {
                Err(ExtensionError::ExecutionFailed { message, .. }) => {
                    assert_eq!(message, "broken")
                }
                other => panic!("unexpected result: {:?}", other),
            }
            assert!(!registry.cache_path("bad").exists());
        }

        #[test]
        fn test_invalid_manifest_not_cached() {
            let ext_dir = tempdir().unwrap();
            let cache_dir = tempdir().unwrap();
            let path = write_extension(ext_dir.path(), "ext", r#"{"commands": []}"#);
            let registry = Registry::new(cache_dir.path()).with_nested(false);

            assert!(matches!(
                registry.load(&path, false),
                Err(ExtensionError::SchemaInvalid(_))
            ));
            assert!(!registry.cache_path("ext").exists());
        }

        #[test]
        fn test_symlink_resolved_for_timestamps() {
            let ext_dir = tempdir().unwrap();
            let cache_dir = tempdir().unwrap();
            let target = write_extension(ext_dir.path(), "real", MANIFEST_A);
            let link = ext_dir.path().join("alias");
            std::os::unix::fs::symlink(&target, &link).unwrap();
            let registry = Registry::new(cache_dir.path()).with_nested(false);

            let extension = registry.load(&link, false).unwrap();
            assert_eq!(extension.name, "alias");
            assert_eq!(extension.entrypoint, fs::canonicalize(&target).unwrap());
        }

        #[test]
        fn test_scan_skips_broken_extensions() {
            let ext_dir = tempdir().unwrap();
            let cache_dir = tempdir().unwrap();
            write_extension(ext_dir.path(), "good", MANIFEST_A);
            write_extension(ext_dir.path(), "bad", "not json");
            let registry = Registry::new(cache_dir.path()).with_nested(false);

            let extensions = registry.scan(ext_dir.path(), false);
            assert_eq!(extensions.len(), 1);
            assert_eq!(extensions[0].name, "good");
        }
    }
}
