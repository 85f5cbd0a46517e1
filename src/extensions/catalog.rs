//! In-memory set of loaded extensions.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::components::Action;
use super::error::{ExtensionError, ExtensionResult};
use super::manifest::Extension;

/// Loaded extensions keyed by name.
///
/// Each entry stays immutable; a reload replaces it wholesale.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    extensions: BTreeMap<String, Arc<Extension>>,
}

/// A root action together with the extension that declares it.
#[derive(Debug, Clone, PartialEq)]
pub struct RootEntry {
    /// `<extension>:<index>`, stable across runs while the manifest is unchanged
    pub id: String,
    pub extension: String,
    pub extension_title: String,
    pub action: Action,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, extension: Extension) -> Arc<Extension> {
        let extension = Arc::new(extension);
        self.extensions
            .insert(extension.name.clone(), Arc::clone(&extension));
        extension
    }

    pub fn get(&self, name: &str) -> ExtensionResult<Arc<Extension>> {
        self.extensions
            .get(name)
            .cloned()
            .ok_or_else(|| ExtensionError::ExtensionNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.extensions.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Extension>> {
        self.extensions.values()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Root actions of every extension, or only of `only` when given.
    pub fn root_entries(&self, only: Option<&str>) -> Vec<RootEntry> {
        self.extensions
            .values()
            .filter(|ext| only.map_or(true, |name| ext.name == name))
            .flat_map(|ext| {
                ext.root_actions()
                    .into_iter()
                    .enumerate()
                    .map(move |(index, action)| RootEntry {
                        id: format!("{}:{}", ext.name, index),
                        extension: ext.name.clone(),
                        extension_title: ext.title().to_string(),
                        action,
                    })
            })
            .collect()
    }
}

impl FromIterator<Extension> for Catalog {
    fn from_iter<I: IntoIterator<Item = Extension>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for extension in iter {
            catalog.insert(extension);
        }
        catalog
    }
}
