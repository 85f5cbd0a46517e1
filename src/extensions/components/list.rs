//! List document definitions.

use serde::{Deserialize, Serialize};

use super::action::Action;
use super::common::Markup;
use crate::core::filter::FilterItem;

/// Output of a `filter` or `search` command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    #[serde(default)]
    pub items: Vec<ListItem>,

    /// Actions available regardless of the selection
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,

    /// Shown instead of the default empty-state text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_text: Option<String>,

    /// The command filters on its own; queries re-invoke it
    #[serde(default)]
    pub dynamic: bool,

    /// Show the selected item's detail next to the list
    #[serde(default)]
    pub show_detail: bool,

    /// Reload automatically after this many seconds (0 disables)
    #[serde(default)]
    pub auto_refresh_seconds: u64,
}

/// A single item in a list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    /// Stable identity; falls back to the title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accessories: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Markup>,
}

impl ListItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.title)
    }

    /// Text the fuzzy filter matches against.
    pub fn filter_value(&self) -> String {
        let mut value = self.title.clone();
        if let Some(subtitle) = &self.subtitle {
            value.push(' ');
            value.push_str(subtitle);
        }
        for accessory in &self.accessories {
            value.push(' ');
            value.push_str(accessory);
        }
        value
    }
}

impl FilterItem for ListItem {
    fn id(&self) -> &str {
        ListItem::id(self)
    }

    fn filter_value(&self) -> String {
        ListItem::filter_value(self)
    }
}
