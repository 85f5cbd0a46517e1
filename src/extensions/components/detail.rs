//! Detail document definitions.

use serde::{Deserialize, Serialize};

use super::action::Action;
use super::common::{Content, Markup};

/// Output of a `detail` command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detail {
    #[serde(flatten)]
    pub markup: Markup,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

impl Detail {
    pub fn content(&self) -> Content<'_> {
        self.markup.content()
    }
}
