//! Protocol documents exchanged with extensions.
//!
//! Commands print one of these documents on stdout. Every document is
//! validated against the embedded schema (see [`super::schema`]) before it is
//! decoded into these types.
//!
//! - **List** - items filtered by the launcher or by the command itself
//! - **Detail** - text or markdown content
//! - **Action** - an instruction to run, open, copy, reload or exit

mod action;
mod common;
mod detail;
mod list;

pub use action::{Action, ActionKind, ACTION_TYPES};
pub use common::{Content, Markup, ParamValue, Params};
pub use detail::Detail;
pub use list::{List, ListItem};
