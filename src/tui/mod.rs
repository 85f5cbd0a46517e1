//! Terminal UI.
//!
//! - [`navigator`] - Page stack and message routing
//! - [`runner`] - Controller of one command view
//! - [`dispatch`] - Pure action dispatch
//! - [`list`], [`detail`], [`form`] - Views
//! - [`app`] - Terminal setup and the event loop

pub mod actions;
pub mod app;
pub mod detail;
pub mod dispatch;
pub mod form;
pub mod list;
pub mod navigator;
pub mod page;
pub mod runner;
pub mod style;

use crate::extensions::Action;

pub use app::App;
pub use navigator::Navigator;
pub use page::{Context, Effect, Msg, Page};
pub use runner::Runner;
pub use style::Theme;

/// What a list or detail view asks its runner to do after a key press.
#[derive(Debug, PartialEq)]
pub enum ViewEvent {
    None,
    Action(Action),
    QueryChanged(String),
    Back,
}
