//! Process-scoped stores.

pub mod history;

pub use history::History;
