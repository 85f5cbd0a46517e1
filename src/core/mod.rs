//! Core engine module - UI-agnostic logic.
//!
//! - Fuzzy filtering and cursor/viewport bookkeeping for lists

pub mod filter;

pub use filter::{Filter, FilterItem, OrderFn};
