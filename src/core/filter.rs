//! Incremental fuzzy filter.
//!
//! Holds the full item set in insertion order, the query, the ranked subset
//! (as indices into the item set), a cursor into that subset, and the first
//! visible row of the viewport.
//!
//! The viewport start moves incrementally with the cursor instead of being
//! recomputed from scratch on every move.

use std::cmp::Ordering;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// Something that can be matched against a query.
pub trait FilterItem {
    /// Stable identity used to keep the selection across updates.
    fn id(&self) -> &str;

    /// Text the query is matched against.
    fn filter_value(&self) -> String;
}

/// Custom ordering applied to scored matches.
pub type OrderFn<T> = Box<dyn Fn(&T, &T) -> Ordering>;

pub struct Filter<T> {
    items: Vec<T>,
    query: String,
    matches: Vec<usize>,
    cursor: usize,
    min_index: usize,
    height: usize,
    order: Option<OrderFn<T>>,
    matcher: SkimMatcherV2,
}

impl<T: FilterItem> Filter<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            query: String::new(),
            matches: Vec::new(),
            cursor: 0,
            min_index: 0,
            height: 1,
            order: None,
            matcher: SkimMatcherV2::default().ignore_case(),
        }
    }

    /// Order positively-scored matches with `order` instead of by score.
    /// Equal elements fall back to score, then insertion order.
    pub fn with_order(mut self, order: OrderFn<T>) -> Self {
        self.order = Some(order);
        self.apply();
        self
    }

    /// Replace the item set, keeping the query and the selected item when it
    /// is still present.
    pub fn set_items(&mut self, items: Vec<T>) {
        let selected = self.selection().map(|item| item.id().to_string());
        self.items = items;
        self.apply();

        if let Some(id) = selected {
            if !self.select(&id) {
                self.clamp();
            }
        } else {
            self.clamp();
        }
    }

    /// Update the query. A changed query resets the cursor to the top.
    pub fn set_query(&mut self, query: &str) {
        if self.query == query {
            return;
        }
        self.query = query.to_string();
        self.apply();
        self.reset_cursor();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Move the cursor and window back to the top.
    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
        self.min_index = 0;
    }

    /// Number of rows that fit in the viewport.
    pub fn set_height(&mut self, height: usize) {
        self.height = height.max(1);
        self.clamp();
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of items matching the current query.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn min_index(&self) -> usize {
        self.min_index
    }

    /// Matching items in ranked order.
    pub fn matches(&self) -> impl Iterator<Item = &T> + '_ {
        self.matches.iter().map(move |&i| &self.items[i])
    }

    pub fn selection(&self) -> Option<&T> {
        self.matches.get(self.cursor).map(|&i| &self.items[i])
    }

    /// Move the cursor to the item with `id`. Returns false if it does not
    /// match the current query.
    pub fn select(&mut self, id: &str) -> bool {
        let Some(position) = self
            .matches
            .iter()
            .position(|&i| self.items[i].id() == id)
        else {
            return false;
        };
        self.cursor = position;
        self.clamp();
        true
    }

    /// The slice of matches shown in the viewport, with their positions in
    /// the ranked subset.
    pub fn visible(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        let end = (self.min_index + self.height).min(self.matches.len());
        let start = self.min_index.min(end);
        (start..end).map(move |pos| (pos, &self.items[self.matches[pos]]))
    }

    pub fn cursor_down(&mut self) {
        if self.matches.is_empty() {
            return;
        }
        if self.cursor + 1 >= self.matches.len() {
            self.cursor = 0;
            self.min_index = 0;
            return;
        }
        self.cursor += 1;
        if self.cursor >= self.min_index + self.height {
            self.min_index += 1;
        }
    }

    pub fn cursor_up(&mut self) {
        if self.matches.is_empty() {
            return;
        }
        if self.cursor == 0 {
            self.cursor = self.matches.len() - 1;
            self.min_index = self.matches.len().saturating_sub(self.height);
            return;
        }
        self.cursor -= 1;
        if self.cursor < self.min_index {
            self.min_index = self.cursor;
        }
    }

    pub fn page_down(&mut self) {
        if self.matches.is_empty() {
            return;
        }
        self.cursor = (self.cursor + self.height).min(self.matches.len() - 1);
        if self.cursor >= self.min_index + self.height {
            self.min_index = self.cursor + 1 - self.height;
        }
    }

    pub fn page_up(&mut self) {
        if self.matches.is_empty() {
            return;
        }
        self.cursor = self.cursor.saturating_sub(self.height);
        if self.cursor < self.min_index {
            self.min_index = self.cursor;
        }
    }

    /// Recompute the ranked subset for the current query.
    fn apply(&mut self) {
        if self.query.is_empty() {
            self.matches = (0..self.items.len()).collect();
            return;
        }

        let mut scored: Vec<(usize, i64)> = self
            .items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                self.matcher
                    .fuzzy_match(&item.filter_value(), &self.query)
                    .filter(|&score| score > 0)
                    .map(|score| (i, score))
            })
            .collect();

        match &self.order {
            Some(order) => scored.sort_by(|a, b| {
                order(&self.items[a.0], &self.items[b.0]).then_with(|| b.1.cmp(&a.1))
            }),
            None => scored.sort_by(|a, b| b.1.cmp(&a.1)),
        }

        self.matches = scored.into_iter().map(|(i, _)| i).collect();
    }

    /// Bring cursor and viewport back into range.
    fn clamp(&mut self) {
        if self.matches.is_empty() {
            self.cursor = 0;
            self.min_index = 0;
            return;
        }
        self.cursor = self.cursor.min(self.matches.len() - 1);
        if self.cursor < self.min_index {
            self.min_index = self.cursor;
        } else if self.cursor >= self.min_index + self.height {
            self.min_index = self.cursor + 1 - self.height;
        }
        let max_start = self.matches.len().saturating_sub(self.height);
        self.min_index = self.min_index.min(max_start).min(self.cursor);
    }
}

impl<T: FilterItem> Default for Filter<T> {
    fn default() -> Self {
        Self::new()
    }
}
