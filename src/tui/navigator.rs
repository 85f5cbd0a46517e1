//! Page stack.
//!
//! The navigator routes messages to the top page and carries out the stack
//! effects (`Push`, `Pop`, `Replace`, `Send`) itself. Everything else is handed back to
//! the event loop.

use std::collections::VecDeque;

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::Frame;

use super::page::{Effect, Msg, Page};

pub struct Navigator {
    pages: Vec<Box<dyn Page>>,
    width: u16,
    height: u16,
}

impl Navigator {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            pages: Vec::new(),
            width,
            height,
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Size the page to the viewport, blur the current top and initialize
    /// the new one.
    pub fn push(&mut self, mut page: Box<dyn Page>) -> Vec<Effect> {
        let mut effects = match self.pages.last_mut() {
            Some(top) => top.blur(),
            None => Vec::new(),
        };
        page.set_size(self.width, self.height);
        effects.extend(page.init());
        self.pages.push(page);
        effects
    }

    /// Remove the top page. Popping the last page exits instead.
    pub fn pop(&mut self) -> Vec<Effect> {
        if self.pages.len() <= 1 {
            return vec![Effect::Exit];
        }
        let mut effects = match self.pages.pop() {
            Some(mut page) => page.dispose(),
            None => Vec::new(),
        };
        if let Some(top) = self.pages.last_mut() {
            effects.extend(top.focus());
        }
        effects
    }

    /// Dispose the top page and put `page` in its place. The stack never
    /// shrinks, so replacing the root is allowed.
    pub fn replace(&mut self, mut page: Box<dyn Page>) -> Vec<Effect> {
        let mut effects = match self.pages.pop() {
            Some(mut top) => top.dispose(),
            None => Vec::new(),
        };
        page.set_size(self.width, self.height);
        effects.extend(page.init());
        self.pages.push(page);
        effects
    }

    /// Deliver a message. Resizes go to every page, the rest to the top.
    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::Resize { width, height } => {
                self.width = width;
                self.height = height;
                for page in &mut self.pages {
                    page.set_size(width, height);
                }
                Vec::new()
            }
            Msg::Key(key)
                if key.code == KeyCode::Char('c')
                    && key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                vec![Effect::Exit]
            }
            msg => match self.pages.last_mut() {
                Some(top) => top.update(msg),
                None => Vec::new(),
            },
        }
    }

    /// Apply stack effects, depth first, and return the rest in order.
    pub fn process(&mut self, effects: Vec<Effect>) -> Vec<Effect> {
        let mut queue: VecDeque<Effect> = effects.into();
        let mut rest = Vec::new();

        while let Some(effect) = queue.pop_front() {
            let produced = match effect {
                Effect::Push(page) => self.push(page),
                Effect::Pop => self.pop(),
                Effect::Replace(page) => self.replace(page),
                Effect::Send(msg) => self.update(msg),
                other => {
                    rest.push(other);
                    continue;
                }
            };
            for effect in produced.into_iter().rev() {
                queue.push_front(effect);
            }
        }

        rest
    }

    /// Draw the top page into the navigator's share of the frame.
    pub fn render(&mut self, frame: &mut Frame) {
        let full = frame.area();
        let area = Rect {
            width: self.width.min(full.width),
            height: self.height.min(full.height),
            ..full
        };
        if let Some(top) = self.pages.last_mut() {
            top.render(frame, area);
        }
    }
}
