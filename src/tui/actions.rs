//! Action panel overlay, opened with Tab from lists and details.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::style::Theme;
use crate::extensions::Action;

/// Result of a key press inside the panel.
#[derive(Debug, PartialEq)]
pub enum PanelEvent {
    None,
    Close,
    Select(Action),
}

pub struct ActionPanel {
    actions: Vec<Action>,
    cursor: usize,
}

impl ActionPanel {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions, cursor: 0 }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PanelEvent {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc | KeyCode::Tab => PanelEvent::Close,
            KeyCode::Up => self.move_by(-1),
            KeyCode::Char('k') | KeyCode::Char('p') if ctrl => self.move_by(-1),
            KeyCode::Down => self.move_by(1),
            KeyCode::Char('j') | KeyCode::Char('n') if ctrl => self.move_by(1),
            KeyCode::Enter => match self.actions.get(self.cursor) {
                Some(action) => PanelEvent::Select(action.clone()),
                None => PanelEvent::Close,
            },
            KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::ALT) => {
                match find_shortcut(&self.actions, c) {
                    Some(action) => PanelEvent::Select(action.clone()),
                    None => PanelEvent::None,
                }
            }
            _ => PanelEvent::None,
        }
    }

    fn move_by(&mut self, delta: isize) -> PanelEvent {
        if !self.actions.is_empty() {
            let len = self.actions.len() as isize;
            self.cursor = (self.cursor as isize + delta).rem_euclid(len) as usize;
        }
        PanelEvent::None
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let width = self
            .actions
            .iter()
            .map(|a| a.display_title().chars().count() + 10)
            .max()
            .unwrap_or(10)
            .clamp(20, area.width.max(20) as usize) as u16;
        let height = (self.actions.len() as u16 + 2).min(area.height);
        let popup = Rect {
            x: area.x + area.width.saturating_sub(width) / 2,
            y: area.y + area.height.saturating_sub(height) / 2,
            width: width.min(area.width),
            height,
        };

        let lines: Vec<Line> = self
            .actions
            .iter()
            .enumerate()
            .map(|(i, action)| {
                let style = if i == self.cursor {
                    theme.selected()
                } else {
                    Default::default()
                };
                let mut spans = vec![Span::styled(action.display_title().to_string(), style)];
                if let Some(key) = action.shortcut() {
                    spans.push(Span::styled(format!("  alt+{}", key), theme.dim()));
                }
                Line::from(spans)
            })
            .collect();

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Actions")),
            popup,
        );
    }
}

/// First action bound to `key`.
pub fn find_shortcut(actions: &[Action], key: char) -> Option<&Action> {
    actions.iter().find(|a| a.shortcut() == Some(key))
}
