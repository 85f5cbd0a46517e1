//! Detail view: scrollable text or markdown with actions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use super::actions::{find_shortcut, ActionPanel, PanelEvent};
use super::style::{markdown_lines, render_footer, render_header, Chrome, Theme};
use super::ViewEvent;
use crate::extensions::components::Content;
use crate::extensions::{Action, Detail};

pub struct DetailView {
    detail: Detail,
    scroll: u16,
    page: u16,
    panel: Option<ActionPanel>,
}

impl DetailView {
    pub fn new(detail: Detail) -> Self {
        Self {
            detail,
            scroll: 0,
            page: 1,
            panel: None,
        }
    }

    /// Replace the content, keeping the scroll position.
    pub fn set_detail(&mut self, detail: Detail) {
        self.detail = detail;
    }

    pub fn set_height(&mut self, height: u16) {
        self.page = height.saturating_sub(super::style::CHROME_ROWS).max(1);
    }

    pub fn primary_action(&self) -> Option<&Action> {
        self.detail.actions.first()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ViewEvent {
        if let Some(panel) = self.panel.as_mut() {
            return match panel.handle_key(key) {
                PanelEvent::None => ViewEvent::None,
                PanelEvent::Close => {
                    self.panel = None;
                    ViewEvent::None
                }
                PanelEvent::Select(action) => {
                    self.panel = None;
                    ViewEvent::Action(action)
                }
            };
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => ViewEvent::Back,
            KeyCode::Enter => match self.primary_action() {
                Some(action) => ViewEvent::Action(action.clone()),
                None => ViewEvent::None,
            },
            KeyCode::Tab => {
                if !self.detail.actions.is_empty() {
                    self.panel = Some(ActionPanel::new(self.detail.actions.clone()));
                }
                ViewEvent::None
            }
            KeyCode::Up | KeyCode::Char('k') => self.scroll_by(-1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_by(1),
            KeyCode::PageUp => self.scroll_by(-(self.page as i32)),
            KeyCode::PageDown => self.scroll_by(self.page as i32),
            KeyCode::Char('u') if ctrl => self.scroll_by(-(self.page as i32)),
            KeyCode::Char('d') if ctrl => self.scroll_by(self.page as i32),
            KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::ALT) => {
                match find_shortcut(&self.detail.actions, c) {
                    Some(action) => ViewEvent::Action(action.clone()),
                    None => ViewEvent::None,
                }
            }
            _ => ViewEvent::None,
        }
    }

    fn scroll_by(&mut self, delta: i32) -> ViewEvent {
        let max = self.line_count().saturating_sub(1) as i32;
        self.scroll = (self.scroll as i32 + delta).clamp(0, max.max(0)) as u16;
        ViewEvent::None
    }

    fn line_count(&self) -> usize {
        match self.detail.content() {
            Content::Text(text) | Content::Markdown(text) => text.lines().count(),
        }
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        title: &str,
        loading: bool,
    ) {
        let chrome = Chrome::split(area);
        render_header(frame, chrome.header, theme, title, loading);
        self.page = chrome.body.height.max(1);

        let lines: Vec<Line> = match self.detail.content() {
            Content::Markdown(md) => markdown_lines(md, theme),
            Content::Text(text) => text.lines().map(Line::raw).collect(),
        };
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .scroll((self.scroll, 0)),
            Rect {
                y: chrome.input.y,
                height: chrome.body.height + 2,
                ..chrome.body
            },
        );

        render_footer(
            frame,
            chrome.footer,
            theme,
            self.primary_action().map(|a| a.display_title()),
            "↑↓ scroll · tab actions · esc back",
        );

        if let Some(panel) = &self.panel {
            panel.render(frame, area, theme);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::components::Markup;

    fn detail(lines: usize) -> DetailView {
        let text = (0..lines).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n");
        DetailView::new(Detail {
            markup: Markup {
                text: Some(text),
                markdown: None,
            },
            actions: vec![Action::run("next")],
        })
    }

    #[test]
    fn test_scroll_clamped() {
        let mut view = detail(3);
        view.handle_key(KeyEvent::new(KeyCode::Up, KeyModifiers::NONE));
        assert_eq!(view.scroll(), 0);
        for _ in 0..10 {
            view.handle_key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE));
        }
        assert_eq!(view.scroll(), 2);
    }

    #[test]
    fn test_enter_and_escape() {
        let mut view = detail(1);
        assert_eq!(
            view.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
            ViewEvent::Action(Action::run("next"))
        );
        assert_eq!(
            view.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)),
            ViewEvent::Back
        );
    }
}
