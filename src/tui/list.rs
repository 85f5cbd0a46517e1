//! List view: query input, filtered items, optional detail pane.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use super::actions::{find_shortcut, ActionPanel, PanelEvent};
use super::style::{markdown_lines, render_footer, render_header, Chrome, Theme};
use super::ViewEvent;
use crate::core::{Filter, OrderFn};
use crate::extensions::components::Content;
use crate::extensions::{Action, List, ListItem};

pub struct ListView {
    filter: Filter<ListItem>,
    input: String,
    actions: Vec<Action>,
    empty_text: Option<String>,
    show_detail: bool,
    dynamic: bool,
    panel: Option<ActionPanel>,
}

impl ListView {
    pub fn new(list: List) -> Self {
        let mut view = Self {
            filter: Filter::new(),
            input: String::new(),
            actions: Vec::new(),
            empty_text: None,
            show_detail: false,
            dynamic: false,
            panel: None,
        };
        view.set_list(list);
        view
    }

    /// Rank matches with a custom ordering instead of by score.
    pub fn with_order(mut self, order: OrderFn<ListItem>) -> Self {
        self.filter = self.filter.with_order(order);
        self
    }

    /// The command filters itself: queries are not applied locally.
    pub fn set_dynamic(&mut self, dynamic: bool) {
        self.dynamic = dynamic;
        let query = if dynamic { "" } else { self.input.as_str() };
        self.filter.set_query(query);
    }

    /// Update in place, keeping the query and selection.
    pub fn set_list(&mut self, list: List) {
        self.actions = list.actions;
        self.empty_text = list.empty_text;
        self.show_detail = list.show_detail;
        self.filter.set_items(list.items);
        if list.dynamic != self.dynamic {
            self.set_dynamic(list.dynamic);
        }
    }

    pub fn query(&self) -> &str {
        &self.input
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn filter(&self) -> &Filter<ListItem> {
        &self.filter
    }

    pub fn selection(&self) -> Option<&ListItem> {
        self.filter.selection()
    }

    pub fn set_height(&mut self, height: u16) {
        let rows = height.saturating_sub(super::style::CHROME_ROWS).max(1);
        self.filter.set_height(rows as usize);
    }

    /// Actions of the selection followed by list-level actions.
    fn available_actions(&self) -> Vec<Action> {
        let mut actions: Vec<Action> = self
            .selection()
            .map(|item| item.actions.clone())
            .unwrap_or_default();
        actions.extend(self.actions.iter().cloned());
        actions
    }

    pub fn primary_action(&self) -> Option<Action> {
        self.available_actions().into_iter().next()
    }

    fn set_input(&mut self, input: String) -> ViewEvent {
        self.input = input;
        if self.dynamic {
            self.filter.reset_cursor();
        } else {
            self.filter.set_query(&self.input);
        }
        ViewEvent::QueryChanged(self.input.clone())
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
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        match key.code {
            KeyCode::Esc if !self.input.is_empty() => self.set_input(String::new()),
            KeyCode::Esc => ViewEvent::Back,
            KeyCode::Enter => match self.primary_action() {
                Some(action) => ViewEvent::Action(action),
                None => ViewEvent::None,
            },
            KeyCode::Tab => {
                let actions = self.available_actions();
                if !actions.is_empty() {
                    self.panel = Some(ActionPanel::new(actions));
                }
                ViewEvent::None
            }
            KeyCode::Up => self.moved(Filter::cursor_up),
            KeyCode::Down => self.moved(Filter::cursor_down),
            KeyCode::PageUp => self.moved(Filter::page_up),
            KeyCode::PageDown => self.moved(Filter::page_down),
            KeyCode::Char('k') | KeyCode::Char('p') if ctrl => self.moved(Filter::cursor_up),
            KeyCode::Char('j') | KeyCode::Char('n') if ctrl => self.moved(Filter::cursor_down),
            KeyCode::Char('u') if ctrl => self.moved(Filter::page_up),
            KeyCode::Char('d') if ctrl => self.moved(Filter::page_down),
            KeyCode::Char(c) if alt => match find_shortcut(&self.available_actions(), c) {
                Some(action) => ViewEvent::Action(action.clone()),
                None => ViewEvent::None,
            },
            KeyCode::Char(c) if !ctrl => {
                let mut input = self.input.clone();
                input.push(c);
                self.set_input(input)
            }
            KeyCode::Backspace if !self.input.is_empty() => {
                let mut input = self.input.clone();
                input.pop();
                self.set_input(input)
            }
            _ => ViewEvent::None,
        }
    }

    fn moved(&mut self, step: fn(&mut Filter<ListItem>)) -> ViewEvent {
        step(&mut self.filter);
        ViewEvent::None
    }

    fn empty_message(&self) -> &str {
        if let Some(text) = self.empty_text.as_deref() {
            return text;
        }
        if self.filter.items().is_empty() {
            "No Items"
        } else {
            "No matches"
        }
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

        let input = Line::from(vec![
            Span::styled("> ", theme.title()),
            Span::raw(self.input.clone()),
            Span::styled("█", theme.dim()),
        ]);
        frame.render_widget(Paragraph::new(input), chrome.input);

        let (list_area, detail_area) = if self.show_detail {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
                .split(chrome.body);
            (columns[0], Some(columns[1]))
        } else {
            (chrome.body, None)
        };

        self.filter.set_height(list_area.height.max(1) as usize);
        if self.filter.is_empty() {
            frame.render_widget(
                Paragraph::new(self.empty_message().to_string())
                    .style(theme.dim())
                    .alignment(Alignment::Center),
                list_area,
            );
        } else {
            let cursor = self.filter.cursor();
            let width = list_area.width as usize;
            let rows: Vec<Line> = self
                .filter
                .visible()
                .map(|(pos, item)| item_line(item, pos == cursor, width, theme))
                .collect();
            frame.render_widget(Paragraph::new(rows), list_area);
        }

        if let Some(detail_area) = detail_area {
            let lines = match self.selection().and_then(|item| item.detail.as_ref()) {
                Some(markup) => match markup.content() {
                    Content::Markdown(md) => markdown_lines(md, theme),
                    Content::Text(text) => text.lines().map(Line::raw).collect(),
                },
                None => Vec::new(),
            };
            frame.render_widget(
                Paragraph::new(lines)
                    .wrap(Wrap { trim: false })
                    .block(Block::default().borders(Borders::LEFT)),
                detail_area,
            );
        }

        let primary = self.primary_action();
        render_footer(
            frame,
            chrome.footer,
            theme,
            primary.as_ref().map(|a| a.display_title()),
            "tab actions · esc back",
        );

        if let Some(panel) = &self.panel {
            panel.render(frame, area, theme);
        }
    }
}

fn item_line<'a>(item: &'a ListItem, selected: bool, width: usize, theme: &Theme) -> Line<'a> {
    let marker = if selected { "▸ " } else { "  " };
    let title_style = if selected {
        theme.selected()
    } else {
        Style::default()
    };

    let mut spans = vec![
        Span::styled(marker, theme.title()),
        Span::styled(item.title.as_str(), title_style),
    ];
    let mut used = 2 + item.title.chars().count();

    if let Some(subtitle) = &item.subtitle {
        spans.push(Span::styled(format!("  {}", subtitle), theme.dim()));
        used += 2 + subtitle.chars().count();
    }

    if !item.accessories.is_empty() {
        let accessories = item.accessories.join("  ");
        let len = accessories.chars().count();
        if used + len + 2 <= width {
            spans.push(Span::raw(" ".repeat(width - used - len)));
            spans.push(Span::styled(
                accessories,
                theme.dim().add_modifier(Modifier::ITALIC),
            ));
        }
    }

    Line::from(spans)
}
