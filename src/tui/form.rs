//! Form collecting the required params a run action is missing.
//!
//! On submit the form pops itself and re-delivers the action, with the
//! collected values merged into its params, to the page below.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::page::{Effect, Msg, Page};
use super::style::{render_footer, render_header, Chrome, Theme};
use crate::extensions::{Action, ActionKind, ParamKind, ParamSpec, ParamValue};

enum Value {
    Text(String),
    Bool(bool),
}

struct Field {
    spec: ParamSpec,
    value: Value,
}

pub struct Form {
    title: String,
    action: Action,
    fields: Vec<Field>,
    focus: usize,
    error: Option<String>,
    theme: Theme,
}

impl Form {
    pub fn new(
        title: impl Into<String>,
        action: Action,
        missing: Vec<ParamSpec>,
        theme: Theme,
    ) -> Self {
        let fields = missing
            .into_iter()
            .map(|spec| {
                let value = match spec.kind {
                    ParamKind::Boolean => Value::Bool(false),
                    ParamKind::String | ParamKind::Number => Value::Text(String::new()),
                };
                Field { spec, value }
            })
            .collect();

        Self {
            title: title.into(),
            action,
            fields,
            focus: 0,
            error: None,
            theme,
        }
    }

    fn focused(&mut self) -> Option<&mut Field> {
        self.fields.get_mut(self.focus)
    }

    fn move_focus(&mut self, delta: isize) {
        if self.fields.is_empty() {
            return;
        }
        let len = self.fields.len() as isize;
        self.focus = (self.focus as isize + delta).rem_euclid(len) as usize;
    }

    /// Validate the fields and build the merged action.
    fn collect(&self) -> Result<Action, String> {
        let mut action = self.action.clone();
        let ActionKind::Run { params, .. } = &mut action.kind else {
            return Ok(action);
        };

        for field in &self.fields {
            let spec = &field.spec;
            let value = match (&field.value, spec.kind) {
                (Value::Bool(b), _) => ParamValue::Bool(*b),
                (Value::Text(text), ParamKind::Number) => {
                    let number = text
                        .trim()
                        .parse::<serde_json::Number>()
                        .map_err(|_| format!("{} must be a number", spec.display_title()))?;
                    ParamValue::Number(number)
                }
                (Value::Text(text), _) => {
                    if text.is_empty() {
                        return Err(format!("{} is required", spec.display_title()));
                    }
                    ParamValue::String(text.clone())
                }
            };
            params.insert(spec.name.clone(), value);
        }

        Ok(action)
    }

    fn submit(&mut self) -> Vec<Effect> {
        match self.collect() {
            Ok(action) => vec![Effect::Pop, Effect::Send(Msg::Action(action))],
            Err(message) => {
                self.error = Some(message);
                Vec::new()
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return vec![Effect::Pop],
            KeyCode::Char('s') if ctrl => return self.submit(),
            KeyCode::Enter => {
                if self.focus + 1 >= self.fields.len() {
                    return self.submit();
                }
                self.move_focus(1);
            }
            KeyCode::Tab | KeyCode::Down => self.move_focus(1),
            KeyCode::BackTab | KeyCode::Up => self.move_focus(-1),
            KeyCode::Char(c) if !ctrl => {
                if let Some(field) = self.focused() {
                    match &mut field.value {
                        Value::Bool(b) if c == ' ' => *b = !*b,
                        Value::Bool(_) => {}
                        Value::Text(text) => text.push(c),
                    }
                }
            }
            KeyCode::Backspace => {
                if let Some(Field {
                    value: Value::Text(text),
                    ..
                }) = self.focused()
                {
                    text.pop();
                }
            }
            _ => {}
        }
        Vec::new()
    }
}

impl Page for Form {
    fn set_size(&mut self, _width: u16, _height: u16) {}

    fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::Key(key) => self.handle_key(key),
            Msg::Error(message) => {
                self.error = Some(message);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let theme = self.theme;
        let chrome = Chrome::split(area);
        render_header(frame, chrome.header, &theme, &self.title, false);

        let mut y = chrome.input.y;
        let bottom = chrome.footer.y;
        for (i, field) in self.fields.iter().enumerate() {
            if y + 3 > bottom {
                break;
            }
            let focused = i == self.focus;
            let border = if focused { theme.selected() } else { theme.dim() };
            let content = match &field.value {
                Value::Text(text) if focused => Line::from(vec![
                    Span::raw(text.clone()),
                    Span::styled("█", theme.dim()),
                ]),
                Value::Text(text) => Line::raw(text.clone()),
                Value::Bool(b) => Line::raw(if *b { "[x]" } else { "[ ]" }),
            };
            let mut block = Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(field.spec.display_title().to_string());
            if let Some(description) = &field.spec.description {
                block = block.title_bottom(Line::styled(description.clone(), theme.dim()));
            }
            frame.render_widget(
                Paragraph::new(content).block(block),
                Rect {
                    y,
                    height: 3,
                    ..chrome.body
                },
            );
            y += 3;
        }

        if let Some(error) = &self.error {
            if y < bottom {
                frame.render_widget(
                    Paragraph::new(Line::styled(error.clone(), theme.error())),
                    Rect {
                        y,
                        height: 1,
                        ..chrome.body
                    },
                );
            }
        }

        render_footer(
            frame,
            chrome.footer,
            &theme,
            Some("Submit"),
            "tab next · space toggle · esc cancel",
        );
    }
}
