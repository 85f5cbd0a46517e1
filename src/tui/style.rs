//! Colors and shared chrome.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::config::{parse_hex_color, Config};

/// Rows taken by header and footer around a page body.
pub const CHROME_ROWS: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub accent: Color,
}

impl Theme {
    pub fn from_config(config: &Config) -> Self {
        let accent = parse_hex_color(&config.appearance.accent_color)
            .map(|(r, g, b)| Color::Rgb(r, g, b))
            .unwrap_or(Color::Magenta);
        Self { accent }
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn dim(&self) -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Magenta,
        }
    }
}

/// Page layout: header line, input line, body, footer line.
pub struct Chrome {
    pub header: Rect,
    pub input: Rect,
    pub body: Rect,
    pub footer: Rect,
}

impl Chrome {
    pub fn split(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);
        Self {
            header: rows[0],
            input: rows[1],
            body: rows[3],
            footer: rows[4],
        }
    }
}

/// Draw the page title with an optional loading marker.
pub fn render_header(frame: &mut Frame, area: Rect, theme: &Theme, title: &str, loading: bool) {
    let mut spans = vec![Span::styled(title.to_string(), theme.title())];
    if loading {
        spans.push(Span::styled("  loading...", theme.dim()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draw the footer: primary action on the left, key hints on the right.
pub fn render_footer(
    frame: &mut Frame,
    area: Rect,
    theme: &Theme,
    primary: Option<&str>,
    hints: &str,
) {
    let mut spans = Vec::new();
    if let Some(primary) = primary {
        spans.push(Span::styled(
            primary.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(" ⏎", theme.dim()));
        spans.push(Span::raw("   "));
    }
    spans.push(Span::styled(hints.to_string(), theme.dim()));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Lightweight markdown styling: headings, fenced code, bullets.
pub fn markdown_lines<'a>(source: &'a str, theme: &Theme) -> Vec<Line<'a>> {
    let mut in_code = false;
    let mut lines = Vec::new();
    for raw in source.lines() {
        if raw.trim_start().starts_with("```") {
            in_code = !in_code;
            continue;
        }
        if in_code {
            lines.push(Line::styled(raw, theme.dim()));
        } else if let Some(heading) = raw.strip_prefix('#') {
            lines.push(Line::styled(
                heading.trim_start_matches('#').trim_start(),
                theme.title(),
            ));
        } else if let Some(item) = raw.strip_prefix("- ").or_else(|| raw.strip_prefix("* ")) {
            lines.push(Line::from(vec![Span::raw("• "), Span::raw(item)]));
        } else {
            lines.push(Line::raw(raw));
        }
    }
    lines
}
