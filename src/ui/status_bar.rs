use std::sync::Arc;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::Theme;
use crate::config::{GlobalAction, KeyResolver};

const LOGO: &[&str] = &[
    r"  ___________  ",
    r" /__________/| ",
    r" |  stock   || ",
    r" |   desk   |/ ",
    r" ‾‾‾‾‾‾‾‾‾‾‾   ",
];

/// Rows the status bar needs, borders included.
pub const STATUS_BAR_HEIGHT: u16 = LOGO.len() as u16 + 2;

pub struct Keybinding {
    pub key: String,
    pub description: String,
}

impl Keybinding {
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
        }
    }
}

/// Bottom bar: where we are, who we are, and which keys do what.
pub struct StatusBar {
    api_url: String,
    resolver: Arc<KeyResolver>,
}

impl StatusBar {
    pub fn new(api_url: impl Into<String>, resolver: Arc<KeyResolver>) -> Self {
        Self {
            api_url: api_url.into(),
            resolver,
        }
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        screen: &str,
        signed_in: bool,
        local_keybindings: &[Keybinding],
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.surface1()));

        let inner_area = block.inner(area);
        frame.render_widget(block, area);

        let [status, keys, logo] = Layout::horizontal([
            Constraint::Length(42),
            Constraint::Min(20),
            Constraint::Length(16),
        ])
        .areas(inner_area);

        self.render_status_info(frame, status, theme, screen, signed_in);
        self.render_keybindings(frame, keys, theme, local_keybindings);
        Self::render_logo(frame, logo, theme);
    }

    fn render_status_info(
        &self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        screen: &str,
        signed_in: bool,
    ) {
        let w = area.width as usize;
        let label_style = Style::default().fg(theme.overlay1());
        let value_style = Style::default().fg(theme.text());
        let (session, session_style) = if signed_in {
            ("signed in", Style::default().fg(theme.green()))
        } else {
            ("signed out", Style::default().fg(theme.overlay0()))
        };

        let lines = vec![
            Line::from(Span::styled(
                truncate_str(screen, w),
                Style::default()
                    .fg(theme.lavender())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            status_line("api", &self.api_url, w, label_style, value_style),
            status_line("session", session, w, label_style, session_style),
        ];

        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_keybindings(
        &self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        local_keybindings: &[Keybinding],
    ) {
        let quit = Keybinding::new(self.resolver.display_global(GlobalAction::Quit), "Quit");
        let hints: Vec<&Keybinding> = local_keybindings.iter().chain([&quit]).collect();

        // Align the separators into one straight column.
        let max_key_w = hints.iter().map(|kb| kb.key.chars().count()).max().unwrap_or(1);
        let max_desc_w = hints
            .iter()
            .map(|kb| kb.description.chars().count())
            .max()
            .unwrap_or(1);
        let col_width = u16::try_from(max_key_w + 3 + max_desc_w + 2).unwrap_or(u16::MAX);
        let num_cols = (area.width / col_width).max(1) as usize;
        let num_rows = (area.height as usize).max(1);

        // Fill column by column
        let mut columns: Vec<Vec<Line>> = vec![Vec::new(); num_cols];
        for (i, kb) in hints.iter().enumerate() {
            let Some(column) = columns.get_mut(i / num_rows) else {
                break;
            };
            column.push(Line::from(vec![
                Span::styled(
                    format!("{:>max_key_w$}", kb.key),
                    Style::default().fg(theme.peach()),
                ),
                Span::styled(" │ ", Style::default().fg(theme.surface2())),
                Span::styled(kb.description.clone(), Style::default().fg(theme.subtext0())),
            ]));
        }

        let col_areas =
            Layout::horizontal(vec![Constraint::Length(col_width); num_cols]).split(area);
        for (lines, col_area) in columns.into_iter().zip(col_areas.iter()) {
            frame.render_widget(Paragraph::new(lines), *col_area);
        }
    }

    fn render_logo(frame: &mut Frame, area: Rect, theme: &Theme) {
        let style = Style::default()
            .fg(theme.mauve())
            .add_modifier(Modifier::BOLD);
        let logo_lines: Vec<Line> = LOGO
            .iter()
            .map(|line| Line::from(Span::styled(*line, style)))
            .collect();
        frame.render_widget(Paragraph::new(logo_lines), area);
    }
}

/// Render a labelled status line: right-aligned label, then value.
fn status_line<'a>(
    label: &'a str,
    value: &str,
    max_width: usize,
    label_style: Style,
    value_style: Style,
) -> Line<'a> {
    const LABEL_W: usize = 10;
    let available = max_width.saturating_sub(LABEL_W + 1);
    Line::from(vec![
        Span::styled(format!("{label:>LABEL_W$}"), label_style),
        Span::raw(" "),
        Span::styled(truncate_str(value, available), value_style),
    ])
}

/// Truncate to `max_width` characters, marking the cut with "...".
fn truncate_str(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width > 3 {
        let kept: String = s.chars().take(max_width - 3).collect();
        format!("{kept}...")
    } else {
        s.chars().take(max_width).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("http://localhost:4444", 40), "http://localhost:4444");
        assert_eq!(truncate_str("http://localhost:4444", 10), "http://...");
        assert_eq!(truncate_str("abcdef", 2), "ab");
        assert_eq!(truncate_str("Café crème", 7), "Café...");
    }
}
