use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::Theme;
use crate::ui::{Component, Spinner};
use crate::viewmodel::StatusMessage;

/// One-line status slot: the latest outcome, plus a spinner while requests
/// are in flight.
pub struct MessageLine {
    spinner: Spinner,
}

impl Default for MessageLine {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageLine {
    pub fn new() -> Self {
        let mut spinner = Spinner::new();
        spinner.set_label("Working...");
        Self { spinner }
    }

    pub fn handle_tick(&mut self, busy: bool) {
        if busy {
            self.spinner.handle_tick();
        }
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        message: Option<&StatusMessage>,
        busy: bool,
    ) {
        let [message_area, spinner_area] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(14)]).areas(area);

        if let Some(message) = message {
            let (marker, color) = if message.is_error() {
                ("✗ ", theme.error())
            } else {
                ("✓ ", theme.success())
            };
            let line = Line::from(vec![
                Span::styled(marker, Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::styled(message.text(), Style::default().fg(color)),
            ]);
            frame.render_widget(Paragraph::new(line), message_area);
        }

        if busy {
            self.spinner.render(frame, spinner_area, theme);
        }
    }
}
