use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders};

use crate::Theme;
use crate::config::{FormAction, KeyResolver};
use crate::ui::{Component, EventResult, Result, TextInput};

pub enum FormEvent {
    /// A field value changed.
    Changed,
    Submitted,
    Cancelled,
}

/// A bordered group of labelled text fields with one focused field.
pub struct Form {
    title: String,
    fields: Vec<TextInput>,
    focused: usize,
    active: bool,
    resolver: Arc<KeyResolver>,
}

impl Form {
    pub fn new(title: impl Into<String>, fields: Vec<TextInput>, resolver: Arc<KeyResolver>) -> Self {
        Self {
            title: title.into(),
            fields,
            focused: 0,
            active: true,
            resolver,
        }
    }

    /// Whether the form currently has keyboard focus. Inactive forms render
    /// dimmed and without a cursor.
    pub const fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields.get(index).map_or("", TextInput::value)
    }

    pub fn set_value(&mut self, index: usize, value: &str) {
        if let Some(field) = self.fields.get_mut(index) {
            field.set_value(value);
        }
    }

    /// Paste into the focused field. Returns whether a value changed.
    pub fn handle_paste(&mut self, text: &str) -> bool {
        self.fields
            .get_mut(self.focused)
            .is_some_and(|field| field.insert_str(text))
    }

    /// Rows needed to render the form, borders included.
    pub fn height(&self) -> u16 {
        u16::try_from(self.fields.len()).unwrap_or(u16::MAX).saturating_add(2)
    }

    fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focused = (self.focused + 1) % self.fields.len();
        }
    }

    fn focus_previous(&mut self) {
        if !self.fields.is_empty() {
            self.focused = (self.focused + self.fields.len() - 1) % self.fields.len();
        }
    }
}

impl Component for Form {
    type Output = FormEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.resolver.matches_form(&key, FormAction::Submit) {
            return Ok(FormEvent::Submitted.into());
        }
        if self.resolver.matches_form(&key, FormAction::Cancel) {
            return Ok(FormEvent::Cancelled.into());
        }

        // Text editing wins over navigation so that bindings such as `j`
        // remain typeable.
        if let Some(field) = self.fields.get_mut(self.focused) {
            match field.handle_key(key)? {
                EventResult::Event(_) => return Ok(FormEvent::Changed.into()),
                EventResult::Consumed => return Ok(EventResult::Consumed),
                EventResult::Ignored => {}
            }
        }

        if self.resolver.matches_form(&key, FormAction::Next) {
            self.focus_next();
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_form(&key, FormAction::Previous) {
            self.focus_previous();
            return Ok(EventResult::Consumed);
        }

        Ok(EventResult::Ignored)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let (border_color, title_color) = if self.active {
            (theme.border_focused(), theme.mauve())
        } else {
            (theme.border(), theme.overlay1())
        };

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(
                Style::default()
                    .fg(title_color)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::vertical(vec![Constraint::Length(1); self.fields.len()]).split(inner);
        for (index, (field, row)) in self.fields.iter().zip(rows.iter()).enumerate() {
            field.render_line(frame, *row, theme, self.active && index == self.focused);
        }
    }
}
