use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::Theme;
use crate::ui::{Component, EventResult, Result};

/// Emitted whenever the value changes.
pub struct TextInputEvent;

/// Single-line text field rendered inline as `label: value`.
///
/// The cursor is a char index, so multi-byte input edits correctly.
pub struct TextInput {
    label: String,
    value: String,
    cursor: usize,
    placeholder: Option<String>,
    masked: bool,
}

impl TextInput {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: String::new(),
            cursor: 0,
            placeholder: None,
            masked: false,
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub const fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the value, keeping the cursor if the value is unchanged.
    pub fn set_value(&mut self, value: &str) {
        if self.value != value {
            self.value = value.to_string();
            self.cursor = self.len();
        }
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Insert pasted text at the cursor. Control characters such as
    /// newlines are dropped. Returns whether the value changed.
    pub fn insert_str(&mut self, text: &str) -> bool {
        let mut changed = false;
        for c in text.chars().filter(|c| !c.is_control()) {
            self.insert_char(c);
            changed = true;
        }
        changed
    }

    fn delete_char_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    fn delete_char_at_cursor(&mut self) {
        if self.cursor < self.len() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    fn delete_word_before_cursor(&mut self) {
        let chars: Vec<char> = self.value.chars().collect();
        let mut pos = self.cursor;
        while pos > 0 && chars[pos - 1] == ' ' {
            pos -= 1;
        }
        while pos > 0 && chars[pos - 1] != ' ' {
            pos -= 1;
        }
        let (start, end) = (self.byte_index(pos), self.byte_index(self.cursor));
        self.value.drain(start..end);
        self.cursor = pos;
    }

    fn clear_line(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Render as one line. The cursor is only drawn when `focused`.
    pub fn render_line(&self, frame: &mut Frame, area: Rect, theme: &Theme, focused: bool) {
        let label_style = if focused {
            Style::default()
                .fg(theme.lavender())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.subtext0())
        };
        let input_style = Style::default().fg(theme.text());
        let cursor_style = Style::default()
            .fg(theme.base())
            .bg(theme.text())
            .add_modifier(Modifier::BOLD);
        let placeholder_style = Style::default().fg(theme.overlay0());

        let mut spans = vec![Span::styled(format!("{}: ", self.label), label_style)];

        let display: Vec<char> = if self.masked {
            vec!['*'; self.len()]
        } else {
            self.value.chars().collect()
        };

        match (&self.placeholder, display.is_empty()) {
            (Some(placeholder), true) => {
                if focused {
                    spans.push(Span::styled(" ", cursor_style));
                }
                spans.push(Span::styled(placeholder.clone(), placeholder_style));
            }
            _ if focused => {
                let before: String = display[..self.cursor].iter().collect();
                let at = display.get(self.cursor).copied().unwrap_or(' ');
                let after: String = display.iter().skip(self.cursor + 1).collect();
                spans.push(Span::styled(before, input_style));
                spans.push(Span::styled(at.to_string(), cursor_style));
                spans.push(Span::styled(after, input_style));
            }
            _ => spans.push(Span::styled(display.iter().collect::<String>(), input_style)),
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

impl Component for TextInput {
    type Output = TextInputEvent;

    /// Editing keys only. Enter, Esc and Tab are left to the parent.
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        let before = self.value.len();
        let changed = |input: &Self, consumed: EventResult<TextInputEvent>| {
            if input.value.len() == before {
                consumed
            } else {
                TextInputEvent.into()
            }
        };

        Ok(match (key.code, key.modifiers) {
            (KeyCode::Backspace, KeyModifiers::ALT) => {
                self.delete_word_before_cursor();
                changed(self, EventResult::Consumed)
            }
            (KeyCode::Backspace, _) => {
                self.delete_char_before_cursor();
                changed(self, EventResult::Consumed)
            }
            (KeyCode::Delete, _) => {
                self.delete_char_at_cursor();
                changed(self, EventResult::Consumed)
            }
            (KeyCode::Left, _) => {
                self.cursor = self.cursor.saturating_sub(1);
                EventResult::Consumed
            }
            (KeyCode::Right, _) => {
                self.cursor = (self.cursor + 1).min(self.len());
                EventResult::Consumed
            }
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
                self.cursor = 0;
                EventResult::Consumed
            }
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.cursor = self.len();
                EventResult::Consumed
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.clear_line();
                changed(self, EventResult::Consumed)
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.insert_char(c);
                TextInputEvent.into()
            }
            _ => EventResult::Ignored,
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.render_line(frame, area, theme, true);
    }
}
