mod components;
mod error_dialog;
mod message_line;
mod status_bar;
mod widgets;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

pub use color_eyre::Result;

use crate::Theme;

pub use components::{
    ColumnDef, ConfirmDialog, ConfirmEvent, Form, FormEvent, Table, TableEvent, TableRow,
    TextInput,
};
pub use error_dialog::{ErrorDialog, ErrorDialogEvent};
pub use message_line::MessageLine;
pub use status_bar::{Keybinding, STATUS_BAR_HEIGHT, StatusBar};
pub use widgets::Spinner;

/// Result of handling an input event.
///
/// - `Ignored` - the handler did not use the input, the parent may
/// - `Consumed` - the input was used but produced no event
/// - `Event(E)` - the input was used and produced an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventResult<E> {
    Ignored,
    Consumed,
    Event(E),
}

impl<E> EventResult<E> {
    pub const fn is_consumed(&self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

impl<E> From<E> for EventResult<E> {
    fn from(event: E) -> Self {
        Self::Event(event)
    }
}

/// Interactive UI building block.
///
/// Components handle input and emit generic outputs. They know nothing about
/// products or sessions.
pub trait Component {
    type Output;

    /// Handle a key event.
    ///
    /// # Errors
    /// Returns an error if handling the key failed.
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        _ = key;
        Ok(EventResult::Ignored)
    }

    /// Called on each tick for animations.
    fn handle_tick(&mut self) {}

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);
}
