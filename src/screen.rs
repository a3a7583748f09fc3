//! Screens, one per route.
//!
//! Screens follow the Elm architecture with a single-funnel update pattern:
//! - `init()` queues startup message(s)
//! - `handle_key()` translates input into queued messages
//! - `update()` processes all queued messages
//!
//! Only `update()` can return commands or switch screens. Command results
//! arrive on the same queue, so they are folded in by the next `update()`.

mod dashboard;
mod login;
mod register;

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;

pub use dashboard::DashboardScreen;
pub use login::LoginScreen;
pub use register::RegisterScreen;

use crate::Theme;
use crate::api::{ApiResponse, ProductApi};
use crate::commands::{ApiCmd, Command, DelayCmd};
use crate::ui::{EventResult, Keybinding, Result};
use crate::viewmodel::{Effect, Route};

pub enum ScreenMsg {
    /// No action needed
    Idle,
    /// Run one or more commands
    Run(Vec<Box<dyn Command>>),
    /// Replace this screen
    Navigate(Route),
    /// Drop the session and return to the login screen
    Logout,
}

impl<T: Command> From<T> for ScreenMsg {
    fn from(value: T) -> Self {
        Self::Run(vec![Box::new(value)])
    }
}

/// A full-page view bound to one route.
///
/// The App calls `init()` then `update()` when the screen becomes active,
/// `update()` after every consumed key and after every finished command.
pub trait Screen {
    /// Queue startup message(s).
    fn init(&mut self) {}

    /// Advance animations.
    fn handle_tick(&mut self) {}

    /// Handle a key event.
    ///
    /// # Errors
    /// Returns an error if a component fails to handle the key.
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<()>>;

    /// Insert pasted text into the focused text field, if there is one.
    /// Pasted text never triggers key bindings. Returns whether the
    /// screen changed.
    fn handle_paste(&mut self, _text: &str) -> bool {
        false
    }

    /// Process all queued messages.
    ///
    /// # Errors
    /// Returns an error if message processing fails. The App shows it in a
    /// dialog and keeps the screen.
    fn update(&mut self) -> Result<ScreenMsg>;

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    fn route(&self) -> Route;

    /// Keys available in the current state, for the status bar.
    fn keybindings(&self) -> Vec<Keybinding> {
        vec![]
    }
}

/// Accumulates the outcome of a batch of messages. Commands are merged; a
/// navigation ends the batch.
#[derive(Default)]
struct Batch {
    commands: Vec<Box<dyn Command>>,
}

impl Batch {
    /// Add one outcome. Returns it back if it ends the batch.
    fn absorb(&mut self, msg: ScreenMsg) -> Option<ScreenMsg> {
        match msg {
            ScreenMsg::Idle => None,
            ScreenMsg::Run(commands) => {
                self.commands.extend(commands);
                None
            }
            other @ (ScreenMsg::Navigate(_) | ScreenMsg::Logout) => Some(other),
        }
    }

    fn finish(self) -> ScreenMsg {
        if self.commands.is_empty() {
            ScreenMsg::Idle
        } else {
            ScreenMsg::Run(self.commands)
        }
    }
}

/// Turns view-model effects into commands that report back to one screen.
struct Effects<M> {
    api: Arc<dyn ProductApi>,
    tx: UnboundedSender<M>,
}

impl<M> Effects<M>
where
    M: From<ApiResponse> + From<Route> + Send + 'static,
{
    const fn new(api: Arc<dyn ProductApi>, tx: UnboundedSender<M>) -> Self {
        Self { api, tx }
    }

    /// Queue a message for the next `update()`.
    fn queue(&self, msg: M) {
        // The receiver lives as long as the screen, so this cannot fail
        // while anyone is listening.
        let _ = self.tx.send(msg);
    }

    fn apply(&self, effect: Option<Effect>) -> ScreenMsg {
        match effect {
            None => ScreenMsg::Idle,
            Some(Effect::Request(request)) => {
                ApiCmd::new(Arc::clone(&self.api), request, self.tx.clone()).into()
            }
            Some(Effect::Navigate(route)) => ScreenMsg::Navigate(route),
            Some(Effect::NavigateAfter { delay, route }) => {
                DelayCmd::new(delay, M::from(route), self.tx.clone()).into()
            }
            Some(Effect::Logout) => ScreenMsg::Logout,
        }
    }
}
