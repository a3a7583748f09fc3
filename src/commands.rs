//! Async side effects.
//!
//! Screens return commands from `update()`; the App spawns them and calls
//! `update()` again once they finish. Results travel back through the
//! issuing screen's own message channel, so a screen that has since been
//! replaced simply never hears about them.

mod api;
mod delay;

use async_trait::async_trait;
use color_eyre::Result;

pub use api::ApiCmd;
pub use delay::DelayCmd;

#[async_trait]
pub trait Command: Send + 'static {
    /// Human-readable description for logs.
    fn name(&self) -> String;

    /// Run the command to completion.
    async fn execute(self: Box<Self>) -> Result<()>;
}
