use std::time::Duration;

use async_trait::async_trait;
use color_eyre::Result;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::commands::Command;

/// Post a message to a screen after a delay.
pub struct DelayCmd<M> {
    delay: Duration,
    msg: M,
    tx: UnboundedSender<M>,
}

impl<M> DelayCmd<M> {
    pub const fn new(delay: Duration, msg: M, tx: UnboundedSender<M>) -> Self {
        Self { delay, msg, tx }
    }
}

#[async_trait]
impl<M: Send + 'static> Command for DelayCmd<M> {
    fn name(&self) -> String {
        format!("Waiting {}ms", self.delay.as_millis())
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        if self.tx.send(self.msg).is_err() {
            debug!("Screen closed before the delay elapsed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    #[tokio::test]
    async fn test_message_arrives_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cmd = Box::new(DelayCmd::new(Duration::from_millis(50), 42, tx));
        let handle = tokio::spawn(cmd.execute());

        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());

        assert_eq!(rx.recv().await, Some(42));
        handle.await.unwrap().unwrap();
    }
}
