//! Single-slot toast with a cancellable expiry timer
//!
//! Each `show` spawns a tokio task that sleeps for the toast lifetime and then
//! reports the toast's generation over a channel. The UI loop calls `poll` to
//! apply expiries; a stale generation never clears a newer message. The timer
//! is aborted when a newer toast replaces it and when the `Toaster` is dropped.

use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

#[cfg(test)]
use tokio::task::AbortHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
}

pub struct Toaster {
    current: Option<Toast>,
    generation: u64,
    lifetime: Duration,
    timer: Option<JoinHandle<()>>,
    expired_tx: UnboundedSender<u64>,
    expired_rx: UnboundedReceiver<u64>,
}

impl Toaster {
    pub fn new(lifetime: Duration) -> Self {
        let (expired_tx, expired_rx) = mpsc::unbounded_channel();
        Self {
            current: None,
            generation: 0,
            lifetime,
            timer: None,
            expired_tx,
            expired_rx,
        }
    }

    /// Replace the active toast and restart the expiry timer.
    /// Must be called from within a tokio runtime.
    pub fn show(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.cancel_timer();
        self.generation += 1;

        let message = message.into();
        tracing::debug!(generation = self.generation, "Toast: {}", message);
        self.current = Some(Toast { message, kind });

        let generation = self.generation;
        let lifetime = self.lifetime;
        let tx = self.expired_tx.clone();
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(lifetime).await;
            // Receiver lives as long as the Toaster; nothing to do if it is gone
            let _ = tx.send(generation);
        }));
    }

    /// Apply pending expiries; returns true if the toast was cleared
    pub fn poll(&mut self) -> bool {
        let mut cleared = false;
        while let Ok(generation) = self.expired_rx.try_recv() {
            if generation == self.generation && self.current.is_some() {
                self.current = None;
                self.timer = None;
                cleared = true;
            }
        }
        cleared
    }

    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    /// Stop the pending expiry; the current toast stays until replaced
    pub fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    #[cfg(test)]
    pub fn timer_abort_handle(&self) -> Option<AbortHandle> {
        self.timer.as_ref().map(|t| t.abort_handle())
    }
}

impl Drop for Toaster {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIFETIME: Duration = Duration::from_millis(2500);

    #[tokio::test(start_paused = true)]
    async fn test_expires_after_lifetime() {
        let mut toaster = Toaster::new(LIFETIME);
        toaster.show("✅ Post shared to youtube!", ToastKind::Success);

        tokio::time::sleep(Duration::from_millis(2400)).await;
        assert!(!toaster.poll());
        assert!(toaster.current().is_some());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(toaster.poll());
        assert!(toaster.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_toast_restarts_delay() {
        let mut toaster = Toaster::new(LIFETIME);
        toaster.show("first", ToastKind::Warning);

        tokio::time::sleep(Duration::from_millis(2000)).await;
        toaster.show("second", ToastKind::Success);

        // The first timer would have fired here
        tokio::time::sleep(Duration::from_millis(1000)).await;
        toaster.poll();
        assert_eq!(toaster.current().unwrap().message, "second");

        tokio::time::sleep(Duration::from_millis(1600)).await;
        toaster.poll();
        assert!(toaster.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_expiry_is_ignored() {
        let mut toaster = Toaster::new(LIFETIME);
        toaster.show("old", ToastKind::Warning);
        toaster.show("new", ToastKind::Success);

        // Simulate an expiry that raced the abort
        toaster.expired_tx.send(1).unwrap();
        assert!(!toaster.poll());
        assert_eq!(toaster.current().unwrap().kind, ToastKind::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_timer() {
        let mut toaster = Toaster::new(LIFETIME);
        toaster.show("bye", ToastKind::Success);
        let abort = toaster.timer_abort_handle().unwrap();

        drop(toaster);
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert!(abort.is_finished());
    }
}
