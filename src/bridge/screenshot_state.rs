use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use parking_lot::Mutex;

/// The last-known screenshot and the subscribers of "screenshot-taken".
#[derive(Default)]
pub struct ScreenshotState {
    current: Mutex<Option<String>>,
    subscribers: Mutex<Vec<UnboundedSender<String>>>,
    waker: Mutex<Option<egui::Context>>,
}

impl ScreenshotState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repaint `ctx` whenever a screenshot is announced, so receivers polled
    /// from the frame loop see it promptly.
    pub fn set_waker(&self, ctx: egui::Context) {
        *self.waker.lock() = Some(ctx);
    }

    pub fn current(&self) -> Option<String> {
        self.current.lock().clone()
    }

    pub fn subscribe(&self) -> UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Record `data_url` as the current screenshot and announce it.
    /// Subscribers that went away are dropped.
    pub fn store_and_emit(&self, data_url: String) {
        *self.current.lock() = Some(data_url.clone());
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.unbounded_send(data_url.clone()).is_ok());
        log::info!(
            "Screenshot announced to {} subscriber(s) ({} bytes)",
            subscribers.len(),
            data_url.len()
        );
        drop(subscribers);
        if let Some(ctx) = self.waker.lock().as_ref() {
            ctx.request_repaint();
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl std::fmt::Debug for ScreenshotState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenshotState")
            .field("has_current", &self.current.lock().is_some())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subscriber_receives_the_screenshot() {
        let state = ScreenshotState::new();
        let mut a = state.subscribe();
        let mut b = state.subscribe();
        state.store_and_emit("data:image/png;base64,AAAA".into());

        assert_eq!(state.current().as_deref(), Some("data:image/png;base64,AAAA"));
        assert_eq!(a.try_recv().unwrap(), "data:image/png;base64,AAAA");
        assert_eq!(b.try_recv().unwrap(), "data:image/png;base64,AAAA");
        assert!(a.try_recv().is_err());
    }

    #[test]
    fn closed_subscribers_are_pruned() {
        let state = ScreenshotState::new();
        let rx = state.subscribe();
        drop(rx);
        state.store_and_emit("data:image/png;base64,AAAA".into());
        assert_eq!(state.subscriber_count(), 0);
    }

    #[test]
    fn nothing_announced_yet() {
        assert!(ScreenshotState::new().current().is_none());
    }
}
