use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::event::{EditorEvent, EventHandler};

/// Shared "something happened" flag read back by the app loop.
#[derive(Debug, Clone, Default)]
pub struct DirtyFlag(Arc<AtomicBool>);

impl DirtyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Read and reset the flag.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Coalesces every event raised while handling one input into a single
/// repaint request.
#[derive(Debug)]
pub struct RepaintScheduler {
    pending: DirtyFlag,
    ctx: Option<egui::Context>,
    requests: Arc<AtomicUsize>,
}

impl RepaintScheduler {
    pub fn new(pending: DirtyFlag, ctx: Option<egui::Context>) -> Self {
        Self {
            pending,
            ctx,
            requests: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Counter of repaints actually requested, for diagnostics and tests.
    pub fn request_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.requests)
    }
}

impl EventHandler for RepaintScheduler {
    fn handle_event(&mut self, _event: &EditorEvent) {
        // Only the first event of a batch schedules; the flag is cleared by
        // whoever processes the next frame.
        if !self.pending.is_set() {
            self.pending.set();
            self.requests.fetch_add(1, Ordering::Relaxed);
            if let Some(ctx) = &self.ctx {
                ctx.request_repaint();
            }
        }
    }
}

/// Flags shape-list changes so the auto-export debounce can be restarted.
#[derive(Debug)]
pub struct ShapeListWatcher {
    changed: DirtyFlag,
    drawing_finished: DirtyFlag,
}

impl ShapeListWatcher {
    pub fn new(changed: DirtyFlag, drawing_finished: DirtyFlag) -> Self {
        Self {
            changed,
            drawing_finished,
        }
    }
}

impl EventHandler for ShapeListWatcher {
    fn handle_event(&mut self, event: &EditorEvent) {
        if event.changes_shape_list() {
            self.changed.set();
        }
        if matches!(event, EditorEvent::DrawingFinished) {
            self.drawing_finished.set();
        }
    }
}
