use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use crate::event::{EditorEvent, EventHandler};

/// Synchronous observer hub of one editor.
///
/// Handlers run on the emitting thread, in subscription order. An event
/// emitted while another is being dispatched is queued and delivered right
/// after it, so every handler sees events in emission order.
pub struct EventBus {
    handlers: RefCell<Vec<Box<dyn EventHandler>>>,
    queued: RefCell<VecDeque<EditorEvent>>,
    delivered: Cell<u64>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handler_count())
            .field("delivered", &self.delivered.get())
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
            queued: RefCell::new(VecDeque::new()),
            delivered: Cell::new(0),
        }
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.handlers.borrow_mut().push(handler);
    }

    pub fn emit(&self, event: EditorEvent) {
        self.queued.borrow_mut().push_back(event);

        // Already dispatching further up the stack; that loop picks it up.
        let Ok(mut handlers) = self.handlers.try_borrow_mut() else {
            return;
        };
        loop {
            let next = self.queued.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };
            log::trace!("event: {:?}", event);
            for handler in handlers.iter_mut() {
                handler.handle_event(&event);
            }
            self.delivered.set(self.delivered.get() + 1);
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.try_borrow().map_or(0, |handlers| handlers.len())
    }

    /// Events dispatched so far.
    pub fn delivered(&self) -> u64 {
        self.delivered.get()
    }
}
