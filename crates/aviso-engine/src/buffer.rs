//! Event buffering until rule configuration is available.
//!
//! The buffer starts Uninitialized: pushed events queue up in FIFO order.
//! The first `initialize` call installs the rule snapshot, drains the queue
//! (notifying listeners per event in submission order), and hands the
//! drained events back for dispatch. Afterwards every push notifies
//! listeners immediately. Re-initialization only swaps the held snapshot;
//! it never redrains.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{trace, warn};

use aviso_core::events::Event;
use aviso_core::result::AppResult;

use crate::matcher::RuleSet;

/// Callback receiving buffered and live events.
pub type Listener = Arc<dyn Fn(&Event) -> AppResult<()> + Send + Sync>;

/// Handle for removing a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Default)]
struct BufferState {
    ready: bool,
    pending: VecDeque<Event>,
    ruleset: Option<Arc<RuleSet>>,
}

/// FIFO event buffer with plain observable listeners.
pub struct EventBuffer {
    state: Mutex<BufferState>,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_listener: AtomicU64,
}

impl EventBuffer {
    /// Create an empty, uninitialized buffer.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BufferState::default()),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(1),
        }
    }

    /// Whether `initialize` has been called.
    pub fn is_ready(&self) -> bool {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).ready
    }

    /// The held rule snapshot, once initialized.
    pub fn ruleset(&self) -> Option<Arc<RuleSet>> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .ruleset
            .clone()
    }

    /// Number of events waiting for initialization.
    pub fn pending_len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pending
            .len()
    }

    /// Submit an event.
    ///
    /// While Uninitialized the event is queued and `None` is returned.
    /// When Ready, listeners are notified synchronously and the event is
    /// handed back to the caller for dispatch.
    pub fn push(&self, event: Event) -> Option<Event> {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if !state.ready {
                trace!(event_id = %event.id, key = %event.match_key(), "Buffering event");
                state.pending.push_back(event);
                return None;
            }
        }
        self.notify(&event);
        Some(event)
    }

    /// Install the rule snapshot and become Ready.
    ///
    /// The first call drains the queue in submission order, notifying
    /// listeners per event, and returns the drained events so the caller
    /// can dispatch them. Subsequent calls replace the snapshot and return
    /// an empty vec.
    pub fn initialize(&self, ruleset: Arc<RuleSet>) -> Vec<Event> {
        let drained: Vec<Event> = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.ruleset = Some(ruleset);
            if state.ready {
                return Vec::new();
            }
            state.ready = true;
            state.pending.drain(..).collect()
        };
        for event in &drained {
            self.notify(event);
        }
        drained
    }

    /// Register a listener. Returns the id used to unsubscribe.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Event) -> AppResult<()> + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    /// Deliver an event to every listener, isolating failures per listener.
    ///
    /// Callbacks run on a snapshot of the listener list with the lock
    /// released, so a listener may subscribe or unsubscribe re-entrantly.
    fn notify(&self, event: &Event) {
        let listeners: Vec<(ListenerId, Listener)> = self
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for (id, listener) in listeners {
            if let Err(e) = listener(event) {
                warn!(listener = id.0, event_id = %event.id, error = %e, "Listener failed");
            }
        }
    }
}

impl Default for EventBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBuffer")
            .field("ready", &self.is_ready())
            .field("pending", &self.pending_len())
            .finish()
    }
}
