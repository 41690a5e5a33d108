//! Diagnostic hub: broadcasts rejection events to subscribers.

use crossbeam_channel::{bounded, Sender};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::types::{
    Diagnostic, DiagnosticConfig, DiagnosticHandle, DropReason, SubscriberId,
};

/// Internal subscription state.
struct Subscriber {
    config: DiagnosticConfig,
    sender: Sender<Diagnostic>,
}

impl Subscriber {
    /// Try to send an event. Returns false if the buffer is full or the
    /// receiver is gone (subscriber will be dropped).
    fn try_send(&self, event: Diagnostic) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(crossbeam_channel::TrySendError::Full(_)) => false,
            Err(crossbeam_channel::TrySendError::Disconnected(_)) => false,
        }
    }

    /// Check if this subscription matches an event.
    fn matches(&self, event: &Diagnostic) -> bool {
        match (&self.config.filter.keys, event.key()) {
            (Some(keys), Some(key)) => keys.iter().any(|k| k == key),
            // Key filter with a key-less event, or no filter at all.
            _ => true,
        }
    }
}

/// Manages diagnostic subscriptions and broadcasts rejection events.
pub struct DiagnosticHub {
    /// Active subscribers by ID.
    subscribers: RwLock<HashMap<SubscriberId, Subscriber>>,
    /// Counter for generating subscriber IDs.
    next_id: AtomicU64,
}

impl DiagnosticHub {
    /// Create a new hub with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a new subscription. Returns a handle for receiving events.
    pub fn subscribe(&self, config: DiagnosticConfig) -> DiagnosticHandle {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = bounded(config.buffer_size);

        self.subscribers
            .write()
            .insert(id, Subscriber { config, sender });

        DiagnosticHandle { id, receiver }
    }

    /// Unsubscribe and clean up.
    pub fn unsubscribe(&self, id: SubscriberId) {
        let mut subs = self.subscribers.write();
        if let Some(sub) = subs.remove(&id) {
            // Notify about the drop (best effort)
            let _ = sub.sender.try_send(Diagnostic::Dropped {
                reason: DropReason::Unsubscribed,
            });
        }
    }

    /// Get subscriber count.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Broadcast an event to matching subscribers. Subscribers that fail to
    /// receive are dropped.
    pub fn broadcast(&self, event: Diagnostic) {
        let mut to_remove = Vec::new();

        {
            let subs = self.subscribers.read();
            for (id, sub) in subs.iter() {
                if sub.matches(&event) && !sub.try_send(event.clone()) {
                    to_remove.push(*id);
                }
            }
        }

        if !to_remove.is_empty() {
            let mut subs = self.subscribers.write();
            for id in to_remove {
                if let Some(sub) = subs.remove(&id) {
                    // The buffer that overflowed is usually still full, so
                    // this notice rarely lands. Removing the subscriber drops
                    // the sender, which disconnects the channel: a subscriber
                    // that drains its buffer then observes the disconnect.
                    let _ = sub.sender.try_send(Diagnostic::Dropped {
                        reason: DropReason::BufferOverflow,
                    });
                }
            }
        }
    }
}

impl Default for DiagnosticHub {
    fn default() -> Self {
        Self::new()
    }
}
