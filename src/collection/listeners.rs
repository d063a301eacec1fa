//! Change listeners for the photo collection

use crate::types::PhotoKey;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

/// What changed in the collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionEvent {
    /// Photos appended, in insertion order
    Added(Vec<PhotoKey>),
    /// One photo removed
    Removed(PhotoKey),
    /// Every photo removed
    Cleared,
    /// A member's caption or tags were edited in place
    Updated(PhotoKey),
    /// The selection moved to this photo
    Selected(PhotoKey),
}

/// A change notification, with the collection state right after the change
///
/// Listeners run while the collection is being mutated, so they receive the
/// facts they need here instead of reading the collection back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionChange {
    pub event: CollectionEvent,
    pub count: usize,
    pub selected: Option<PhotoKey>,
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Listener = Box<dyn Fn(&CollectionChange) + Send + Sync>;

/// Listeners in subscription order
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<(Subscription, Listener)>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> Subscription
    where
        F: Fn(&CollectionChange) + Send + Sync + 'static,
    {
        let handle = Subscription(NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed));
        self.listeners.push((handle, Box::new(listener)));
        handle
    }

    /// Remove the listener registered under `handle`
    ///
    /// Returns false if the handle was already gone.
    pub fn unsubscribe(&mut self, handle: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(h, _)| *h != handle);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn notify(&self, change: &CollectionChange) {
        for (_, listener) in &self.listeners {
            listener(change);
        }
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
