//! The pending photo collection
//!
//! This module holds the photos the user picked, the current selection and
//! the change listeners a front end uses to refresh itself.

pub mod listeners;
pub mod registry;

pub use listeners::{CollectionChange, CollectionEvent, ListenerRegistry, Subscription};
pub use registry::PhotoCollection;

use std::sync::{Arc, Mutex, MutexGuard};

/// A collection shared between a front end and the upload pipeline
///
/// All mutation goes through the one mutex, which keeps the collection and
/// the pipeline from interleaving their changes.
pub type SharedCollection = Arc<Mutex<PhotoCollection>>;

/// Wrap a collection for sharing
pub fn shared(collection: PhotoCollection) -> SharedCollection {
    Arc::new(Mutex::new(collection))
}

/// Lock a shared collection
///
/// A listener that panicked does not leave the collection in a broken state,
/// so a poisoned lock is taken over rather than propagated.
pub fn lock(collection: &SharedCollection) -> MutexGuard<'_, PhotoCollection> {
    collection.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
