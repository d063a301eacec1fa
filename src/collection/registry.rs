//! The ordered set of photos waiting to be uploaded

use crate::collection::listeners::{
    CollectionChange, CollectionEvent, ListenerRegistry, Subscription,
};
use crate::photo::Photo;
use crate::types::PhotoKey;
use std::path::PathBuf;

/// Pending photos, the current selection and the change listeners
///
/// Order of `photos()` is insertion order, which is also upload order.
/// The selection is stored as a key and checked against the members on every
/// read, so it can never point at a photo that is gone.
#[derive(Debug, Default)]
pub struct PhotoCollection {
    items: Vec<Photo>,
    selected: Option<PhotoKey>,
    listeners: ListenerRegistry,
}

impl PhotoCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap each file in a new photo and append it
    pub fn add<I, P>(&mut self, files: I) -> Vec<PhotoKey>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let photos: Vec<Photo> = files.into_iter().map(Photo::new).collect();
        self.add_photos(photos)
    }

    /// Append already constructed photos
    ///
    /// A photo whose key is already a member is skipped.
    pub fn add_photos(&mut self, photos: Vec<Photo>) -> Vec<PhotoKey> {
        let mut added = Vec::with_capacity(photos.len());
        for photo in photos {
            let key = photo.key();
            if self.contains(key) || added.contains(&key) {
                log::warn!("Photo {} is already in the collection", key);
                continue;
            }
            added.push(key);
            self.items.push(photo);
        }

        if !added.is_empty() {
            log::debug!("Added {} photo(s), {} pending", added.len(), self.items.len());
            self.notify(CollectionEvent::Added(added.clone()));
        }
        added
    }

    /// Remove one photo
    ///
    /// Unknown keys are logged and ignored.
    pub fn remove(&mut self, key: PhotoKey) -> bool {
        if !self.ensure_member(key) {
            return false;
        }

        self.items.retain(|p| p.key() != key);
        self.refresh_selection();
        self.notify(CollectionEvent::Removed(key));
        true
    }

    pub fn remove_all(&mut self) {
        self.items.clear();
        self.refresh_selection();
        self.notify(CollectionEvent::Cleared);
    }

    /// Edit a member in place, then notify
    ///
    /// Returns false, without calling `edit`, if `key` is not a member.
    pub fn update<F>(&mut self, key: PhotoKey, edit: F) -> bool
    where
        F: FnOnce(&mut Photo),
    {
        if !self.ensure_member(key) {
            return false;
        }

        if let Some(photo) = self.items.iter_mut().find(|p| p.key() == key) {
            edit(photo);
        }
        self.notify(CollectionEvent::Updated(key));
        true
    }

    /// Move the selection to `key`
    ///
    /// Unknown keys are logged and leave the selection unchanged.
    pub fn select(&mut self, key: PhotoKey) -> bool {
        if !self.ensure_member(key) {
            return false;
        }

        self.selected = Some(key);
        self.notify(CollectionEvent::Selected(key));
        true
    }

    pub fn selected(&self) -> Option<&Photo> {
        let key = self.selected?;
        self.get(key)
    }

    pub fn selected_key(&self) -> Option<PhotoKey> {
        self.selected().map(Photo::key)
    }

    pub fn get(&self, key: PhotoKey) -> Option<&Photo> {
        self.items.iter().find(|p| p.key() == key)
    }

    pub fn contains(&self, key: PhotoKey) -> bool {
        self.items.iter().any(|p| p.key() == key)
    }

    pub fn photos(&self) -> &[Photo] {
        &self.items
    }

    /// Copies of the current members, in order
    pub fn snapshot(&self) -> Vec<Photo> {
        self.items.clone()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Register a change listener
    ///
    /// Listeners run synchronously inside the mutating call and must not try
    /// to lock a `SharedCollection` holding this collection.
    pub fn subscribe<F>(&mut self, listener: F) -> Subscription
    where
        F: Fn(&CollectionChange) + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, handle: Subscription) -> bool {
        self.listeners.unsubscribe(handle)
    }

    fn ensure_member(&self, key: PhotoKey) -> bool {
        match self.items.iter().filter(|p| p.key() == key).count() {
            1 => true,
            0 => {
                log::warn!("Photo {} does not exist in the collection", key);
                false
            }
            n => {
                log::error!("Photo {} matches {} entries in the collection", key, n);
                false
            }
        }
    }

    fn refresh_selection(&mut self) {
        if let Some(key) = self.selected {
            if !self.contains(key) {
                self.selected = None;
            }
        }
    }

    fn notify(&self, event: CollectionEvent) {
        let change = CollectionChange {
            event,
            count: self.items.len(),
            selected: self.selected_key(),
        };
        self.listeners.notify(&change);
    }
}
