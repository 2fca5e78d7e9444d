//! Change notifications and the observer registry.
//!
//! Notifications are delivered synchronously, in the same call stack as
//! the mutation, after the mutation has fully committed. Observers receive
//! only the event; re-entering the store with a conflicting mutation from
//! inside a callback is out of contract.

use std::fmt;

use super::types::Key;

/// The nature of an attribute-mapping change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrUpdate {
    /// One attribute was set.
    Set { name: String },
    /// One attribute was removed.
    Remove { name: String },
    /// The whole mapping was replaced (prior attributes cleared).
    Replace,
    /// Another mapping was merged in.
    Merge,
}

/// A change notification, emitted after the mutation it describes.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    NodeAdded { key: Key },
    NodeDropped { key: Key },
    EdgeAdded { key: Key },
    EdgeDropped { key: Key },
    NodeAttributesUpdated { key: Key, update: AttrUpdate },
    EdgeAttributesUpdated { key: Key, update: AttrUpdate },
    Cleared,
}

impl GraphEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GraphEvent::NodeAdded { .. } => EventKind::NodeAdded,
            GraphEvent::NodeDropped { .. } => EventKind::NodeDropped,
            GraphEvent::EdgeAdded { .. } => EventKind::EdgeAdded,
            GraphEvent::EdgeDropped { .. } => EventKind::EdgeDropped,
            GraphEvent::NodeAttributesUpdated { .. } => EventKind::NodeAttributesUpdated,
            GraphEvent::EdgeAttributesUpdated { .. } => EventKind::EdgeAttributesUpdated,
            GraphEvent::Cleared => EventKind::Cleared,
        }
    }
}

/// Notification kinds, for subscription filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    NodeAdded,
    NodeDropped,
    EdgeAdded,
    EdgeDropped,
    NodeAttributesUpdated,
    EdgeAttributesUpdated,
    Cleared,
}

/// Handle returned by `subscribe`, accepted by `unsubscribe`.
pub type ObserverId = u64;

struct ObserverEntry {
    id: ObserverId,
    /// `None` subscribes to every notification kind.
    kinds: Option<Vec<EventKind>>,
    callback: Box<dyn Fn(&GraphEvent)>,
}

/// Registered observers of a store, dispatched to in subscription order.
#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_id: ObserverId,
    entries: Vec<ObserverEntry>,
}

impl ObserverRegistry {
    pub(crate) fn subscribe(
        &mut self,
        kinds: Option<Vec<EventKind>>,
        callback: Box<dyn Fn(&GraphEvent)>,
    ) -> ObserverId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(ObserverEntry { id, kinds, callback });
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub(crate) fn emit(&self, event: &GraphEvent) {
        let kind = event.kind();
        for entry in &self.entries {
            let interested = match &entry.kinds {
                None => true,
                Some(kinds) => kinds.contains(&kind),
            };
            if interested {
                (entry.callback)(event);
            }
        }
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry").field("observers", &self.entries.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn filtered_subscription_only_sees_matching_kinds() {
        let mut registry = ObserverRegistry::default();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        registry.subscribe(
            Some(vec![EventKind::NodeAdded]),
            Box::new(move |event| sink.borrow_mut().push(event.kind())),
        );

        registry.emit(&GraphEvent::NodeAdded { key: Key::from("a") });
        registry.emit(&GraphEvent::EdgeAdded { key: Key::from("e") });
        registry.emit(&GraphEvent::Cleared);

        assert_eq!(*seen.borrow(), vec![EventKind::NodeAdded]);
    }

    #[test]
    fn unfiltered_subscription_sees_everything() {
        let mut registry = ObserverRegistry::default();
        let seen = Rc::new(RefCell::new(0usize));

        let sink = Rc::clone(&seen);
        registry.subscribe(None, Box::new(move |_| *sink.borrow_mut() += 1));

        registry.emit(&GraphEvent::Cleared);
        registry.emit(&GraphEvent::NodeDropped { key: Key::from("a") });

        assert_eq!(*seen.borrow(), 2);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut registry = ObserverRegistry::default();
        let seen = Rc::new(RefCell::new(0usize));

        let sink = Rc::clone(&seen);
        let id = registry.subscribe(None, Box::new(move |_| *sink.borrow_mut() += 1));

        registry.emit(&GraphEvent::Cleared);
        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));
        registry.emit(&GraphEvent::Cleared);

        assert_eq!(*seen.borrow(), 1);
    }
}
