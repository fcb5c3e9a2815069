//! Change feeds for observing record and collection mutations.
//!
//! Every record and collection owns a feed. Feeds distribute events to
//! any number of subscribers, enabling:
//! - Reactive UI updates
//! - Derived state invalidation
//! - Test assertions on notification behavior
//!
//! # Usage
//!
//! ```rust,ignore
//! let record = Record::new(&parent_type, payload)?;
//! let rx = record.subscribe();
//!
//! record.set("title", "renamed")?;
//!
//! while let Ok(event) = rx.try_recv() {
//!     println!("change: {:?}", event);
//! }
//! ```

use parking_lot::RwLock;
use std::sync::mpsc::{self, Receiver, Sender};

use crate::cid::Cid;
use crate::record::Record;
use crate::slot::Slot;

/// An event emitted by a record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordEvent {
    /// A single attribute or relation slot changed. Fired once per changed
    /// entry, in the order entries appeared in the incoming payload.
    KeyChanged {
        /// The record that changed.
        cid: Cid,
        /// The attribute key.
        key: String,
        /// The new slot value; `None` when the key was unset.
        value: Option<Slot>,
    },
    /// The record changed as a whole. Fired at most once per set call,
    /// after all per-key events.
    Changed {
        /// The record that changed.
        cid: Cid,
    },
}

impl RecordEvent {
    /// Creates a per-key change event.
    pub fn key_changed(cid: Cid, key: impl Into<String>, value: Option<Slot>) -> Self {
        Self::KeyChanged {
            cid,
            key: key.into(),
            value,
        }
    }

    /// Creates a record-level change event.
    pub fn changed(cid: Cid) -> Self {
        Self::Changed { cid }
    }

    /// The key this event is about, when it is a per-key event.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::KeyChanged { key, .. } => Some(key),
            Self::Changed { .. } => None,
        }
    }
}

/// An event emitted by a collection.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionEvent {
    /// A record joined the collection.
    Added {
        /// The new member.
        record: Record,
    },
    /// An existing member was merged with new attributes.
    Updated {
        /// The changed member.
        record: Record,
    },
    /// A record left the collection.
    Removed {
        /// The former member.
        record: Record,
    },
}

impl CollectionEvent {
    /// The record this event is about.
    #[must_use]
    pub fn record(&self) -> &Record {
        match self {
            Self::Added { record } | Self::Updated { record } | Self::Removed { record } => record,
        }
    }
}

/// A change feed that distributes events to subscribers.
///
/// The feed:
/// - Preserves emission order
/// - Supports multiple subscribers
/// - Drops subscribers whose receiving half has disconnected
pub struct ChangeFeed<E: Clone> {
    /// Subscribers (senders).
    subscribers: RwLock<Vec<Sender<E>>>,
}

impl<E: Clone> ChangeFeed<E> {
    /// Creates a new change feed.
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Subscribes to the feed.
    ///
    /// Returns a receiver that will receive all future events. The
    /// receiver should be polled regularly to avoid unbounded buffering.
    pub fn subscribe(&self) -> Receiver<E> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.write().push(tx);
        rx
    }

    /// Emits an event to all subscribers.
    ///
    /// Events are cloned to each active subscriber; disconnected
    /// subscribers are removed.
    pub fn emit(&self, event: E) {
        let mut subscribers = self.subscribers.write();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Emits multiple events in order.
    pub fn emit_batch(&self, events: Vec<E>) {
        for event in events {
            self.emit(event);
        }
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl<E: Clone> Default for ChangeFeed<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn emit_and_receive() {
        let feed = ChangeFeed::new();
        let rx = feed.subscribe();

        let event = RecordEvent::changed(Cid::new());
        feed.emit(event.clone());

        let received = rx.recv_timeout(Duration::from_millis(100)).unwrap();
        assert_eq!(received, event);
    }

    #[test]
    fn multiple_subscribers() {
        let feed = ChangeFeed::new();
        let rx1 = feed.subscribe();
        let rx2 = feed.subscribe();

        let event = RecordEvent::key_changed(Cid::new(), "title", None);
        feed.emit(event.clone());

        assert_eq!(rx1.recv().unwrap(), event);
        assert_eq!(rx2.recv().unwrap(), event);
    }

    #[test]
    fn subscriber_cleanup() {
        let feed = ChangeFeed::new();
        assert_eq!(feed.subscriber_count(), 0);

        let rx = feed.subscribe();
        assert_eq!(feed.subscriber_count(), 1);

        // Drop receiver
        drop(rx);

        // Emit - should clean up disconnected subscriber
        feed.emit(RecordEvent::changed(Cid::new()));
        assert_eq!(feed.subscriber_count(), 0);
    }

    #[test]
    fn batch_preserves_order() {
        let feed = ChangeFeed::new();
        let rx = feed.subscribe();

        let cid = Cid::new();
        feed.emit_batch(vec![
            RecordEvent::key_changed(cid, "a", None),
            RecordEvent::key_changed(cid, "b", None),
            RecordEvent::changed(cid),
        ]);

        assert_eq!(rx.recv().unwrap().key(), Some("a"));
        assert_eq!(rx.recv().unwrap().key(), Some("b"));
        assert_eq!(rx.recv().unwrap().key(), None);
    }

    #[test]
    fn threaded_subscribe() {
        let feed = Arc::new(ChangeFeed::new());
        let rx = feed.subscribe();

        let cid = Cid::new();
        let feed_clone = Arc::clone(&feed);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            feed_clone.emit(RecordEvent::changed(cid));
        });

        let received = rx.recv_timeout(Duration::from_millis(500)).unwrap();
        assert_eq!(received, RecordEvent::changed(cid));

        handle.join().unwrap();
    }
}
