//! Per-subscriber update queues
//!
//! Every [`UpdateListener`] owns its own receiver, so each event reaches
//! every live listener. The store keeps only the sending halves; once a
//! listener is dropped its sender is pruned on the next emitted event and
//! nothing is queued for it any more.

use std::sync::mpsc;
use std::time::Duration;

use crate::event::{UpdateEvent, UpdateKind};

/// Senders of all live listeners of one store
#[derive(Debug, Default)]
pub(crate) struct Subscribers {
    senders: Vec<mpsc::Sender<UpdateEvent>>,
}

impl Subscribers {
    pub(crate) fn subscribe(&mut self) -> UpdateListener {
        let (tx, rx) = mpsc::channel();
        self.senders.push(tx);
        UpdateListener { rx }
    }

    /// Deliver `kind` to every listener, dropping those that went away
    pub(crate) fn broadcast(&mut self, kind: UpdateKind) {
        if self.senders.is_empty() {
            return;
        }
        let event = UpdateEvent::new(kind);
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub(crate) fn len(&self) -> usize {
        self.senders.len()
    }
}

/// Receiving end of one subscription
///
/// Iterating blocks until the next event and ends when the store is gone.
///
/// # Example
///
/// ```rust,ignore
/// let updates = store.subscribe();
/// for event in updates {
///     if event.is_published() {
///         render(store.current());
///     }
/// }
/// ```
#[derive(Debug)]
pub struct UpdateListener {
    rx: mpsc::Receiver<UpdateEvent>,
}

impl UpdateListener {
    /// Wait for the next event; `None` once the store was dropped
    pub fn recv(&self) -> Option<UpdateEvent> {
        self.rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<UpdateEvent> {
        self.rx.recv_timeout(timeout).ok()
    }

    pub fn try_recv(&self) -> Option<UpdateEvent> {
        self.rx.try_recv().ok()
    }

    /// Events already queued, without blocking
    pub fn try_iter(&self) -> mpsc::TryIter<'_, UpdateEvent> {
        self.rx.try_iter()
    }

    /// Take everything queued and keep only what a renderer needs
    ///
    /// Consecutive `Published` events collapse into the newest one, since a
    /// reader only ever sees the current snapshot anyway. Other events are
    /// kept in order.
    pub fn drain_coalesced(&self) -> Vec<UpdateEvent> {
        let mut events: Vec<UpdateEvent> = Vec::new();
        for event in self.rx.try_iter() {
            let replaces_last = event.is_published()
                && events.last().is_some_and(UpdateEvent::is_published);
            if replaces_last {
                events.pop();
            }
            events.push(event);
        }
        events
    }
}

impl Iterator for UpdateListener {
    type Item = UpdateEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn published(generation: u64) -> UpdateKind {
        UpdateKind::Published { generation }
    }

    #[test]
    fn test_broadcast_reaches_every_listener() {
        let mut subscribers = Subscribers::default();
        let a = subscribers.subscribe();
        let b = subscribers.subscribe();

        subscribers.broadcast(published(1));

        assert_eq!(a.try_recv().map(|e| e.kind), Some(published(1)));
        assert_eq!(b.try_recv().map(|e| e.kind), Some(published(1)));
    }

    #[test]
    fn test_dropped_listener_is_pruned() {
        let mut subscribers = Subscribers::default();
        let kept = subscribers.subscribe();
        drop(subscribers.subscribe());
        assert_eq!(subscribers.len(), 2);

        subscribers.broadcast(published(1));

        assert_eq!(subscribers.len(), 1);
        assert_eq!(kept.try_iter().count(), 1);
    }

    #[test]
    fn test_recv_ends_when_senders_are_gone() {
        let mut subscribers = Subscribers::default();
        let listener = subscribers.subscribe();

        drop(subscribers);

        assert!(listener.recv().is_none());
        assert!(listener.recv_timeout(Duration::from_millis(10)).is_none());
    }

    #[test]
    fn test_recv_from_other_thread() {
        let mut subscribers = Subscribers::default();
        let listener = subscribers.subscribe();

        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));
            subscribers.broadcast(published(7));
        });

        assert_eq!(listener.recv().map(|e| e.kind), Some(published(7)));
    }

    #[test]
    fn test_drain_coalesced_keeps_newest_publish() {
        let mut subscribers = Subscribers::default();
        let listener = subscribers.subscribe();

        subscribers.broadcast(published(1));
        subscribers.broadcast(published(2));
        subscribers.broadcast(UpdateKind::RenderRequested {
            entity_id: "power".to_string(),
        });
        subscribers.broadcast(published(3));
        subscribers.broadcast(published(4));

        let kinds: Vec<_> = listener.drain_coalesced().into_iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                published(2),
                UpdateKind::RenderRequested {
                    entity_id: "power".to_string()
                },
                published(4),
            ]
        );
        assert!(listener.try_recv().is_none());
    }
}
