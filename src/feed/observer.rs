use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::FeedChange;

pub type ChangeCallback = Arc<dyn Fn(&FeedChange) + Send + Sync>;

/// Token returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Holds at most one change observer.
#[derive(Default)]
pub struct ObserverSlot {
    current: Mutex<Option<(Subscription, ChangeCallback)>>,
    next_id: AtomicU64,
}

impl ObserverSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, callback: ChangeCallback) -> Subscription {
        let subscription = Subscription(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let previous = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace((subscription, callback));

        if let Some((old, _)) = previous {
            tracing::debug!("Feed observer {:?} replaced by {:?}", old, subscription);
        }
        subscription
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        match current.as_ref() {
            Some((active, _)) if *active == subscription => {
                *current = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Invoke the observer, if any, on the calling thread.
    ///
    /// The slot lock is released before the callback runs, so the callback
    /// may resubscribe.
    pub fn notify(&self, change: &FeedChange) {
        let callback = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|(_, callback)| callback.clone());

        if let Some(callback) = callback {
            callback(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, ChangeCallback) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        (
            count,
            Arc::new(move |_: &FeedChange| {
                c.fetch_add(1, Ordering::SeqCst);
            }),
        )
    }

    #[test]
    fn test_notify_without_observer_is_noop() {
        let slot = ObserverSlot::new();
        slot.notify(&FeedChange::Replaced { count: 0 });
        assert!(!slot.is_subscribed());
    }

    #[test]
    fn test_subscribe_replaces_previous() {
        let slot = ObserverSlot::new();
        let (first, first_cb) = counter();
        let (second, second_cb) = counter();

        slot.subscribe(first_cb);
        slot.subscribe(second_cb);
        slot.notify(&FeedChange::Replaced { count: 1 });

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stale_unsubscribe_is_ignored() {
        let slot = ObserverSlot::new();
        let (_, first_cb) = counter();
        let (second, second_cb) = counter();

        let stale = slot.subscribe(first_cb);
        let active = slot.subscribe(second_cb);

        assert!(!slot.unsubscribe(stale));
        slot.notify(&FeedChange::Appended { range: 0..1 });
        assert_eq!(second.load(Ordering::SeqCst), 1);

        assert!(slot.unsubscribe(active));
        assert!(!slot.is_subscribed());
        slot.notify(&FeedChange::Appended { range: 1..2 });
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_callback_may_resubscribe() {
        let slot = Arc::new(ObserverSlot::new());
        let (count, counting_cb) = counter();
        let inner = slot.clone();

        slot.subscribe(Arc::new(move |_: &FeedChange| {
            inner.subscribe(counting_cb.clone());
        }));
        slot.notify(&FeedChange::Replaced { count: 0 });
        slot.notify(&FeedChange::Replaced { count: 0 });

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
