//! Channel fan-out for change notifications
//!
//! Every subscriber owns an unbounded channel. Publishing clones the event
//! into each live channel; a subscriber whose [`Subscription`] was dropped is
//! pruned on the next publish, whether or not its filter matches the event.
//! Late subscribers see nothing that was published before they registered.

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

type Filter<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

struct Subscriber<T> {
    sender: Sender<T>,
    filter: Option<Filter<T>>,
    /// Dead once the matching `Subscription` is dropped
    alive: Weak<()>,
}

/// Registry of subscribers for one event stream
pub struct Publisher<T> {
    subscribers: Mutex<Vec<Subscriber<T>>>,
}

impl<T: Clone + Send + 'static> Publisher<T> {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Registers a subscriber that receives every event
    pub fn subscribe(&self) -> Subscription<T> {
        self.register(None)
    }

    /// Registers a subscriber that only receives events matching `filter`
    pub fn subscribe_filtered<F>(&self, filter: F) -> Subscription<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.register(Some(Box::new(filter)))
    }

    fn register(&self, filter: Option<Filter<T>>) -> Subscription<T> {
        let (sender, receiver) = unbounded();
        let token = Arc::new(());
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscriber {
                sender,
                filter,
                alive: Arc::downgrade(&token),
            });
        Subscription {
            receiver,
            _token: token,
        }
    }

    /// Number of registered subscribers, including ones not yet pruned
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Delivers `event` to every matching subscriber, returning how many got it
    pub fn publish(&self, event: &T) -> usize {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut delivered = 0;

        subscribers.retain(|subscriber| {
            if subscriber.alive.strong_count() == 0 {
                return false;
            }
            if let Some(filter) = &subscriber.filter {
                if !filter(event) {
                    return true;
                }
            }
            match subscriber.sender.send(event.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => false,
            }
        });

        delivered
    }
}

impl<T: Clone + Send + 'static> Default for Publisher<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end of a subscription
///
/// The subscriber decides where events are drained: block on [`recv`],
/// poll with [`try_recv`] from a UI loop, or hand [`receiver`] to a
/// `select!`. Dropping the subscription unsubscribes it.
///
/// [`recv`]: Subscription::recv
/// [`try_recv`]: Subscription::try_recv
/// [`receiver`]: Subscription::receiver
pub struct Subscription<T> {
    receiver: Receiver<T>,
    _token: Arc<()>,
}

impl<T> Subscription<T> {
    /// Blocks for the next event; `None` once the publisher is gone
    pub fn recv(&self) -> Option<T> {
        self.receiver.recv().ok()
    }

    /// Waits up to `timeout` for the next event
    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Returns an already delivered event without blocking
    pub fn try_recv(&self) -> Option<T> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Drains every event delivered so far
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }

    pub fn receiver(&self) -> &Receiver<T> {
        &self.receiver
    }

    /// Unsubscribes; equivalent to dropping the subscription
    pub fn cancel(self) {}
}

impl<T> Iterator for Subscription<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.recv()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_all_subscribers_in_order() {
        let publisher = Publisher::new();
        let a = publisher.subscribe();
        let b = publisher.subscribe();

        for i in 0..5 {
            assert_eq!(publisher.publish(&i), 2);
        }

        assert_eq!(a.drain(), vec![0, 1, 2, 3, 4]);
        assert_eq!(b.drain(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_no_replay_for_late_subscribers() {
        let publisher = Publisher::new();
        publisher.publish(&1);
        publisher.publish(&2);

        let late = publisher.subscribe();
        assert!(late.try_recv().is_none());

        publisher.publish(&3);
        assert_eq!(late.drain(), vec![3]);
    }

    #[test]
    fn test_cancel_only_affects_one_subscriber() {
        let publisher = Publisher::new();
        let keep = publisher.subscribe();
        let gone = publisher.subscribe();

        gone.cancel();
        assert_eq!(publisher.publish(&"event"), 1);
        assert_eq!(keep.try_recv(), Some("event"));
    }

    #[test]
    fn test_filtered_subscription() {
        let publisher = Publisher::new();
        let evens = publisher.subscribe_filtered(|n: &i32| n % 2 == 0);
        let all = publisher.subscribe();

        for i in 0..6 {
            publisher.publish(&i);
        }

        assert_eq!(evens.drain(), vec![0, 2, 4]);
        assert_eq!(all.drain().len(), 6);
    }

    #[test]
    fn test_dropped_filtered_subscriber_pruned_without_match() {
        let publisher = Publisher::new();
        let odd_only = publisher.subscribe_filtered(|n: &i32| n % 2 == 1);
        let _all = publisher.subscribe();
        assert_eq!(publisher.subscriber_count(), 2);

        drop(odd_only);
        assert_eq!(publisher.publish(&2), 1);
        assert_eq!(publisher.subscriber_count(), 1);
    }

    #[test]
    fn test_recv_returns_none_after_publisher_dropped() {
        let publisher = Publisher::new();
        let sub = publisher.subscribe();
        publisher.publish(&7u8);
        drop(publisher);

        assert_eq!(sub.recv(), Some(7));
        assert_eq!(sub.recv(), None);
    }

    #[test]
    fn test_cross_thread_delivery() {
        let publisher = Publisher::new();
        let sub = publisher.subscribe();

        let reader = std::thread::spawn(move || sub.take(3).collect::<Vec<u32>>());
        for i in 10..13 {
            publisher.publish(&i);
        }

        assert_eq!(reader.join().unwrap(), vec![10, 11, 12]);
    }
}
