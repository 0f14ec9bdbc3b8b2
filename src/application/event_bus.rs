// Typed publish/subscribe bus for dashboard-wide signals
use crate::domain::range::RangeSelection;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardEvent {
    RangeChanged { range: RangeSelection },
    OpenNotes,
    DetailRequested { chart_id: usize },
    DatasetReplaced { chart_id: usize, len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&DashboardEvent) + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    handlers: Vec<(SubscriptionId, Handler)>,
}

/// Synchronous event bus.
///
/// `publish` calls every handler registered at the time of the call, in
/// subscription order, before returning. Nothing is queued: an event with no
/// subscribers is dropped, and each handler sees each event at most once.
/// Handlers may publish or (un)subscribe re-entrantly.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Subscribers>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&DashboardEvent) + Send + Sync + 'static,
    {
        let mut subscribers = self.lock();
        let id = SubscriptionId(subscribers.next_id);
        subscribers.next_id += 1;
        subscribers.handlers.push((id, Arc::new(handler)));
        id
    }

    /// Like `subscribe`, but the handler is removed when the guard drops.
    pub fn subscribe_scoped<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&DashboardEvent) + Send + Sync + 'static,
    {
        Subscription {
            id: self.subscribe(handler),
            bus: self.clone(),
        }
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.lock();
        let before = subscribers.handlers.len();
        subscribers.handlers.retain(|(existing, _)| *existing != id);
        subscribers.handlers.len() != before
    }

    /// Returns the number of handlers the event was delivered to.
    pub fn publish(&self, event: &DashboardEvent) -> usize {
        // Snapshot so handlers can touch the bus without deadlocking
        let handlers: Vec<Handler> = self
            .lock()
            .handlers
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();

        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().handlers.len()
    }

    fn lock(&self) -> MutexGuard<'_, Subscribers> {
        // A handler that panicked mid-publish leaves the list itself intact
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Keeps a handler registered for as long as it lives.
pub struct Subscription {
    bus: EventBus,
    id: SubscriptionId,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_publish_reaches_subscribers_in_order() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let seen = seen.clone();
            bus.subscribe(move |event| seen.lock().unwrap().push((tag, event.clone())));
        }

        let delivered = bus.publish(&DashboardEvent::OpenNotes);
        assert_eq!(delivered, 2);
        let seen = seen.lock().unwrap();
        assert_eq!(seen[0], ("first", DashboardEvent::OpenNotes));
        assert_eq!(seen[1], ("second", DashboardEvent::OpenNotes));
    }

    #[test]
    fn test_publish_without_subscribers_is_dropped() {
        let bus = EventBus::new();
        assert_eq!(bus.publish(&DashboardEvent::OpenNotes), 0);

        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        bus.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let id = bus.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(&DashboardEvent::DetailRequested { chart_id: 1 });
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&DashboardEvent::DetailRequested { chart_id: 1 });

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_scoped_subscription_ends_on_drop() {
        let bus = EventBus::new();
        let subscription = bus.subscribe_scoped(|_| {});
        assert_eq!(bus.subscriber_count(), 1);
        drop(subscription);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_handler_can_subscribe_during_publish() {
        let bus = EventBus::new();
        let late_calls = Arc::new(AtomicUsize::new(0));

        let inner_bus = bus.clone();
        let late = late_calls.clone();
        bus.subscribe(move |_| {
            let late = late.clone();
            inner_bus.subscribe(move |_| {
                late.fetch_add(1, Ordering::SeqCst);
            });
        });

        assert_eq!(bus.publish(&DashboardEvent::OpenNotes), 1);
        assert_eq!(late_calls.load(Ordering::SeqCst), 0);
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[test]
    fn test_event_wire_format() {
        let event = DashboardEvent::DatasetReplaced { chart_id: 2, len: 40 };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"dataset_replaced","chart_id":2,"len":40}"#);
    }
}
