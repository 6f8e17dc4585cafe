//! In-process domain event channel.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::event::DomainEvent;

/// Error returned by an event subscriber.
///
/// Subscriber failures are logged and swallowed by the channel; they never
/// reach the request that produced the events.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SubscriberError(pub String);

impl SubscriberError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A side effect reacting to committed domain events.
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Returns the subscriber name, used in failure logs.
    fn name(&self) -> &'static str;

    /// Handles a single event.
    async fn handle(&self, event: &DomainEvent) -> Result<(), SubscriberError>;
}

/// Publishes domain events to registered subscribers.
///
/// Dispatch is at-most-once and best-effort: it runs only after the unit of
/// work has committed, a failing subscriber does not stop the batch, and
/// nothing is retried or rolled back.
#[derive(Default)]
pub struct EventChannel {
    subscribers: Vec<Arc<dyn EventSubscriber>>,
}

impl EventChannel {
    /// Creates an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber. Subscribers are invoked in registration order.
    pub fn subscribe(&mut self, subscriber: Arc<dyn EventSubscriber>) {
        self.subscribers.push(subscriber);
    }

    /// Returns the number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Delivers each event to every subscriber, isolating failures.
    pub async fn dispatch(&self, events: &[DomainEvent]) {
        for event in events {
            for subscriber in &self.subscribers {
                if let Err(err) = subscriber.handle(event).await {
                    tracing::warn!(
                        subscriber = subscriber.name(),
                        event = event.event_type(),
                        error = %err,
                        "event subscriber failed"
                    );
                    metrics::counter!("event_subscriber_failures").increment(1);
                }
            }
            metrics::counter!("domain_events_dispatched").increment(1);
        }
    }
}
