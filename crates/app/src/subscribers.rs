//! Built-in domain event subscribers.

use async_trait::async_trait;
use domain::{DomainEvent, EventSubscriber, SubscriberError};

/// Logs every committed domain event.
///
/// The first consumer of the event channel; outbound notifications would
/// register alongside it without touching any handler.
pub struct ActivityLogSubscriber;

#[async_trait]
impl EventSubscriber for ActivityLogSubscriber {
    fn name(&self) -> &'static str {
        "activity-log"
    }

    async fn handle(&self, event: &DomainEvent) -> Result<(), SubscriberError> {
        tracing::info!(event = event.event_type(), detail = ?event, "domain event");
        Ok(())
    }
}
