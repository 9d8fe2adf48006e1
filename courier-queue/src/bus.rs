//! Bus with direct commands and queries and queued events.

use crate::channel::{EventPublisher, event_channel};
use crate::config::QueueConfig;
use crate::consumer::ConsumptionLoop;
use crate::error::QueueResult;
use courier_core::{Command, DispatchError, Dispatcher, Event, HandlerRegistry, Query};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Commands and queries are dispatched at call time; events are enqueued and
/// delivered later by the paired [`ConsumptionLoop`].
///
/// # Examples
///
/// ```rust,ignore
/// let registry = Arc::new(HandlerRegistry::new());
/// registry.register_event::<UserCreated, _>(WelcomeEmail);
///
/// let (bus, consumer) = QueuedBus::new(registry, QueueConfig::default());
/// let worker = consumer.spawn(shutdown.clone());
///
/// bus.publish(UserCreated { id: 42 }).await?;
/// ```
#[derive(Clone, Debug)]
pub struct QueuedBus {
    dispatcher: Dispatcher,
    publisher: EventPublisher,
}

impl QueuedBus {
    /// Create the bus and the loop that drains its event queue.
    ///
    /// Dropping every clone of the bus closes the queue; the loop then drains
    /// what is left and stops.
    pub fn new(registry: Arc<HandlerRegistry>, config: QueueConfig) -> (Self, ConsumptionLoop) {
        let (publisher, receiver) = event_channel(config.capacity);
        let consumer = ConsumptionLoop::new(registry.clone(), receiver, config);

        let bus = Self {
            dispatcher: Dispatcher::new(registry),
            publisher,
        };
        (bus, consumer)
    }

    /// Send a command to its handler
    pub async fn send_command<C: Command>(
        &self,
        command: C,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        self.dispatcher.send_command(command, cancel).await
    }

    /// Send a query to its handler
    pub async fn send_query<Q: Query>(
        &self,
        query: Q,
        cancel: &CancellationToken,
    ) -> Result<Q::Result, DispatchError> {
        self.dispatcher.send_query(query, cancel).await
    }

    /// Enqueue an event for the consumption loop.
    ///
    /// Returns as soon as the event is queued. Missing subscribers are not an
    /// error here.
    pub async fn publish<E: Event>(&self, event: E) -> QueueResult<Uuid> {
        self.publisher.publish(event).await
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn publisher(&self) -> &EventPublisher {
        &self.publisher
    }
}
