//! FIFO channel carrying published events to the consumption loop.

use crate::error::{QueueError, QueueResult};
use chrono::{DateTime, Utc};
use courier_core::{Event, MessageType};
use std::any::Any;
use std::fmt;
use tokio::sync::mpsc;
use uuid::Uuid;

/// A published event on its way to the consumption loop.
///
/// The payload is owned by the envelope; it moves from the publisher into the
/// channel and from the channel to the single reader.
pub struct Envelope {
    /// Unique envelope ID
    pub id: Uuid,

    /// When the event was enqueued
    pub published_at: DateTime<Utc>,

    message_type: MessageType,
    payload: Box<dyn Any + Send + Sync>,
}

impl Envelope {
    /// Wrap an event
    pub fn new<E: Event>(event: E) -> Self {
        Self {
            id: Uuid::new_v4(),
            published_at: Utc::now(),
            message_type: MessageType::of::<E>(),
            payload: Box::new(event),
        }
    }

    /// Routing key of the wrapped event
    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    /// Borrow the wrapped event, type-erased
    pub fn payload(&self) -> &(dyn Any + Send + Sync) {
        &*self.payload
    }

    /// Borrow the wrapped event as `E`
    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.payload.downcast_ref::<E>()
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("id", &self.id)
            .field("published_at", &self.published_at)
            .field("message_type", &self.message_type.name())
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
enum Sender {
    Unbounded(mpsc::UnboundedSender<Envelope>),
    Bounded(mpsc::Sender<Envelope>),
}

enum Receiver {
    Unbounded(mpsc::UnboundedReceiver<Envelope>),
    Bounded(mpsc::Receiver<Envelope>),
}

/// Create an event channel.
///
/// `None` gives an unbounded queue. `Some(n)` bounds it to `n` envelopes
/// (at least one); publishers then wait for room.
pub fn event_channel(capacity: Option<usize>) -> (EventPublisher, EventReceiver) {
    let (sender, receiver) = match capacity {
        None => {
            let (tx, rx) = mpsc::unbounded_channel();
            (Sender::Unbounded(tx), Receiver::Unbounded(rx))
        }
        Some(capacity) => {
            let (tx, rx) = mpsc::channel(capacity.max(1));
            (Sender::Bounded(tx), Receiver::Bounded(rx))
        }
    };

    (EventPublisher { sender }, EventReceiver { receiver })
}

/// Producer half of the event channel.
///
/// Clone it freely; the channel closes once every clone is dropped.
#[derive(Clone)]
pub struct EventPublisher {
    sender: Sender,
}

impl EventPublisher {
    /// Enqueue an event and return the ID of its envelope.
    ///
    /// Whether anything subscribes to the event is not checked here. The only
    /// failure is a closed queue.
    pub async fn publish<E: Event>(&self, event: E) -> QueueResult<Uuid> {
        let envelope = Envelope::new(event);
        let id = envelope.id;

        match &self.sender {
            Sender::Unbounded(tx) => tx.send(envelope).map_err(|_| QueueError::Closed)?,
            Sender::Bounded(tx) => tx.send(envelope).await.map_err(|_| QueueError::Closed)?,
        }

        Ok(id)
    }

    /// Whether the receiving side has been dropped
    pub fn is_closed(&self) -> bool {
        match &self.sender {
            Sender::Unbounded(tx) => tx.is_closed(),
            Sender::Bounded(tx) => tx.is_closed(),
        }
    }

    pub fn is_bounded(&self) -> bool {
        matches!(self.sender, Sender::Bounded(_))
    }
}

impl fmt::Debug for EventPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventPublisher")
            .field("bounded", &self.is_bounded())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Consumer half of the event channel. There is exactly one.
pub struct EventReceiver {
    receiver: Receiver,
}

impl EventReceiver {
    /// Wait for the next envelope.
    ///
    /// Returns `None` once the channel is closed and fully drained.
    pub async fn recv(&mut self) -> Option<Envelope> {
        match &mut self.receiver {
            Receiver::Unbounded(rx) => rx.recv().await,
            Receiver::Bounded(rx) => rx.recv().await,
        }
    }

    /// Number of envelopes waiting
    pub fn len(&self) -> usize {
        match &self.receiver {
            Receiver::Unbounded(rx) => rx.len(),
            Receiver::Bounded(rx) => rx.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Refuse further envelopes. Those already queued can still be received.
    pub fn close(&mut self) {
        match &mut self.receiver {
            Receiver::Unbounded(rx) => rx.close(),
            Receiver::Bounded(rx) => rx.close(),
        }
    }
}

impl fmt::Debug for EventReceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventReceiver")
            .field("pending", &self.len())
            .finish()
    }
}
