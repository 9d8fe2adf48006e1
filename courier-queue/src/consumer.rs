//! Consumption loop draining the event channel.

use crate::channel::{Envelope, EventReceiver};
use crate::config::QueueConfig;
use crate::error::{QueueError, QueueResult};
use courier_core::HandlerRegistry;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

/// Lifecycle of a consumption loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Waiting for the next envelope
    Idle,
    /// Fanning one event out to its subscribers
    Draining,
    /// Terminal
    Stopped,
}

/// Why a loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The cancellation token fired
    Cancelled,
    /// Every publisher was dropped and the queue was drained
    Closed,
}

/// Summary returned when a loop stops normally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopReport {
    /// Events handed to at least one subscriber
    pub processed: u64,
    /// Events dequeued with no subscriber
    pub skipped: u64,
    /// Subscriber invocations that returned an error
    pub failed: u64,
    /// Envelopes still queued when the loop stopped, never delivered
    pub abandoned: u64,
    pub stop_reason: StopReason,
}

#[derive(Debug, Default)]
struct Counters {
    processed: u64,
    skipped: u64,
    failed: u64,
}

impl Counters {
    fn into_report(self, abandoned: u64, stop_reason: StopReason) -> LoopReport {
        LoopReport {
            processed: self.processed,
            skipped: self.skipped,
            failed: self.failed,
            abandoned,
            stop_reason,
        }
    }
}

/// Single reader of an event channel.
///
/// Events are handled one at a time: every subscriber of an event, in
/// registration order, finishes before the next envelope is read.
/// Cancellation is only observed between envelopes.
pub struct ConsumptionLoop {
    registry: Arc<HandlerRegistry>,
    receiver: EventReceiver,
    config: QueueConfig,
    state: watch::Sender<LoopState>,
}

impl ConsumptionLoop {
    /// Create a loop over `receiver`, dispatching to subscribers in `registry`.
    pub fn new(
        registry: Arc<HandlerRegistry>,
        receiver: EventReceiver,
        config: QueueConfig,
    ) -> Self {
        let (state, _) = watch::channel(LoopState::Idle);
        Self {
            registry,
            receiver,
            config,
            state,
        }
    }

    /// Observe the loop state.
    pub fn state(&self) -> watch::Receiver<LoopState> {
        self.state.subscribe()
    }

    /// Run the loop on a new task.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<QueueResult<LoopReport>> {
        tokio::spawn(self.run(cancel))
    }

    /// Run until the queue is closed and drained, or until `cancel` fires.
    ///
    /// With `continue_on_error` disabled, the first subscriber failure stops
    /// the loop and is returned.
    pub async fn run(mut self, cancel: CancellationToken) -> QueueResult<LoopReport> {
        let span = info_span!(
            "consumption_loop",
            bounded = self.config.capacity.is_some(),
            continue_on_error = self.config.continue_on_error
        );

        async move {
            info!("Consumption loop started");
            let mut counters = Counters::default();

            let outcome = loop {
                let envelope = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break Ok(StopReason::Cancelled),
                    envelope = self.receiver.recv() => match envelope {
                        Some(envelope) => envelope,
                        None => break Ok(StopReason::Closed),
                    },
                };

                self.state.send_replace(LoopState::Draining);
                let delivered = self.deliver(&envelope, &cancel, &mut counters).await;
                self.state.send_replace(LoopState::Idle);

                if let Err(err) = delivered {
                    break Err(err);
                }
            };

            self.receiver.close();
            let abandoned = self.receiver.len() as u64;
            if abandoned > 0 {
                warn!(abandoned, "Consumption loop stopped with events still queued");
            }

            self.state.send_replace(LoopState::Stopped);

            match outcome {
                Ok(stop_reason) => {
                    let report = counters.into_report(abandoned, stop_reason);
                    info!(
                        processed = report.processed,
                        skipped = report.skipped,
                        failed = report.failed,
                        abandoned = report.abandoned,
                        reason = ?report.stop_reason,
                        "Consumption loop stopped"
                    );
                    Ok(report)
                }
                Err(mut err) => {
                    if let QueueError::SubscriberFailed { abandoned: count, .. } = &mut err {
                        *count = abandoned;
                    }
                    error!(error = %err, "Consumption loop terminated by subscriber failure");
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn deliver(
        &self,
        envelope: &Envelope,
        cancel: &CancellationToken,
        counters: &mut Counters,
    ) -> QueueResult<()> {
        let message_type = envelope.message_type();

        let Some(handlers) = self.registry.event_handlers(message_type.id()) else {
            debug!(
                event_id = %envelope.id,
                message_type = %message_type,
                "No subscribers, skipping event"
            );
            counters.skipped += 1;
            return Ok(());
        };

        debug!(
            event_id = %envelope.id,
            message_type = %message_type,
            subscribers = handlers.len(),
            "Delivering event"
        );

        for (index, handler) in handlers.iter().enumerate() {
            if let Err(err) = handler.handle_dyn(envelope.payload(), cancel).await {
                counters.failed += 1;
                error!(
                    event_id = %envelope.id,
                    message_type = %message_type,
                    subscriber = index,
                    error = %err,
                    "Subscriber failed"
                );

                if !self.config.continue_on_error {
                    return Err(QueueError::SubscriberFailed {
                        message_type: message_type.name(),
                        event_id: envelope.id,
                        abandoned: 0,
                        source: err,
                    });
                }
            }
        }

        counters.processed += 1;
        Ok(())
    }
}

impl std::fmt::Debug for ConsumptionLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsumptionLoop")
            .field("config", &self.config)
            .field("state", &*self.state.borrow())
            .field("pending", &self.receiver.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::event_channel;
    use async_trait::async_trait;
    use courier_core::{Event, EventHandler, EventKind, HandlerError, Message};
    use std::sync::Mutex;

    #[derive(Debug)]
    struct Ping(u32);
    impl Message for Ping {
        type Kind = EventKind;
    }
    impl Event for Ping {}

    #[derive(Debug)]
    struct Unheard;
    impl Message for Unheard {
        type Kind = EventKind;
    }
    impl Event for Unheard {}

    struct Collect {
        seen: Arc<Mutex<Vec<u32>>>,
        fail_on: Option<u32>,
    }

    #[async_trait]
    impl EventHandler<Ping> for Collect {
        async fn handle(
            &self,
            event: &Ping,
            _cancel: &CancellationToken,
        ) -> Result<(), HandlerError> {
            self.seen.lock().unwrap().push(event.0);
            if self.fail_on == Some(event.0) {
                return Err(HandlerError::failed(format!("ping {}", event.0)));
            }
            Ok(())
        }
    }

    fn setup(
        config: QueueConfig,
        fail_on: Option<u32>,
    ) -> (crate::EventPublisher, ConsumptionLoop, Arc<Mutex<Vec<u32>>>) {
        let registry = Arc::new(HandlerRegistry::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        registry.register_event::<Ping, _>(Collect {
            seen: seen.clone(),
            fail_on,
        });

        let (publisher, receiver) = event_channel(config.capacity);
        let consumer = ConsumptionLoop::new(registry, receiver, config);
        (publisher, consumer, seen)
    }

    #[tokio::test]
    async fn test_drains_then_stops_when_closed() {
        let (publisher, consumer, seen) = setup(QueueConfig::default(), None);
        let state = consumer.state();

        publisher.publish(Ping(1)).await.unwrap();
        publisher.publish(Unheard).await.unwrap();
        publisher.publish(Ping(2)).await.unwrap();
        drop(publisher);

        let report = consumer.run(CancellationToken::new()).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
        assert_eq!(report.processed, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(report.stop_reason, StopReason::Closed);
        assert_eq!(*state.borrow(), LoopState::Stopped);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_reads_nothing() {
        let (publisher, consumer, seen) = setup(QueueConfig::default(), None);
        publisher.publish(Ping(1)).await.unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = consumer.run(cancel).await.unwrap();
        assert_eq!(report.stop_reason, StopReason::Cancelled);
        assert_eq!(report.processed, 0);
        assert_eq!(report.abandoned, 1);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_counts_abandoned_envelopes() {
        let (publisher, consumer, seen) = setup(QueueConfig::default(), None);
        for n in 1..=3 {
            publisher.publish(Ping(n)).await.unwrap();
        }

        let cancel = CancellationToken::new();
        cancel.cancel();
        let report = consumer.run(cancel).await.unwrap();

        assert_eq!(report.abandoned, 3);
        assert_eq!(report.processed + report.skipped, 0);
        assert!(seen.lock().unwrap().is_empty());

        // The receiver is closed before the loop returns.
        assert!(matches!(publisher.publish(Ping(4)).await, Err(QueueError::Closed)));
    }

    #[tokio::test]
    async fn test_drained_queue_abandons_nothing() {
        let (publisher, consumer, _seen) = setup(QueueConfig::new().with_capacity(8), None);
        publisher.publish(Ping(1)).await.unwrap();
        drop(publisher);

        let report = consumer.run(CancellationToken::new()).await.unwrap();
        assert_eq!(report.stop_reason, StopReason::Closed);
        assert_eq!(report.abandoned, 0);
    }

    #[tokio::test]
    async fn test_failure_is_logged_and_skipped_by_default() {
        let (publisher, consumer, seen) = setup(QueueConfig::default(), Some(1));

        publisher.publish(Ping(1)).await.unwrap();
        publisher.publish(Ping(2)).await.unwrap();
        drop(publisher);

        let report = consumer.run(CancellationToken::new()).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
        assert_eq!(report.failed, 1);
        assert_eq!(report.processed, 2);
    }

    #[tokio::test]
    async fn test_failure_stops_loop_when_configured() {
        let (publisher, consumer, seen) =
            setup(QueueConfig::new().continue_on_error(false), Some(1));
        let state = consumer.state();

        publisher.publish(Ping(1)).await.unwrap();
        publisher.publish(Ping(2)).await.unwrap();
        publisher.publish(Ping(3)).await.unwrap();

        let err = consumer.run(CancellationToken::new()).await.unwrap_err();
        assert!(err.to_string().ends_with("2 events abandoned"));
        assert_eq!(
            std::error::Error::source(&err).map(|e| e.to_string()),
            Some("Handler failed: ping 1".to_string())
        );
        match err {
            QueueError::SubscriberFailed { message_type, abandoned, .. } => {
                assert_eq!(message_type, "Ping");
                assert_eq!(abandoned, 2);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(*seen.lock().unwrap(), vec![1]);
        assert_eq!(*state.borrow(), LoopState::Stopped);
    }
}
