//! Queued event delivery for Courier.
//!
//! Publishing enqueues an event on a FIFO channel and returns immediately. A
//! single [`ConsumptionLoop`] drains the channel and fans each event out to
//! its subscribers, one event at a time.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier_core::{CancellationToken, HandlerRegistry};
//! use courier_queue::{QueueConfig, QueuedBus};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(HandlerRegistry::new());
//! registry.register_event::<UserCreated, _>(WelcomeEmail);
//!
//! let shutdown = CancellationToken::new();
//! let (bus, consumer) = QueuedBus::new(registry, QueueConfig::default());
//! let worker = consumer.spawn(shutdown.clone());
//!
//! bus.publish(UserCreated { id: 42 }).await?;
//!
//! // Either drop every bus clone to drain and stop, or cancel.
//! shutdown.cancel();
//! let report = worker.await??;
//! ```
//!
//! ## Failure Handling
//!
//! ```rust,ignore
//! // Default: log the failure, keep delivering.
//! let config = QueueConfig::new();
//!
//! // Stop the loop on the first subscriber failure.
//! let config = QueueConfig::new().continue_on_error(false);
//! ```
//!
//! ## Backpressure
//!
//! ```rust,ignore
//! // Publishers wait once 1024 events are queued.
//! let config = QueueConfig::new().with_capacity(1024);
//! ```

pub mod bus;
pub mod channel;
pub mod config;
pub mod consumer;
pub mod error;

pub use bus::QueuedBus;
pub use channel::{Envelope, EventPublisher, EventReceiver, event_channel};
pub use config::QueueConfig;
pub use consumer::{ConsumptionLoop, LoopReport, LoopState, StopReason};
pub use error::{QueueError, QueueResult};
