//! # Courier
//!
//! In-process message dispatch with three delivery semantics over one
//! registry:
//!
//! - **Commands** change state and have exactly one handler
//! - **Queries** return a typed result from exactly one handler
//! - **Events** reach zero or more subscribers, either directly at publish
//!   time or through a queue drained by a background loop
//!
//! ## Direct dispatch
//!
//! ```rust,ignore
//! use courier::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(HandlerRegistry::new());
//! registry.register_command::<CreateUser, _>(CreateUserHandler);
//! registry.register_query::<GetUser, _>(GetUserHandler);
//! registry.register_event::<UserCreated, _>(WelcomeEmail);
//!
//! let dispatcher = Dispatcher::new(registry);
//! let cancel = CancellationToken::new();
//!
//! dispatcher.send_command(CreateUser::new("Ada", "ada@x.io"), &cancel).await?;
//! let user = dispatcher.send_query(GetUser { id: 42 }, &cancel).await?;
//! dispatcher.publish(UserCreated { id: 42 }, &cancel).await?;
//! ```
//!
//! ## Queued events
//!
//! ```rust,ignore
//! use courier::prelude::*;
//!
//! let (bus, consumer) = QueuedBus::new(registry, QueueConfig::default());
//! let worker = consumer.spawn(shutdown.clone());
//!
//! bus.publish(UserCreated { id: 42 }).await?;
//! ```
//!
//! ## Configuration
//!
//! ```rust,ignore
//! let config = courier::config::CourierConfig::load(Some(Path::new("courier.toml")))?;
//! let _guard = LogConfig::from_settings(&config.logging)?.init()?;
//! let queue = QueueConfig::from_settings(&config.queue);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub use courier_core::*;
pub use courier_log as logging;

#[cfg(feature = "queue")]
#[cfg_attr(docsrs, doc(cfg(feature = "queue")))]
pub use courier_queue as queue;

#[cfg(feature = "config")]
#[cfg_attr(docsrs, doc(cfg(feature = "config")))]
pub use courier_config as config;

/// Prelude module for convenient imports
///
/// ```rust
/// use courier::prelude::*;
/// ```
pub mod prelude {
    pub use courier_log::{LogConfig, LogFormat, LogLevel};
    pub use courier_core::{
        CancellationToken, Command, CommandHandler, CommandKind, DispatchError, Dispatcher,
        Event, EventHandler, EventKind, HandlerError, HandlerRegistry, Message, Query,
        QueryHandler, QueryKind,
    };

    #[cfg(feature = "queue")]
    pub use courier_queue::{
        ConsumptionLoop, LoopReport, LoopState, QueueConfig, QueueError, QueuedBus, StopReason,
    };

    #[cfg(feature = "config")]
    pub use courier_config::CourierConfig;

    pub use async_trait::async_trait;
}
