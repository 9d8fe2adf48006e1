//! Direct dispatch of commands, queries and events

use crate::error::{DispatchError, Result};
use crate::message::{Command, Event, MessageType, Query};
use crate::registry::HandlerRegistry;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, debug_span};

/// Routes messages to their handlers at call time.
///
/// Every call looks the handler up by message type, awaits it, and hands its
/// outcome back to the caller as is. The cancellation token is passed down to
/// the handlers; honoring it is up to them.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
}

impl Dispatcher {
    /// Create a dispatcher over a registry
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }

    /// Get the underlying registry
    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    /// Send a command to its handler.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// dispatcher
    ///     .send_command(CreateUser::new("Ada", "ada@x.io"), &cancel)
    ///     .await?;
    /// ```
    pub async fn send_command<C: Command>(
        &self,
        command: C,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let message_type = MessageType::of::<C>();
        let handler = self
            .registry
            .command_handler(message_type.id())
            .ok_or_else(|| DispatchError::not_found(message_type))?;

        let span = debug_span!("send_command", message_type = %message_type);
        handler
            .handle_dyn(Box::new(command), cancel)
            .instrument(span)
            .await
    }

    /// Send a query to its handler and return the handler's result.
    pub async fn send_query<Q: Query>(
        &self,
        query: Q,
        cancel: &CancellationToken,
    ) -> Result<Q::Result> {
        let message_type = MessageType::of::<Q>();
        let handler = self
            .registry
            .query_handler(message_type.id())
            .ok_or_else(|| DispatchError::not_found(message_type))?;

        let span = debug_span!("send_query", message_type = %message_type);
        let result = handler
            .handle_dyn(Box::new(query), cancel)
            .instrument(span)
            .await?;

        result
            .downcast::<Q::Result>()
            .map(|result| *result)
            .map_err(|_| DispatchError::TypeMismatch {
                message_type: message_type.name(),
            })
    }

    /// Publish an event to every subscriber, one after another.
    ///
    /// Subscribers run in registration order. The first failure stops the
    /// fan-out and is returned; later subscribers are not invoked.
    pub async fn publish<E: Event>(&self, event: E, cancel: &CancellationToken) -> Result<()> {
        let message_type = MessageType::of::<E>();
        let handlers = self
            .registry
            .event_handlers(message_type.id())
            .ok_or_else(|| DispatchError::not_found(message_type))?;

        let span = debug_span!(
            "publish",
            message_type = %message_type,
            subscribers = handlers.len()
        );

        async {
            for (index, handler) in handlers.iter().enumerate() {
                if let Err(err) = handler.handle_dyn(&event, cancel).await {
                    debug!(subscriber = index, error = %err, "Subscriber failed, stopping fan-out");
                    return Err(err);
                }
            }
            Ok(())
        }
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .finish()
    }
}
