//! Handler traits and their type-erased wrappers

use crate::error::{DispatchError, HandlerError};
use crate::message::{Command, Event, Query};
use async_trait::async_trait;
use std::any::{Any, type_name};
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Command handler trait
#[async_trait]
pub trait CommandHandler<C: Command>: Send + Sync {
    /// Handle the command
    async fn handle(&self, command: C, cancel: &CancellationToken) -> Result<(), HandlerError>;
}

/// Query handler trait
#[async_trait]
pub trait QueryHandler<Q: Query>: Send + Sync {
    /// Handle the query
    async fn handle(&self, query: Q, cancel: &CancellationToken)
    -> Result<Q::Result, HandlerError>;
}

/// Event handler trait
#[async_trait]
pub trait EventHandler<E: Event>: Send + Sync {
    /// Handle the event
    async fn handle(&self, event: &E, cancel: &CancellationToken) -> Result<(), HandlerError>;
}

#[async_trait]
impl<C: Command, H: CommandHandler<C> + ?Sized> CommandHandler<C> for Arc<H> {
    async fn handle(&self, command: C, cancel: &CancellationToken) -> Result<(), HandlerError> {
        (**self).handle(command, cancel).await
    }
}

#[async_trait]
impl<Q: Query, H: QueryHandler<Q> + ?Sized> QueryHandler<Q> for Arc<H> {
    async fn handle(
        &self,
        query: Q,
        cancel: &CancellationToken,
    ) -> Result<Q::Result, HandlerError> {
        (**self).handle(query, cancel).await
    }
}

#[async_trait]
impl<E: Event, H: EventHandler<E> + ?Sized> EventHandler<E> for Arc<H> {
    async fn handle(&self, event: &E, cancel: &CancellationToken) -> Result<(), HandlerError> {
        (**self).handle(event, cancel).await
    }
}

/// Type-erased command handler
#[async_trait]
pub(crate) trait DynCommandHandler: Send + Sync {
    async fn handle_dyn(
        &self,
        command: Box<dyn Any + Send>,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError>;
}

/// Type-erased query handler
#[async_trait]
pub(crate) trait DynQueryHandler: Send + Sync {
    async fn handle_dyn(
        &self,
        query: Box<dyn Any + Send>,
        cancel: &CancellationToken,
    ) -> Result<Box<dyn Any + Send>, DispatchError>;
}

/// Type-erased event handler
///
/// Used by consumers that only hold a type-erased event, such as a queued
/// envelope.
#[async_trait]
pub trait DynEventHandler: Send + Sync {
    /// Handle event (type-erased)
    async fn handle_dyn(
        &self,
        event: &(dyn Any + Send + Sync),
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError>;
}

/// Wrapper for typed command handlers
pub(crate) struct TypedCommandHandler<C: Command, H: CommandHandler<C>> {
    handler: H,
    _phantom: PhantomData<C>,
}

impl<C: Command, H: CommandHandler<C>> TypedCommandHandler<C, H> {
    pub(crate) fn new(handler: H) -> Self {
        Self {
            handler,
            _phantom: PhantomData,
        }
    }
}

#[async_trait]
impl<C: Command, H: CommandHandler<C>> DynCommandHandler for TypedCommandHandler<C, H> {
    async fn handle_dyn(
        &self,
        command: Box<dyn Any + Send>,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        match command.downcast::<C>() {
            Ok(cmd) => Ok(self.handler.handle(*cmd, cancel).await?),
            Err(_) => Err(DispatchError::TypeMismatch {
                message_type: type_name::<C>(),
            }),
        }
    }
}

/// Wrapper for typed query handlers
pub(crate) struct TypedQueryHandler<Q: Query, H: QueryHandler<Q>> {
    handler: H,
    _phantom: PhantomData<Q>,
}

impl<Q: Query, H: QueryHandler<Q>> TypedQueryHandler<Q, H> {
    pub(crate) fn new(handler: H) -> Self {
        Self {
            handler,
            _phantom: PhantomData,
        }
    }
}

#[async_trait]
impl<Q: Query, H: QueryHandler<Q>> DynQueryHandler for TypedQueryHandler<Q, H> {
    async fn handle_dyn(
        &self,
        query: Box<dyn Any + Send>,
        cancel: &CancellationToken,
    ) -> Result<Box<dyn Any + Send>, DispatchError> {
        match query.downcast::<Q>() {
            Ok(qry) => {
                let result = self.handler.handle(*qry, cancel).await?;
                Ok(Box::new(result))
            }
            Err(_) => Err(DispatchError::TypeMismatch {
                message_type: type_name::<Q>(),
            }),
        }
    }
}

/// Wrapper for typed event handlers
pub(crate) struct TypedEventHandler<E: Event, H: EventHandler<E>> {
    handler: H,
    _phantom: PhantomData<E>,
}

impl<E: Event, H: EventHandler<E>> TypedEventHandler<E, H> {
    pub(crate) fn new(handler: H) -> Self {
        Self {
            handler,
            _phantom: PhantomData,
        }
    }
}

#[async_trait]
impl<E: Event, H: EventHandler<E>> DynEventHandler for TypedEventHandler<E, H> {
    async fn handle_dyn(
        &self,
        event: &(dyn Any + Send + Sync),
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError> {
        match event.downcast_ref::<E>() {
            Some(typed_event) => Ok(self.handler.handle(typed_event, cancel).await?),
            None => Err(DispatchError::TypeMismatch {
                message_type: type_name::<E>(),
            }),
        }
    }
}
