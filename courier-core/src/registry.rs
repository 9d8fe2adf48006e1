//! Handler registry
//!
//! Maps the runtime type of a message to the handler logic bound to it.
//! Commands and queries map to one handler each, events map to an ordered
//! list of subscribers.

use crate::handler::{
    CommandHandler, DynCommandHandler, DynEventHandler, DynQueryHandler, EventHandler,
    QueryHandler, TypedCommandHandler, TypedEventHandler, TypedQueryHandler,
};
use crate::message::{Command, Event, MessageKind, MessageType, Query};
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::Arc;
use tracing::{debug, warn};

/// Registry of command, query and event handlers.
///
/// Registration is expected to finish before dispatch starts. Lookups clone
/// the handler references out of the map, so no map lock is ever held while a
/// handler runs.
pub struct HandlerRegistry {
    commands: DashMap<TypeId, Arc<dyn DynCommandHandler>>,
    queries: DashMap<TypeId, Arc<dyn DynQueryHandler>>,
    events: DashMap<TypeId, Vec<Arc<dyn DynEventHandler>>>,
}

impl HandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            commands: DashMap::new(),
            queries: DashMap::new(),
            events: DashMap::new(),
        }
    }

    /// Register the handler for command type `C`.
    ///
    /// A previous handler for `C` is replaced.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let registry = HandlerRegistry::new();
    /// registry.register_command::<CreateUser, _>(CreateUserHandler::new(store));
    /// ```
    pub fn register_command<C, H>(&self, handler: H)
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        let message_type = MessageType::of::<C>();
        let handler = Arc::new(TypedCommandHandler::new(handler));

        if self.commands.insert(message_type.id(), handler).is_some() {
            warn!(
                kind = %MessageKind::Command,
                message_type = %message_type,
                "Replaced existing handler"
            );
        } else {
            debug!(
                kind = %MessageKind::Command,
                message_type = %message_type,
                "Registered handler"
            );
        }
    }

    /// Register the handler for query type `Q`.
    ///
    /// A previous handler for `Q` is replaced.
    pub fn register_query<Q, H>(&self, handler: H)
    where
        Q: Query,
        H: QueryHandler<Q> + 'static,
    {
        let message_type = MessageType::of::<Q>();
        let handler = Arc::new(TypedQueryHandler::new(handler));

        if self.queries.insert(message_type.id(), handler).is_some() {
            warn!(
                kind = %MessageKind::Query,
                message_type = %message_type,
                "Replaced existing handler"
            );
        } else {
            debug!(kind = %MessageKind::Query, message_type = %message_type, "Registered handler");
        }
    }

    /// Subscribe a handler to event type `E`.
    ///
    /// Subscribers are invoked in the order they were registered.
    pub fn register_event<E, H>(&self, handler: H)
    where
        E: Event,
        H: EventHandler<E> + 'static,
    {
        let message_type = MessageType::of::<E>();
        let handler: Arc<dyn DynEventHandler> = Arc::new(TypedEventHandler::new(handler));

        let mut subscribers = self.events.entry(message_type.id()).or_default();
        subscribers.push(handler);

        debug!(
            kind = %MessageKind::Event,
            message_type = %message_type,
            subscribers = subscribers.len(),
            "Subscribed handler"
        );
    }

    pub(crate) fn command_handler(&self, type_id: TypeId) -> Option<Arc<dyn DynCommandHandler>> {
        self.commands.get(&type_id).map(|h| h.value().clone())
    }

    pub(crate) fn query_handler(&self, type_id: TypeId) -> Option<Arc<dyn DynQueryHandler>> {
        self.queries.get(&type_id).map(|h| h.value().clone())
    }

    /// Subscribers for an event type, in registration order.
    ///
    /// Returns `None` when nothing ever subscribed to the type.
    pub fn event_handlers(&self, type_id: TypeId) -> Option<Vec<Arc<dyn DynEventHandler>>> {
        self.events.get(&type_id).map(|h| h.value().clone())
    }

    /// Check whether command type `C` has a handler
    pub fn has_command_handler<C: Command>(&self) -> bool {
        self.commands.contains_key(&TypeId::of::<C>())
    }

    /// Check whether query type `Q` has a handler
    pub fn has_query_handler<Q: Query>(&self) -> bool {
        self.queries.contains_key(&TypeId::of::<Q>())
    }

    /// Get subscriber count for an event type
    pub fn event_handler_count<E: Event>(&self) -> usize {
        self.events
            .get(&TypeId::of::<E>())
            .map(|h| h.len())
            .unwrap_or(0)
    }

    /// Number of message types with at least one binding
    pub fn len(&self) -> usize {
        self.commands.len() + self.queries.len() + self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("commands", &self.commands.len())
            .field("queries", &self.queries.len())
            .field("events", &self.events.len())
            .finish()
    }
}
