//! Message type tags
//!
//! Every message routed through Courier declares exactly one capability:
//! [`Command`], [`Query`] or [`Event`]. The capability is fixed by
//! [`Message::Kind`], so one type can never be both a command and an event.
//! The concrete Rust type of the message is its routing key.

use std::any::{TypeId, type_name};
use std::fmt;

/// Base capability shared by all messages.
///
/// ```rust
/// use courier_core::{Command, CommandKind, Message};
///
/// struct CreateUser {
///     name: String,
/// }
///
/// impl Message for CreateUser {
///     type Kind = CommandKind;
/// }
/// impl Command for CreateUser {}
///
/// assert_eq!(CreateUser::message_name(), "CreateUser");
/// ```
pub trait Message: Send + Sync + 'static {
    /// One of [`CommandKind`], [`QueryKind`] or [`EventKind`]
    type Kind: Kind;

    /// Short type name used in errors and log records.
    fn message_name() -> &'static str
    where
        Self: Sized,
    {
        short_type_name(type_name::<Self>())
    }
}

/// Command trait
///
/// Commands express an intent to change state. Exactly one handler is bound
/// per command type and it reports completion only.
pub trait Command: Message<Kind = CommandKind> {}

/// Query trait
///
/// Queries retrieve data. Exactly one handler is bound per query type.
pub trait Query: Message<Kind = QueryKind> {
    /// Query result type
    type Result: Send + 'static;
}

/// Event trait
///
/// Events record a fact that already happened. Any number of subscribers may
/// listen to one event type.
pub trait Event: Message<Kind = EventKind> {}

/// Kind of message, for logs and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Command,
    Query,
    Event,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Command => "command",
            MessageKind::Query => "query",
            MessageKind::Event => "event",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Type-level capability tag. Implemented only by the three tags below.
pub trait Kind: sealed::Sealed + Send + Sync + 'static {
    const KIND: MessageKind;
}

/// Tag for [`Command`] messages
#[derive(Debug)]
pub enum CommandKind {}

/// Tag for [`Query`] messages
#[derive(Debug)]
pub enum QueryKind {}

/// Tag for [`Event`] messages
#[derive(Debug)]
pub enum EventKind {}

impl sealed::Sealed for CommandKind {}
impl sealed::Sealed for QueryKind {}
impl sealed::Sealed for EventKind {}

impl Kind for CommandKind {
    const KIND: MessageKind = MessageKind::Command;
}

impl Kind for QueryKind {
    const KIND: MessageKind = MessageKind::Query;
}

impl Kind for EventKind {
    const KIND: MessageKind = MessageKind::Event;
}

/// Routing key of a message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageType {
    id: TypeId,
    name: &'static str,
    kind: MessageKind,
}

impl MessageType {
    /// Routing key for `M`.
    pub fn of<M: Message>() -> Self {
        Self {
            id: TypeId::of::<M>(),
            name: M::message_name(),
            kind: <M::Kind as Kind>::KIND,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// `my_app::users::CreateUser<my_app::Id>` -> `CreateUser`
fn short_type_name(full: &'static str) -> &'static str {
    let base = match full.find('<') {
        Some(idx) => &full[..idx],
        None => full,
    };
    match base.rfind("::") {
        Some(idx) => &base[idx + 2..],
        None => base,
    }
}
