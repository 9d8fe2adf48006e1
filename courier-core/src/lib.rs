//! In-process command, query and event dispatch for Courier
//!
//! ## Features
//!
//! - **Commands** - State changes, exactly one handler per command type
//! - **Queries** - Data retrieval, exactly one handler per query type, typed result
//! - **Events** - Facts broadcast to any number of subscribers, in registration order
//! - **Type routing** - The concrete message type is the routing key
//! - **Cancellation** - A token is passed to every handler call
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier_core::*;
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! struct CreateUser {
//!     name: String,
//!     email: String,
//! }
//!
//! impl Message for CreateUser {
//!     type Kind = CommandKind;
//! }
//! impl Command for CreateUser {}
//!
//! struct CreateUserHandler;
//!
//! #[async_trait]
//! impl CommandHandler<CreateUser> for CreateUserHandler {
//!     async fn handle(
//!         &self,
//!         command: CreateUser,
//!         _cancel: &CancellationToken,
//!     ) -> Result<(), HandlerError> {
//!         println!("Creating user {} with email {}", command.name, command.email);
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), DispatchError> {
//!     let registry = Arc::new(HandlerRegistry::new());
//!     registry.register_command::<CreateUser, _>(CreateUserHandler);
//!
//!     let dispatcher = Dispatcher::new(registry);
//!     let cancel = CancellationToken::new();
//!
//!     dispatcher
//!         .send_command(
//!             CreateUser {
//!                 name: "John".to_string(),
//!                 email: "john@example.com".to_string(),
//!             },
//!             &cancel,
//!         )
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Events
//!
//! ```rust,ignore
//! registry.register_event::<UserCreated, _>(WelcomeEmail);
//! registry.register_event::<UserCreated, _>(AuditTrail);
//!
//! // WelcomeEmail runs, then AuditTrail. A failure in WelcomeEmail is
//! // returned and AuditTrail is skipped.
//! dispatcher.publish(UserCreated { id: 42 }, &cancel).await?;
//! ```

pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod message;
pub mod registry;

pub use dispatcher::Dispatcher;
pub use error::{DispatchError, HandlerError};
pub use handler::{CommandHandler, DynEventHandler, EventHandler, QueryHandler};
pub use message::{
    Command, CommandKind, Event, EventKind, Message, MessageKind, MessageType, Query, QueryKind,
};
pub use registry::HandlerRegistry;
pub use tokio_util::sync::CancellationToken;
