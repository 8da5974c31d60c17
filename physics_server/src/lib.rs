//! `physics_server`
//!
//! Server-side systems:
//! - Command dispatch over a token -> handler registry
//! - The six command handlers (init, step, add, remove, retype, measures)
//! - Single-client socket session with terminator-based framing
//! - Scripted `nosocket` demo sequence
//!
//! Networking model:
//! - One TCP client at a time; commands are fully serialized — a command
//!   completes (including its engine call) before the next read begins.

pub mod context;
pub mod demo;
pub mod dispatch;
pub mod handlers;
pub mod session;

pub use context::ServiceContext;
pub use dispatch::MessageDispatcher;
pub use session::SocketServer;
