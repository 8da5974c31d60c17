//! Message dispatch.
//!
//! A dispatcher holds a registry mapping command tokens to handler values,
//! built once at session start and read-only afterwards. Each incoming
//! message has its token on the first line; the matching handler receives
//! the *original* message (first line included) and strips the framing it
//! does not need itself.

use std::collections::HashMap;

use tracing::warn;

use physics_shared::protocol;

use crate::context::ServiceContext;
use crate::handlers;

/// Fixed diagnostic for a token with no registered handler. The session
/// stays open; only this response tells the client its message was dropped.
pub const UNKNOWN_COMMAND_RESPONSE: &str = "Error: Message type could not be handled.";

/// One command kind: parse the payload, drive the engine facade, produce a
/// response string. Handlers are stateless; all mutable state arrives
/// through the context.
pub trait MessageHandler: Send + Sync {
    fn handle(&self, ctx: &mut ServiceContext, message: &str) -> String;
}

/// Token -> handler registry.
pub struct MessageDispatcher {
    handlers: HashMap<String, Box<dyn MessageHandler>>,
}

impl Default for MessageDispatcher {
    fn default() -> Self {
        Self::with_default_handlers()
    }
}

impl MessageDispatcher {
    /// An empty registry; callers register their own handlers.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// The full protocol: all six command handlers registered under their
    /// wire tokens.
    pub fn with_default_handlers() -> Self {
        let mut dispatcher = Self::new();
        dispatcher.register("Init", Box::new(handlers::InitWorld));
        dispatcher.register("Step", Box::new(handlers::StepSimulation));
        dispatcher.register("AddBody", Box::new(handlers::AddBody));
        dispatcher.register("RemoveBody", Box::new(handlers::RemoveBody));
        dispatcher.register("UpdateBodyType", Box::new(handlers::UpdateBodyType));
        dispatcher.register("GetSimulationMeasures", Box::new(handlers::GetMeasures));
        dispatcher
    }

    /// Registers a handler, overwriting any previous binding for the token.
    pub fn register(&mut self, token: &str, handler: Box<dyn MessageHandler>) {
        self.handlers.insert(token.to_string(), handler);
    }

    /// Routes one complete message to its handler. Exact token match only.
    pub fn dispatch(&self, ctx: &mut ServiceContext, message: &str) -> String {
        let token = protocol::command_token(message);

        match self.handlers.get(token) {
            Some(handler) => handler.handle(ctx, message),
            None => {
                warn!(token, "no handler registered for message type");
                UNKNOWN_COMMAND_RESPONSE.to_string()
            }
        }
    }
}
