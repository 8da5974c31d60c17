//! Scripted in-process demonstration, run with the `nosocket` argument.
//!
//! Exercises the whole command surface without opening a socket: build a
//! world with a floor and two spheres, remove one, add another, retag it,
//! step a few frames, and dump the measures. Useful for eyeballing the
//! service end to end.

use tracing::info;

use physics_shared::config::ServiceConfig;
use physics_shared::protocol;

use crate::context::ServiceContext;
use crate::dispatch::MessageDispatcher;

const DEMO_STEPS: usize = 5;

/// Runs the fixed command sequence, logging every response.
pub fn run_scripted_demo(config: ServiceConfig) {
    let dispatcher = MessageDispatcher::with_default_handlers();
    let mut ctx = ServiceContext::new(config);

    let mut script: Vec<String> = vec![
        "Init\nfloor;0;primary;0;0;0\nsphere;1;primary;0;0;250\nsphere;2;primary;250;0;250\nMessageEnd\n".into(),
        "RemoveBody\n1\nMessageEnd\n".into(),
        "AddBody\nsphere;4;primary;0;0;250;0;0;0;0;0;0\nMessageEnd\n".into(),
        "UpdateBodyType\n4;clone\nMessageEnd\n".into(),
    ];
    for _ in 0..DEMO_STEPS {
        script.push("Step\nMessageEnd\n".into());
    }
    script.push("GetSimulationMeasures\nMessageEnd\n".into());

    for message in &script {
        let token = protocol::command_token(message).to_string();
        let response = dispatcher.dispatch(&mut ctx, message);
        info!(command = %token, response = %response.trim_end(), "demo command processed");
    }

    info!(bodies = ctx.registry.len(), steps = ctx.measures.len(), "demo finished");
}
