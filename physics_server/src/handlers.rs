//! Command handlers, one per message type.
//!
//! Every handler follows the same contract: strip the framing lines it does
//! not need, parse the payload, drive the engine facade through the context,
//! and return a response string. Failures never escape a handler — malformed
//! payloads, unknown enum tokens, and missing worlds all become response
//! text, and the session stays alive.
//!
//! Parsing is deliberately lenient with sloppy clients: unknown body types
//! default to primary with a warning, and bad numeric coordinates default
//! to zero. Body IDs are the exception — a
//! command aimed at an unparseable ID is answered with an error instead of
//! being redirected at an arbitrary body.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::time::Instant;

use tracing::{info, warn};

use physics_shared::body::{ActorShape, BodyId, BodyKind};
use physics_shared::engine::{BodySpawn, BodyState};
use physics_shared::math::Vec3;
use physics_shared::protocol;

use crate::context::ServiceContext;
use crate::dispatch::MessageHandler;

/// Resource error for body commands issued before `Init`.
pub const WORLD_NOT_INITIALIZED_RESPONSE: &str =
    "Error: No physics world is running. Send Init first.";

/// Fixed confirmation for a completed `Init`.
pub const INIT_RESPONSE: &str = "Physics system initialized.";

/// Fixed confirmation for a completed `AddBody`.
pub const ADD_BODY_RESPONSE: &str = "New body created successfully.";

/// Error for an `AddBody` payload with too few fields.
pub const ADD_BODY_PARSE_ERROR_RESPONSE: &str =
    "Error: AddBody payload needs at least 12 fields.";

/// Fixed confirmation for `RemoveBody`, returned whether or not the ID was
/// live (removal of an absent body is a silent no-op).
pub const REMOVE_BODY_RESPONSE: &str = "Body removal processed successfully.";

/// Error for a `RemoveBody` payload without a parseable body ID.
pub const REMOVE_BODY_PARSE_ERROR_RESPONSE: &str =
    "Error: RemoveBody payload needs a numeric body ID.";

/// Fixed confirmation for `UpdateBodyType`, returned whether or not the ID
/// was live (retyping an absent body is a silent no-op).
pub const UPDATE_BODY_TYPE_RESPONSE: &str = "Body type updated.";

/// Error for an `UpdateBodyType` payload with too few fields.
pub const UPDATE_BODY_TYPE_PARSE_ERROR_RESPONSE: &str =
    "Error: UpdateBodyType payload needs at least 2 fields.";

fn parse_coord(field: &str) -> f64 {
    field.parse().unwrap_or_else(|_| {
        warn!(field, "unparseable coordinate, defaulting to 0");
        0.0
    })
}

fn parse_vec3(fields: &[&str]) -> Vec3 {
    Vec3::new(
        parse_coord(fields[0]),
        parse_coord(fields[1]),
        parse_coord(fields[2]),
    )
}

/// `id;posX;posY;posZ;rotX;rotY;rotZ;linVelX;linVelY;linVelZ;angVelX;angVelY;angVelZ`
/// with fixed six-decimal formatting, matching what clients already parse.
fn format_state_line(id: BodyId, state: &BodyState) -> String {
    let p = state.position;
    let r = state.rotation;
    let lv = state.linear_velocity;
    let av = state.angular_velocity;
    format!(
        "{id};{:.6};{:.6};{:.6};{:.6};{:.6};{:.6};{:.6};{:.6};{:.6};{:.6};{:.6};{:.6}",
        p.x, p.y, p.z, r.x, r.y, r.z, lv.x, lv.y, lv.z, av.x, av.y, av.z
    )
}

/// `Init`: tear down any running world, build a fresh one, and create the
/// listed bodies. Lines that cannot be parsed are skipped, never fatal, so a
/// partially bad init still produces a usable world.
///
/// Payload lines: `actorType;id;bodyType;posX;posY;posZ`.
pub struct InitWorld;

impl MessageHandler for InitWorld {
    fn handle(&self, ctx: &mut ServiceContext, message: &str) -> String {
        info!("world initialization requested");

        let payload = protocol::strip_frame(message).to_string();
        ctx.reset_world();
        let engine = ctx.engine.as_mut().expect("reset_world installs an engine");

        for line in payload.lines().filter(|line| !line.trim().is_empty()) {
            let fields = protocol::split_fields(line);
            if fields.len() < 6 {
                warn!(line, "init line has fewer than 6 fields, skipping");
                continue;
            }

            let Some(shape) = ActorShape::parse(fields[0]) else {
                warn!(shape = fields[0], "unknown actor shape in init, skipping line");
                continue;
            };
            let Ok(id) = fields[1].parse::<u32>() else {
                warn!(id = fields[1], "unparseable body ID in init, skipping line");
                continue;
            };
            let id = BodyId(id);
            let kind = BodyKind::parse_lenient(fields[2]);
            let position = parse_vec3(&fields[3..6]);

            match engine.add_body(BodySpawn::at_rest(id, shape, position)) {
                Ok(()) => {
                    ctx.registry.insert(id, kind);
                }
                Err(err) => warn!(%id, %err, "skipping init body"),
            }
        }

        info!(bodies = ctx.registry.len(), "world initialized");
        INIT_RESPONSE.to_string()
    }
}

/// `Step`: advance the engine one fixed timestep and report every live
/// body's kinematics in registry order. The engine call's wall-clock
/// duration is appended to the step-measure log.
pub struct StepSimulation;

impl MessageHandler for StepSimulation {
    fn handle(&self, ctx: &mut ServiceContext, _message: &str) -> String {
        let Some(engine) = ctx.engine.as_mut() else {
            return WORLD_NOT_INITIALIZED_RESPONSE.to_string();
        };

        let started = Instant::now();
        let states = engine.step();
        ctx.measures.record(started.elapsed());

        let by_id: HashMap<BodyId, BodyState> = states.into_iter().collect();

        let mut response = String::new();
        for record in ctx.registry.iter() {
            if let Some(state) = by_id.get(&record.id) {
                let _ = writeln!(response, "{}", format_state_line(record.id, state));
            }
        }
        response
    }
}

/// `AddBody`: create one body in the running world.
///
/// Payload: `actorType;id;bodyType;posX;posY;posZ;linVelX;linVelY;linVelZ;angVelX;angVelY;angVelZ`.
/// Fewer than 12 fields is an error and nothing is mutated. A duplicate ID
/// is answered with a failure naming the ID.
pub struct AddBody;

impl MessageHandler for AddBody {
    fn handle(&self, ctx: &mut ServiceContext, message: &str) -> String {
        let payload = protocol::strip_frame(message);
        let line = payload.trim();

        let fields = protocol::split_fields(line);
        if fields.len() < 12 {
            warn!(line, "add body payload has fewer than 12 fields");
            return ADD_BODY_PARSE_ERROR_RESPONSE.to_string();
        }

        let Some(engine) = ctx.engine.as_mut() else {
            return WORLD_NOT_INITIALIZED_RESPONSE.to_string();
        };

        let shape = ActorShape::parse(fields[0]).unwrap_or_else(|| {
            warn!(shape = fields[0], "unknown actor shape, defaulting to sphere");
            ActorShape::Sphere
        });
        let Ok(id) = fields[1].parse::<u32>() else {
            warn!(id = fields[1], "unparseable body ID in add body");
            return format!("Error: could not parse body ID '{}'.", fields[1]);
        };
        let id = BodyId(id);
        let kind = BodyKind::parse_lenient(fields[2]);

        let spawn = BodySpawn {
            id,
            shape,
            position: parse_vec3(&fields[3..6]),
            linear_velocity: parse_vec3(&fields[6..9]),
            angular_velocity: parse_vec3(&fields[9..12]),
        };

        match engine.add_body(spawn) {
            Ok(()) => {
                ctx.registry.insert(id, kind);
                info!(%id, ?shape, %kind, "body added");
                ADD_BODY_RESPONSE.to_string()
            }
            Err(err) => {
                warn!(%id, %err, "body addition failed");
                format!("Error: {err}.")
            }
        }
    }
}

/// `RemoveBody`: destroy one body by ID. Removal of an absent ID is a
/// silent no-op answered with the standard success string.
pub struct RemoveBody;

impl MessageHandler for RemoveBody {
    fn handle(&self, ctx: &mut ServiceContext, message: &str) -> String {
        let payload = protocol::strip_frame(message);

        let Ok(id) = payload.trim().parse::<u32>() else {
            warn!(payload, "unparseable body ID in remove body");
            return REMOVE_BODY_PARSE_ERROR_RESPONSE.to_string();
        };
        let id = BodyId(id);

        let Some(engine) = ctx.engine.as_mut() else {
            return WORLD_NOT_INITIALIZED_RESPONSE.to_string();
        };

        let was_live = engine.remove_body(id);
        ctx.registry.remove(id);
        info!(%id, was_live, "body removal processed");

        REMOVE_BODY_RESPONSE.to_string()
    }
}

/// `UpdateBodyType`: retag one body as primary or clone.
///
/// Payload: `id;newBodyType`. Unknown type tokens leave the tag unchanged;
/// an absent ID is a silent no-op. Both still answer with the success
/// string — only a malformed payload is reported as an error.
pub struct UpdateBodyType;

impl MessageHandler for UpdateBodyType {
    fn handle(&self, ctx: &mut ServiceContext, message: &str) -> String {
        let payload = protocol::strip_frame(message);

        let fields = protocol::split_fields(payload.trim());
        if fields.len() < 2 {
            warn!(payload, "update body type payload has fewer than 2 fields");
            return UPDATE_BODY_TYPE_PARSE_ERROR_RESPONSE.to_string();
        }

        let Ok(id) = fields[0].parse::<u32>() else {
            warn!(id = fields[0], "unparseable body ID in update body type");
            return format!("Error: could not parse body ID '{}'.", fields[0]);
        };
        let id = BodyId(id);

        if ctx.engine.is_none() {
            return WORLD_NOT_INITIALIZED_RESPONSE.to_string();
        }

        match ctx.registry.kind_mut(id) {
            Some(kind) => match BodyKind::parse(fields[1]) {
                Some(new_kind) => {
                    *kind = new_kind;
                    info!(%id, %new_kind, "body type updated");
                }
                None => warn!(%id, token = fields[1], "unknown body type, tag unchanged"),
            },
            None => info!(%id, "update body type for unknown body, no-op"),
        }

        UPDATE_BODY_TYPE_RESPONSE.to_string()
    }
}

/// `GetSimulationMeasures`: dump the accumulated step-duration log.
/// Idempotent; internal state is untouched.
pub struct GetMeasures;

impl MessageHandler for GetMeasures {
    fn handle(&self, ctx: &mut ServiceContext, _message: &str) -> String {
        info!(samples = ctx.measures.len(), "simulation measures requested");
        ctx.measures.render()
    }
}
