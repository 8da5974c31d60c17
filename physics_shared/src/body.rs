//! Body identity and the live-body registry.
//!
//! The registry is the only state the dispatch layer keeps consistent
//! itself: which body IDs are live and whether each body is driven by this
//! service or mirrored from another instance. Kinematic state lives behind
//! the engine facade.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Numeric body identifier, unique among live bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether this service authoritatively drives a body or only mirrors it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BodyKind {
    #[default]
    Primary,
    Clone,
}

impl BodyKind {
    /// Parses a wire token. Unknown tokens are logged and default to
    /// `Primary` rather than rejecting the command.
    pub fn parse_lenient(token: &str) -> Self {
        match token {
            "primary" => BodyKind::Primary,
            "clone" => BodyKind::Clone,
            other => {
                warn!(token = other, "unknown body type, defaulting to primary");
                BodyKind::Primary
            }
        }
    }

    /// Strict variant: `None` for unknown tokens, used where the caller
    /// wants to leave existing state untouched instead of defaulting.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "primary" => Some(BodyKind::Primary),
            "clone" => Some(BodyKind::Clone),
            _ => None,
        }
    }
}

impl std::fmt::Display for BodyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BodyKind::Primary => write!(f, "Primary"),
            BodyKind::Clone => write!(f, "Clone"),
        }
    }
}

/// Shape of a simulated actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorShape {
    /// Static box, never moves.
    Floor,
    /// Dynamic ball.
    Sphere,
}

impl ActorShape {
    /// Substring match on the wire token; clients have been observed to send
    /// decorated shape names.
    pub fn parse(token: &str) -> Option<Self> {
        if token.contains("floor") {
            Some(ActorShape::Floor)
        } else if token.contains("sphere") {
            Some(ActorShape::Sphere)
        } else {
            None
        }
    }
}

/// One live body as the dispatch layer sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyRecord {
    pub id: BodyId,
    pub kind: BodyKind,
}

/// Insertion-ordered set of live bodies. Step responses follow this order.
#[derive(Debug, Default)]
pub struct BodyRegistry {
    records: Vec<BodyRecord>,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a body. Returns false (and changes nothing) when the ID is
    /// already live.
    pub fn insert(&mut self, id: BodyId, kind: BodyKind) -> bool {
        if self.contains(id) {
            return false;
        }
        self.records.push(BodyRecord { id, kind });
        true
    }

    /// Removes a body. Returns false when the ID was not live.
    pub fn remove(&mut self, id: BodyId) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() != before
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.records.iter().any(|r| r.id == id)
    }

    /// Mutable access to one body's kind tag.
    pub fn kind_mut(&mut self, id: BodyId) -> Option<&mut BodyKind> {
        self.records
            .iter_mut()
            .find(|r| r.id == id)
            .map(|r| &mut r.kind)
    }

    /// Live bodies in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &BodyRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Forgets every live body (world re-initialization).
    pub fn clear(&mut self) {
        self.records.clear();
    }
}
