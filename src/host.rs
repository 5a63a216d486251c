//! Host simulation boundary
//!
//! The host owns entity storage and the tick scheduler; this crate only needs
//! one capability from it: "given a tick, list everyone who is present and
//! located". Real adapters (ECS queries, reference lookups) live in the host
//! integration layer, not here.

use uuid::Uuid;

use crate::util::vec3::Vec3;

/// Stable unique participant identity, owned by the host
pub type PlayerId = Uuid;

/// World/zone identifier; positions in different worlds are never compared
pub type WorldId = String;

/// One participant as observed by the host on a single tick
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub player_id: PlayerId,
    pub username: String,
    pub position: Vec3,
    pub world_id: WorldId,
}

impl Observation {
    pub fn new(
        player_id: PlayerId,
        username: impl Into<String>,
        position: Vec3,
        world_id: impl Into<String>,
    ) -> Self {
        Self {
            player_id,
            username: username.into(),
            position,
            world_id: world_id.into(),
        }
    }
}

/// Capability the core requires from the host simulation.
///
/// Participants without a resolvable position are expected to be omitted by
/// the adapter; omission is normal, not an error.
pub trait RosterProvider: Send + Sync {
    /// Current roster of located participants
    fn roster(&self) -> Vec<Observation>;
}
