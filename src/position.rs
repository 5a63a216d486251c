//! Thread-safe buffer of last-known participant positions
//!
//! Filled by the proximity pass on the simulation tick and snapshotted by the
//! backend sync task. Per-key writes and whole-table snapshots may race; a
//! snapshot may mix data from adjacent ticks across keys, but every returned
//! record comes from a single `put`, and a snapshot in progress only ever
//! holds one shard against writers at a time.

use dashmap::DashMap;
use serde::Serialize;

use crate::host::{PlayerId, WorldId};
use crate::util::vec3::Vec3;

/// Last-known position of one participant, as sent to the backend
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPosition {
    pub player_id: PlayerId,
    pub username: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub world_id: WorldId,
}

/// Concurrent participant → position table
#[derive(Debug, Default)]
pub struct PositionStore {
    positions: DashMap<PlayerId, PlayerPosition>,
}

impl PositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the position for a participant
    pub fn put(
        &self,
        player_id: PlayerId,
        username: &str,
        position: Vec3,
        world_id: &str,
    ) {
        let record = PlayerPosition {
            player_id,
            username: username.to_string(),
            x: position.x,
            y: position.y,
            z: position.z,
            world_id: world_id.to_string(),
        };
        self.positions.insert(player_id, record);
    }

    /// Remove a participant (on disconnect); no-op if absent
    pub fn remove(&self, player_id: PlayerId) {
        self.positions.remove(&player_id);
    }

    /// Owned copy of the table's contents at call time
    pub fn snapshot(&self) -> Vec<PlayerPosition> {
        self.positions
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
