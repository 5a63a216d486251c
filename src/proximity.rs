//! Per-tick proximity pass
//!
//! For every ordered (listener, speaker) pair in the same world, computes the
//! Euclidean distance and, within the voice radius, derives a listener volume
//! from an exponential falloff. Also the sole writer of the position buffer:
//! every valid observation is stored for the backend sync during the same pass.
//!
//! Complexity is O(n²) per world per tick. Rosters are partitioned by world
//! first so co-located counts stay small; a spatial grid would be the next
//! step if they ever don't.

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use tracing::warn;

use crate::config::VoiceConfig;
use crate::host::Observation;
use crate::position::PositionStore;
use crate::session::SessionRegistry;

/// Volume for a speaker heard at `distance`, in [0, 1].
///
/// Exactly 1.0 at (or below) zero distance, `exp(-attenuation * distance)`
/// otherwise. Monotonically non-increasing in distance for fixed attenuation.
#[inline]
pub fn compute_volume(distance: f64, attenuation: f64) -> f64 {
    if distance <= 0.0 {
        return 1.0;
    }
    (-attenuation * distance).exp().clamp(0.0, 1.0)
}

/// Derives the per-tick listener graph from the host roster
pub struct ProximityEngine {
    config: Arc<RwLock<VoiceConfig>>,
    positions: Arc<PositionStore>,
    sessions: Arc<SessionRegistry>,
}

impl ProximityEngine {
    pub fn new(
        config: Arc<RwLock<VoiceConfig>>,
        positions: Arc<PositionStore>,
        sessions: Arc<SessionRegistry>,
    ) -> Self {
        Self {
            config,
            positions,
            sessions,
        }
    }

    /// Run one proximity pass over the current roster.
    ///
    /// Called once per simulation tick from the host's tick thread. A
    /// participant with a non-finite position is skipped on its own; the rest
    /// of the pass proceeds.
    pub fn run_pass(&self, roster: &[Observation]) {
        let (radius, attenuation) = {
            let config = self.config.read();
            (config.voice_radius() as f64, config.attenuation())
        };
        let radius_sq = radius * radius;

        // Partition by world; cross-world pairs are never compared
        let mut by_world: HashMap<&str, Vec<&Observation>> = HashMap::new();
        for obs in roster {
            if !obs.position.is_finite() {
                warn!(
                    "Skipping {} ({}): non-finite position",
                    obs.username, obs.player_id
                );
                continue;
            }

            self.positions
                .put(obs.player_id, &obs.username, obs.position, &obs.world_id);
            by_world.entry(obs.world_id.as_str()).or_default().push(obs);
        }

        for group in by_world.values() {
            for listener in group {
                for speaker in group {
                    if speaker.player_id == listener.player_id {
                        continue;
                    }

                    let distance_sq = listener.position.distance_sq(speaker.position);
                    if distance_sq > radius_sq {
                        continue;
                    }

                    let volume = compute_volume(distance_sq.sqrt(), attenuation);
                    // Keyed by the speaker's session; a speaker that left
                    // between roster read and here makes this a no-op.
                    self.sessions
                        .add_listener(speaker.player_id, listener.player_id, volume);
                }
            }
        }
    }
}
