//! Per-participant voice session state
//!
//! Tracks who is speaking and who can hear whom at what volume. Listener maps
//! are repopulated by every proximity pass and wiped by an independent 100ms
//! timer, so a speaker who moves out of range decays to silence within one
//! clear interval even if the next pass is late.

use dashmap::DashMap;
use hashbrown::HashMap;
use serde::Serialize;

use crate::host::PlayerId;

/// Voice state of a single joined participant
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSession {
    pub player_id: PlayerId,
    pub username: String,
    /// Set externally by the upstream voice-activity signal
    pub speaking: bool,
    /// listener id → gain in [0, 1]
    pub listeners: HashMap<PlayerId, f64>,
}

impl VoiceSession {
    fn new(player_id: PlayerId, username: String) -> Self {
        Self {
            player_id,
            username,
            speaking: false,
            listeners: HashMap::new(),
        }
    }
}

/// Concurrent participant → session table.
///
/// Mutations on absent participants are no-ops by contract: join/leave events
/// and proximity passes arrive on different threads, so a speaker may have
/// left between a roster read and the corresponding `add_listener`.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<PlayerId, VoiceSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh session, replacing any prior session for the same id
    pub fn on_join(&self, player_id: PlayerId, username: &str) {
        self.sessions
            .insert(player_id, VoiceSession::new(player_id, username.to_string()));
    }

    /// Destroy the session; idempotent on an already-absent id
    pub fn on_leave(&self, player_id: PlayerId) {
        self.sessions.remove(&player_id);
    }

    /// Record that `listener_id` hears `speaker_id` at `volume`
    pub fn add_listener(&self, speaker_id: PlayerId, listener_id: PlayerId, volume: f64) {
        if let Some(mut session) = self.sessions.get_mut(&speaker_id) {
            session.listeners.insert(listener_id, volume);
        }
    }

    /// Empty one speaker's listener map
    pub fn clear_listeners(&self, speaker_id: PlayerId) {
        if let Some(mut session) = self.sessions.get_mut(&speaker_id) {
            session.listeners.clear();
        }
    }

    /// Empty every session's listener map; called by the decay timer
    pub fn clear_all_listeners(&self) {
        for mut session in self.sessions.iter_mut() {
            session.listeners.clear();
        }
    }

    pub fn set_speaking(&self, player_id: PlayerId, speaking: bool) {
        if let Some(mut session) = self.sessions.get_mut(&player_id) {
            session.speaking = speaking;
        }
    }

    /// Snapshot of one session, if joined
    pub fn get(&self, player_id: PlayerId) -> Option<VoiceSession> {
        self.sessions.get(&player_id).map(|entry| entry.value().clone())
    }

    /// Snapshot of all sessions
    pub fn get_all(&self) -> Vec<VoiceSession> {
        self.sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_join_creates_fresh_session() {
        let registry = SessionRegistry::new();
        let id = Uuid::new_v4();

        registry.on_join(id, "ana");
        registry.add_listener(id, Uuid::new_v4(), 0.5);
        assert_eq!(registry.get(id).unwrap().listeners.len(), 1);

        // Rejoin replaces the session entirely
        registry.on_join(id, "ana");
        let session = registry.get(id).unwrap();
        assert!(session.listeners.is_empty());
        assert!(!session.speaking);
    }

    #[test]
    fn test_leave_is_idempotent() {
        let registry = SessionRegistry::new();
        let id = Uuid::new_v4();

        registry.on_join(id, "ana");
        registry.on_leave(id);
        registry.on_leave(id);
        assert!(registry.get(id).is_none());
    }

    #[test]
    fn test_add_listener_without_session_is_noop() {
        let registry = SessionRegistry::new();
        registry.add_listener(Uuid::new_v4(), Uuid::new_v4(), 0.8);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_add_listener_upserts() {
        let registry = SessionRegistry::new();
        let speaker = Uuid::new_v4();
        let listener = Uuid::new_v4();

        registry.on_join(speaker, "ana");
        registry.add_listener(speaker, listener, 0.3);
        registry.add_listener(speaker, listener, 0.9);

        let session = registry.get(speaker).unwrap();
        assert_eq!(session.listeners.len(), 1);
        assert_eq!(session.listeners[&listener], 0.9);
    }

    #[test]
    fn test_set_speaking() {
        let registry = SessionRegistry::new();
        let id = Uuid::new_v4();

        // No session: no-op
        registry.set_speaking(id, true);
        assert!(registry.get(id).is_none());

        registry.on_join(id, "ana");
        registry.set_speaking(id, true);
        assert!(registry.get(id).unwrap().speaking);
        registry.set_speaking(id, false);
        assert!(!registry.get(id).unwrap().speaking);
    }

    #[test]
    fn test_clear_all_listeners() {
        let registry = SessionRegistry::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        registry.on_join(a, "ana");
        registry.on_join(b, "bruno");
        registry.add_listener(a, b, 0.7);
        registry.add_listener(b, a, 0.7);

        registry.clear_all_listeners();

        for session in registry.get_all() {
            assert!(session.listeners.is_empty());
        }
        // Sessions themselves survive the clear
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_admin_snapshot_field_names() {
        let registry = SessionRegistry::new();
        let speaker = Uuid::new_v4();
        let listener = Uuid::new_v4();

        registry.on_join(speaker, "ana");
        registry.set_speaking(speaker, true);
        registry.add_listener(speaker, listener, 0.5);

        let json = serde_json::to_value(registry.get(speaker).unwrap()).unwrap();
        assert_eq!(json["playerId"], serde_json::json!(speaker.to_string()));
        assert_eq!(json["speaking"], true);
        assert_eq!(json["listeners"][listener.to_string()], 0.5);
    }

    #[test]
    fn test_clear_listeners_single() {
        let registry = SessionRegistry::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        registry.on_join(a, "ana");
        registry.on_join(b, "bruno");
        registry.add_listener(a, b, 0.7);
        registry.add_listener(b, a, 0.7);

        registry.clear_listeners(a);

        assert!(registry.get(a).unwrap().listeners.is_empty());
        assert_eq!(registry.get(b).unwrap().listeners.len(), 1);
    }
}
