//! Plugin lifecycle: owns the shared tables, the proximity engine and the
//! two background timers
//!
//! Constructed once at host-plugin start and torn down at stop; the stores
//! are plain instances shared by `Arc`, not process-wide singletons. The host
//! integration layer forwards connect/disconnect events and the per-tick
//! callback here.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{info, warn};

use crate::config::VoiceConfig;
use crate::host::{PlayerId, RosterProvider};
use crate::position::PositionStore;
use crate::proximity::ProximityEngine;
use crate::session::SessionRegistry;
use crate::status::{StatusSnapshot, SyncStatus};
use crate::sync::BackendSync;

/// Period of the stale-listener decay timer
pub const CLEAR_INTERVAL: Duration = Duration::from_millis(100);

/// How long `stop` waits for in-flight background work before moving on
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("failed to build backend http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// The proximity voice coordination core
pub struct VoicePlugin {
    config: Arc<RwLock<VoiceConfig>>,
    positions: Arc<PositionStore>,
    sessions: Arc<SessionRegistry>,
    engine: ProximityEngine,
    status: Arc<SyncStatus>,
    roster: Arc<dyn RosterProvider>,
    shutdown_tx: Option<watch::Sender<bool>>,
    tasks: Vec<JoinHandle<()>>,
}

impl VoicePlugin {
    pub fn new(config: VoiceConfig, roster: Arc<dyn RosterProvider>) -> Self {
        let config = Arc::new(RwLock::new(config));
        let positions = Arc::new(PositionStore::new());
        let sessions = Arc::new(SessionRegistry::new());
        let engine = ProximityEngine::new(config.clone(), positions.clone(), sessions.clone());

        Self {
            config,
            positions,
            sessions,
            engine,
            status: Arc::new(SyncStatus::new()),
            roster,
            shutdown_tx: None,
            tasks: Vec::new(),
        }
    }

    /// Spawn the decay timer and the backend sync loop.
    ///
    /// Must be called from within a Tokio runtime. Idempotent while running.
    pub fn start(&mut self) -> Result<(), PluginError> {
        if self.shutdown_tx.is_some() {
            return Ok(());
        }

        let (shutdown_tx, _) = watch::channel(false);

        // Stale-listener decay: out-of-range speakers go silent within one
        // interval even when the next proximity pass is late.
        let sessions = self.sessions.clone();
        let mut shutdown = shutdown_tx.subscribe();
        self.tasks.push(tokio::spawn(async move {
            let mut ticker = interval(CLEAR_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => sessions.clear_all_listeners(),
                    _ = shutdown.changed() => break,
                }
            }
        }));

        let sync = BackendSync::new(
            self.config.clone(),
            self.positions.clone(),
            self.status.clone(),
        )?;
        self.tasks.push(tokio::spawn(sync.run(shutdown_tx.subscribe())));

        self.shutdown_tx = Some(shutdown_tx);

        let config = self.config.read();
        info!(
            "Voice proximity started: radius {} blocks, backend {}",
            config.voice_radius(),
            config.backend_base_url
        );
        Ok(())
    }

    /// Signal both timers and await them up to a short grace period
    pub async fn stop(&mut self) {
        let Some(shutdown_tx) = self.shutdown_tx.take() else {
            return;
        };
        let _ = shutdown_tx.send(true);

        for task in self.tasks.drain(..) {
            let abort = task.abort_handle();
            if timeout(SHUTDOWN_GRACE, task).await.is_err() {
                warn!("Background task did not stop within grace period, aborting");
                abort.abort();
            }
        }

        info!("Voice proximity stopped");
    }

    /// Per-tick callback: query the host roster and run one proximity pass
    pub fn tick(&self) {
        let roster = self.roster.roster();
        self.engine.run_pass(&roster);
    }

    /// Host join notification
    pub fn handle_connect(&self, player_id: PlayerId, username: &str) {
        self.sessions.on_join(player_id, username);
    }

    /// Host leave notification: drop both the position and the session
    pub fn handle_disconnect(&self, player_id: PlayerId) {
        self.positions.remove(player_id);
        self.sessions.on_leave(player_id);
    }

    /// Upstream voice-activity signal
    pub fn set_speaking(&self, player_id: PlayerId, speaking: bool) {
        self.sessions.set_speaking(player_id, speaking);
    }

    /// Sync-loop status for the admin surface
    pub fn status(&self) -> StatusSnapshot {
        self.status.snapshot()
    }

    pub fn config(&self) -> &Arc<RwLock<VoiceConfig>> {
        &self.config
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    pub fn positions(&self) -> &Arc<PositionStore> {
        &self.positions
    }
}
