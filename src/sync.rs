//! Scheduled position push to the voice backend
//!
//! An independent 100ms timer (500ms initial delay) snapshots the position
//! buffer, serializes it and POSTs it to `{backend_base_url}/positions`. The
//! buffer filled by the proximity pass is the one source of truth here; the
//! sync task never queries the host directly.
//!
//! One cycle is always awaited before the next is started (single-flight);
//! with `MissedTickBehavior::Skip`, a slow request makes us skip overdue
//! ticks rather than queue them. Failures only update [`SyncStatus`] and the
//! next cycle proceeds unaffected.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::VoiceConfig;
use crate::position::{PlayerPosition, PositionStore};
use crate::status::SyncStatus;

/// Period of the sync timer
pub const SYNC_INTERVAL: Duration = Duration::from_millis(100);

/// Delay before the first cycle, giving the first ticks time to fill the buffer
pub const INITIAL_DELAY: Duration = Duration::from_millis(500);

/// Whole-request timeout; a hung backend must never back up the loop for long
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// One failed sync cycle
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("connection: {0}")]
    Request(#[from] reqwest::Error),
    #[error("http status {0}")]
    Status(u16),
}

/// Wire shape of the positions push
#[derive(Serialize)]
struct PositionsPayload<'a> {
    players: &'a [PlayerPosition],
}

/// Pushes position snapshots to the voice backend on a fixed cadence
pub struct BackendSync {
    client: reqwest::Client,
    config: Arc<RwLock<VoiceConfig>>,
    positions: Arc<PositionStore>,
    status: Arc<SyncStatus>,
}

impl BackendSync {
    pub fn new(
        config: Arc<RwLock<VoiceConfig>>,
        positions: Arc<PositionStore>,
        status: Arc<SyncStatus>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            config,
            positions,
            status,
        })
    }

    /// Run the sync loop until `shutdown` fires.
    ///
    /// An in-flight cycle is finished (bounded by the request timeout) before
    /// the shutdown signal is observed; the caller enforces the grace period.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval_at(Instant::now() + INITIAL_DELAY, SYNC_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "Backend sync started ({}ms interval)",
            SYNC_INTERVAL.as_millis()
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }
            self.run_cycle().await;
        }

        debug!("Backend sync stopped");
    }

    /// Execute a single cycle: snapshot, push, record the outcome
    pub async fn run_cycle(&self) {
        let players = self.positions.snapshot();
        if players.is_empty() {
            self.status.record_skip();
            return;
        }

        match self.push(&players).await {
            Ok(sent) => self.status.record_success(sent),
            Err(e) => {
                let reason = e.to_string();
                warn!("Position push failed: {}", reason);
                self.status.record_failure(&reason);
            }
        }
    }

    async fn push(&self, players: &[PlayerPosition]) -> Result<usize, SyncError> {
        let url = format!("{}/positions", self.config.read().backend_base_url_trimmed());

        let response = self
            .client
            .post(&url)
            .json(&PositionsPayload { players })
            .send()
            .await?;

        // Only the status class matters; the body is never consumed
        if !response.status().is_success() {
            return Err(SyncError::Status(response.status().as_u16()));
        }

        Ok(players.len())
    }
}
