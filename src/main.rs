//! Standalone soak runner
//!
//! Drives the coordination core with a synthetic wandering roster instead of
//! a real host simulation, so the whole pipeline (proximity pass, decay
//! timer, backend sync) can be exercised against a live voice backend.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::Rng;
use tokio::time::interval;
use tracing::{info, Level};
use uuid::Uuid;

use voice_proximity::config::VoiceConfig;
use voice_proximity::host::{Observation, RosterProvider};
use voice_proximity::plugin::VoicePlugin;
use voice_proximity::util::vec3::Vec3;

/// Simulation tick cadence of the synthetic host
const TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Ticks between status log lines (5s at 20 Hz)
const STATUS_LOG_TICKS: u64 = 100;

/// Synthetic roster of bots taking a random walk around spawn
struct WanderingRoster {
    players: Mutex<Vec<Observation>>,
}

impl WanderingRoster {
    fn new(count: usize) -> Arc<Self> {
        let mut rng = rand::thread_rng();
        let players = (0..count)
            .map(|i| {
                Observation::new(
                    Uuid::new_v4(),
                    format!("bot_{}", i),
                    Vec3::new(
                        rng.gen_range(-16.0..16.0),
                        64.0,
                        rng.gen_range(-16.0..16.0),
                    ),
                    "overworld",
                )
            })
            .collect();
        Arc::new(Self {
            players: Mutex::new(players),
        })
    }

    fn step(&self) {
        let mut rng = rand::thread_rng();
        for player in self.players.lock().iter_mut() {
            player.position += Vec3::new(
                rng.gen_range(-0.5..0.5),
                0.0,
                rng.gen_range(-0.5..0.5),
            );
        }
    }
}

impl RosterProvider for WanderingRoster {
    fn roster(&self) -> Vec<Observation> {
        self.players.lock().clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    info!("Voice proximity soak runner v{}", env!("CARGO_PKG_VERSION"));

    let config = VoiceConfig::load_or_default();
    info!(
        "Configuration loaded: radius={} blocks, attenuation={}, backend={}",
        config.voice_radius(),
        config.attenuation(),
        config.backend_base_url
    );

    let bot_count: usize = std::env::var("BOT_COUNT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(4);

    let roster = WanderingRoster::new(bot_count);
    let mut plugin = VoicePlugin::new(config, roster.clone());
    for player in roster.roster() {
        plugin.handle_connect(player.player_id, &player.username);
    }
    plugin.start()?;

    info!("Ticking {} bots at 20 Hz, Ctrl+C to stop", bot_count);

    let mut ticker = interval(TICK_INTERVAL);
    let mut tick_count: u64 = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                roster.step();
                plugin.tick();
                tick_count += 1;

                if tick_count % STATUS_LOG_TICKS == 0 {
                    let status = plugin.status();
                    match status.last_error {
                        Some(error) => info!("Backend sync degraded: {}", error),
                        None => info!(
                            "Backend sync ok: {} players in last push",
                            status.last_sent
                        ),
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    plugin.stop().await;
    info!("Stopped");

    Ok(())
}
