//! Proximity voice coordination core
//!
//! Tracks participant positions in a shared 3D space, derives a per-tick
//! "who hears whom, at what volume" relation from proximity, and pushes
//! positional snapshots to an external voice backend over HTTP.
//!
//! The host simulation owns the world state and the tick; it feeds this crate
//! through [`host::RosterProvider`] plus connect/disconnect notifications,
//! and everything is wired together by [`plugin::VoicePlugin`].

pub mod config;
pub mod host;
pub mod plugin;
pub mod position;
pub mod proximity;
pub mod session;
pub mod status;
pub mod sync;
pub mod util;
