//! Common test utilities, fixtures, and mocks
//! This module contains shared functionality used across the integration tests
#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;

use std::sync::Arc;

use rusty_tunes::commands::music::utils::{
    engine::{EndReason, PlaybackId, TrackEnd},
    player::Player,
    queue::QueueMode,
    queue_manager::QueueManager,
    track::Track,
};
use serenity::model::id::GuildId;

/// Common test setup and utilities
pub mod test_utils {
    use std::sync::Once;
    use tracing::Level;

    static INIT: Once = Once::new();

    /// Initialize tracing once per test binary
    pub fn init() {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_max_level(Level::DEBUG)
                .with_test_writer()
                .try_init();
        });
    }
}

/// Build a player around a mocked engine
pub fn player(engine: mocks::MockEngine) -> Arc<Player> {
    test_utils::init();
    Arc::new(Player::new(QueueManager::default(), Arc::new(engine)))
}

/// Put `tracks` in a guild's queue, set its mode and pretend the player
/// started a track. Returns the id of that track.
pub async fn seed(
    player: &Player,
    guild_id: GuildId,
    mode: QueueMode,
    tracks: Vec<Track>,
) -> PlaybackId {
    let handle = player.queues().get(guild_id);
    let mut queue = handle.lock().await;
    queue.set_mode(mode);
    queue.add(tracks).expect("queue has room");
    queue.start_playback()
}

/// Natural end of whatever the guild is playing right now
pub async fn finished(player: &Player, guild_id: GuildId, track: Track) -> TrackEnd {
    let playback = player
        .queues()
        .get(guild_id)
        .lock()
        .await
        .playback()
        .expect("guild is playing");
    TrackEnd {
        guild_id,
        playback,
        track,
        reason: EndReason::Finished,
    }
}

/// Titles waiting in a guild's queue, front first
pub async fn queued_titles(player: &Player, guild_id: GuildId) -> Vec<String> {
    let handle = player.queues().get(guild_id);
    let queue = handle.lock().await;
    queue.tracks().map(|track| track.title.clone()).collect()
}
