//! Mock implementations for the playback engine

use async_trait::async_trait;
use mockall::mock;
use rusty_tunes::commands::music::utils::{
    engine::{EndReason, PlaybackEngine, PlaybackId, PlayerEvent, SearchSource, TrackEnd},
    music_manager::MusicResult,
    track::Track,
};
use serenity::model::id::{ChannelId, GuildId};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

mock! {
    pub Engine {}

    #[async_trait]
    impl PlaybackEngine for Engine {
        async fn play(&self, guild_id: GuildId, playback: PlaybackId, track: Track) -> MusicResult<()>;
        async fn stop(&self, guild_id: GuildId) -> MusicResult<()>;
        async fn toggle_pause(&self, guild_id: GuildId) -> MusicResult<bool>;
        async fn set_volume(&self, guild_id: GuildId, percent: u8) -> MusicResult<()>;
        async fn current_track(&self, guild_id: GuildId) -> Option<Track>;
        async fn seek(&self, guild_id: GuildId, position: Duration) -> MusicResult<Duration>;
        async fn resolve(&self, query: &str, requested_by: &str, source: SearchSource) -> MusicResult<Vec<Track>>;
        async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> MusicResult<()>;
        async fn leave(&self, guild_id: GuildId) -> MusicResult<()>;
        async fn release(&self, guild_id: GuildId);
        fn is_connected(&self, guild_id: GuildId) -> bool;
    }
}

/// Every `play` call, in order, as (guild, title)
pub type PlayLog = Arc<Mutex<Vec<(GuildId, String)>>>;

/// An engine that accepts every `play` and records it
pub fn recording_engine() -> (MockEngine, PlayLog) {
    let log = PlayLog::default();
    let mut engine = MockEngine::new();

    let recorder = log.clone();
    engine.expect_play().returning(move |guild_id, _, track| {
        recorder.lock().unwrap().push((guild_id, track.title));
        Ok(())
    });

    (engine, log)
}

/// An engine whose tracks all end as soon as they start, reporting the end
/// on `events` the way the real engine does
pub fn finishing_engine(events: UnboundedSender<PlayerEvent>) -> (MockEngine, PlayLog) {
    let log = PlayLog::default();
    let mut engine = MockEngine::new();

    let recorder = log.clone();
    engine
        .expect_play()
        .returning(move |guild_id, playback, track| {
            recorder.lock().unwrap().push((guild_id, track.title.clone()));
            let _ = events.send(PlayerEvent::TrackStarted { guild_id, playback });
            let _ = events.send(PlayerEvent::TrackEnded(TrackEnd {
                guild_id,
                playback,
                track,
                reason: EndReason::Finished,
            }));
            Ok(())
        });

    (engine, log)
}

/// Titles played in one guild, in order
pub fn played(log: &PlayLog, guild_id: GuildId) -> Vec<String> {
    log.lock()
        .unwrap()
        .iter()
        .filter(|(guild, _)| *guild == guild_id)
        .map(|(_, title)| title.clone())
        .collect()
}
