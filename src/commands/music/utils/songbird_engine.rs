//! [`PlaybackEngine`] backed by songbird and yt-dlp.

use dashmap::DashMap;
use serenity::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use songbird::input::{Compose, HttpRequest, Input, YoutubeDl};
use songbird::tracks::{PlayMode, TrackHandle};
use songbird::{Event, EventContext, EventHandler, Songbird, TrackEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};
use url::Url;

use super::engine::{
    EndReason, PlaybackEngine, PlaybackId, PlayerEvent, SearchSource, TrackEnd,
};
use super::music_manager::{MusicError, MusicResult};
use super::track::{Track, TrackSource};

/// State shared between a playing track and its event notifiers
struct TrackSlot {
    playback: PlaybackId,
    track: Track,
    // Set before the engine itself stops the track
    stop_reason: OnceLock<EndReason>,
    ended: AtomicBool,
}

struct NowPlaying {
    handle: TrackHandle,
    slot: Arc<TrackSlot>,
}

type NowPlayingMap = Arc<DashMap<GuildId, NowPlaying>>;

pub struct SongbirdEngine {
    songbird: Arc<Songbird>,
    http: reqwest::Client,
    events: UnboundedSender<PlayerEvent>,
    playing: NowPlayingMap,
    // Volume per guild, 1.0 being unchanged
    volumes: DashMap<GuildId, f32>,
}

impl SongbirdEngine {
    pub fn new(
        songbird: Arc<Songbird>,
        http: reqwest::Client,
        events: UnboundedSender<PlayerEvent>,
    ) -> Self {
        Self {
            songbird,
            http,
            events,
            playing: Arc::new(DashMap::new()),
            volumes: DashMap::new(),
        }
    }

    fn input_for(&self, track: &Track, url: String) -> Input {
        match track.source {
            TrackSource::Http => HttpRequest::new(self.http.clone(), url).into(),
            _ => YoutubeDl::new(self.http.clone(), url).into(),
        }
    }

    /// Stop the current track of a guild, tagging why
    fn stop_current(&self, guild_id: GuildId, reason: EndReason) -> MusicResult<()> {
        if let Some((_, now)) = self.playing.remove(&guild_id) {
            let _ = now.slot.stop_reason.set(reason);
            now.handle
                .stop()
                .map_err(|e| MusicError::Playback(e.to_string()))?;
            debug!(
                "Stopped '{}' in guild {} ({})",
                now.slot.track.title, guild_id, reason
            );
        }
        Ok(())
    }

    fn current_handle(&self, guild_id: GuildId) -> MusicResult<TrackHandle> {
        self.playing
            .get(&guild_id)
            .map(|now| now.handle.clone())
            .ok_or(MusicError::NothingPlaying)
    }
}

#[async_trait]
impl PlaybackEngine for SongbirdEngine {
    async fn play(
        &self,
        guild_id: GuildId,
        playback: PlaybackId,
        track: Track,
    ) -> MusicResult<()> {
        let url = track
            .url
            .clone()
            .ok_or_else(|| MusicError::Playback(format!("'{}' has no URL", track.title)))?;
        let call = self
            .songbird
            .get(guild_id)
            .ok_or(MusicError::NotConnected)?;

        let input = self.input_for(&track, url);
        let volume = self.volumes.get(&guild_id).map(|v| *v).unwrap_or(1.0);

        let mut handler = call.lock().await;
        self.stop_current(guild_id, EndReason::Replaced)?;

        let handle = handler.play_input(input);
        if let Err(e) = handle.set_volume(volume) {
            warn!("Failed to set volume for guild {}: {}", guild_id, e);
        }

        let slot = Arc::new(TrackSlot {
            playback,
            track,
            stop_reason: OnceLock::new(),
            ended: AtomicBool::new(false),
        });

        let ended = TrackEndNotifier {
            guild_id,
            slot: slot.clone(),
            playing: self.playing.clone(),
            events: self.events.clone(),
        };
        let started = TrackStartNotifier {
            guild_id,
            playback,
            events: self.events.clone(),
        };

        for (event, result) in [
            (
                TrackEvent::End,
                handle.add_event(Event::Track(TrackEvent::End), ended.clone()),
            ),
            (
                TrackEvent::Error,
                handle.add_event(Event::Track(TrackEvent::Error), ended),
            ),
            (
                TrackEvent::Play,
                handle.add_event(Event::Track(TrackEvent::Play), started),
            ),
        ] {
            if let Err(e) = result {
                error!(
                    "Failed to register {:?} handler in guild {}: {}",
                    event, guild_id, e
                );
            }
        }

        info!(
            "Playing '{}' ({}) in guild {}",
            slot.track.title, playback, guild_id
        );
        self.playing.insert(guild_id, NowPlaying { handle, slot });
        Ok(())
    }

    async fn stop(&self, guild_id: GuildId) -> MusicResult<()> {
        self.stop_current(guild_id, EndReason::Stopped)
    }

    async fn toggle_pause(&self, guild_id: GuildId) -> MusicResult<bool> {
        let handle = self.current_handle(guild_id)?;
        let info = handle
            .get_info()
            .await
            .map_err(|e| MusicError::Playback(e.to_string()))?;

        match info.playing {
            PlayMode::Play => {
                handle
                    .pause()
                    .map_err(|e| MusicError::Playback(e.to_string()))?;
                Ok(true)
            }
            PlayMode::Pause => {
                handle
                    .play()
                    .map_err(|e| MusicError::Playback(e.to_string()))?;
                Ok(false)
            }
            _ => Err(MusicError::Playback(
                "The track is not in a pausable state".to_string(),
            )),
        }
    }

    async fn set_volume(&self, guild_id: GuildId, percent: u8) -> MusicResult<()> {
        let volume = f32::from(percent) / 100.0;
        self.volumes.insert(guild_id, volume);

        if let Ok(handle) = self.current_handle(guild_id) {
            handle
                .set_volume(volume)
                .map_err(|e| MusicError::Playback(e.to_string()))?;
        }
        debug!("Volume for guild {} set to {}%", guild_id, percent);
        Ok(())
    }

    async fn current_track(&self, guild_id: GuildId) -> Option<Track> {
        self.playing
            .get(&guild_id)
            .map(|now| now.slot.track.clone())
    }

    async fn seek(&self, guild_id: GuildId, position: Duration) -> MusicResult<Duration> {
        let handle = self.current_handle(guild_id)?;
        handle
            .seek_async(position)
            .await
            .map_err(|e| MusicError::Playback(e.to_string()))
    }

    async fn resolve(
        &self,
        query: &str,
        requested_by: &str,
        source: SearchSource,
    ) -> MusicResult<Vec<Track>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(MusicError::NothingFound(query.to_string()));
        }

        let is_url = Url::parse(query).is_ok_and(|url| matches!(url.scheme(), "http" | "https"));
        let mut lookup = match (is_url, source) {
            (true, _) => YoutubeDl::new(self.http.clone(), query.to_string()),
            (false, SearchSource::YouTube) => {
                YoutubeDl::new_search(self.http.clone(), query.to_string())
            }
            // yt-dlp takes a search prefix in place of a URL
            (false, SearchSource::SoundCloud) => {
                YoutubeDl::new(self.http.clone(), format!("scsearch1:{}", query))
            }
        };

        info!("Resolving '{}' on {:?} for {}", query, source, requested_by);
        let metadata = match lookup.aux_metadata().await {
            Ok(metadata) => metadata,
            // yt-dlp has no extractor for plain audio files
            Err(e) if is_url && TrackSource::from_url(query) == TrackSource::Http => {
                debug!("No metadata for {}: {}, using the URL as title", query, e);
                return Ok(vec![Track::new(query, query).with_requester(requested_by)]);
            }
            Err(e) => {
                error!("Failed to resolve '{}': {}", query, e);
                return Err(MusicError::AudioSourceError(e.to_string()));
            }
        };

        let mut track = Track::from_aux_metadata(metadata, requested_by);
        if track.url.is_none() {
            if !is_url {
                return Err(MusicError::NothingFound(query.to_string()));
            }
            track.url = Some(query.to_string());
            track.source = TrackSource::from_url(query);
        }

        debug!("Resolved '{}' to '{}'", query, track.title);
        Ok(vec![track])
    }

    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> MusicResult<()> {
        self.songbird
            .join(guild_id, channel_id)
            .await
            .map_err(|e| MusicError::JoinError(e.to_string()))?;
        info!("Joined channel {} in guild {}", channel_id, guild_id);
        Ok(())
    }

    async fn leave(&self, guild_id: GuildId) -> MusicResult<()> {
        if self.songbird.get(guild_id).is_none() {
            return Err(MusicError::NotConnected);
        }

        if let Some((_, now)) = self.playing.remove(&guild_id) {
            let _ = now.slot.stop_reason.set(EndReason::Cleanup);
        }
        self.volumes.remove(&guild_id);

        self.songbird
            .remove(guild_id)
            .await
            .map_err(|e| MusicError::LeaveError(e.to_string()))?;
        info!("Left voice channel in guild {}", guild_id);
        Ok(())
    }

    async fn release(&self, guild_id: GuildId) {
        if let Some((_, now)) = self.playing.remove(&guild_id) {
            let _ = now.slot.stop_reason.set(EndReason::Cleanup);
            if let Err(e) = now.handle.stop() {
                debug!("Track in guild {} was already gone: {}", guild_id, e);
            }
        }
        self.volumes.remove(&guild_id);

        if self.songbird.get(guild_id).is_some() {
            if let Err(e) = self.songbird.remove(guild_id).await {
                warn!("Failed to drop voice call for guild {}: {}", guild_id, e);
            }
        }
        info!("Released voice state for guild {}", guild_id);
    }

    fn is_connected(&self, guild_id: GuildId) -> bool {
        self.songbird.get(guild_id).is_some()
    }
}

/// Map songbird's final play state to why the track ended
fn end_reason(mode: &PlayMode, stopped_by_engine: Option<EndReason>) -> EndReason {
    match mode {
        PlayMode::End => EndReason::Finished,
        PlayMode::Errored(_) => EndReason::LoadFailed,
        PlayMode::Stop => stopped_by_engine.unwrap_or(EndReason::Cleanup),
        _ => EndReason::Cleanup,
    }
}

/// Reports a track end to the player, once per track
#[derive(Clone)]
struct TrackEndNotifier {
    guild_id: GuildId,
    slot: Arc<TrackSlot>,
    playing: NowPlayingMap,
    events: UnboundedSender<PlayerEvent>,
}

#[async_trait]
impl EventHandler for TrackEndNotifier {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        let EventContext::Track(states) = ctx else {
            return None;
        };
        let (state, handle) = states.first()?;

        if self.slot.ended.swap(true, Ordering::SeqCst) {
            return None;
        }

        if let PlayMode::Errored(e) = &state.playing {
            warn!(
                "Track '{}' errored in guild {}: {:?}",
                self.slot.track.title, self.guild_id, e
            );
        }
        let reason = end_reason(&state.playing, self.slot.stop_reason.get().copied());

        self.playing
            .remove_if(&self.guild_id, |_, now| now.handle.uuid() == handle.uuid());

        let event = PlayerEvent::TrackEnded(TrackEnd {
            guild_id: self.guild_id,
            playback: self.slot.playback,
            track: self.slot.track.clone(),
            reason,
        });
        if self.events.send(event).is_err() {
            warn!("Player event loop is gone, dropping track end for guild {}", self.guild_id);
        }
        None
    }
}

struct TrackStartNotifier {
    guild_id: GuildId,
    playback: PlaybackId,
    events: UnboundedSender<PlayerEvent>,
}

#[async_trait]
impl EventHandler for TrackStartNotifier {
    async fn act(&self, _ctx: &EventContext<'_>) -> Option<Event> {
        let _ = self.events.send(PlayerEvent::TrackStarted {
            guild_id: self.guild_id,
            playback: self.playback,
        });
        None
    }
}
