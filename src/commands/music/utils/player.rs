//! Decides what plays next in each guild.
//!
//! The [`Player`] owns the queue registry and a handle to the playback engine.
//! It reacts to engine events (a track ending or starting) and exposes the
//! operations the slash commands need. Every decision that reads and then
//! changes a guild's queue holds that queue's lock until the engine has been
//! told what to play, so a command and a track end for the same guild are
//! applied one after the other, never interleaved.
//!
//! Events can still arrive late: a track may end on its own while a command
//! is replacing it. Each start is tagged with a [`PlaybackId`] recorded in the
//! queue, and events for any other id are ignored.

use serenity::model::id::GuildId;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, warn};

use super::engine::{EndReason, PlaybackEngine, PlaybackId, PlayerEvent, TrackEnd};
use super::music_manager::MusicResult;
use super::queue::QueueMode;
use super::queue_manager::QueueManager;
use super::track::Track;

/// What the player did in response to a track ending
#[derive(Debug, Clone, PartialEq)]
pub enum Continuation {
    /// The end reason does not allow advancing, or the track was already
    /// replaced; nothing changed.
    Ignored,
    /// The engine was told to play this track.
    Playing(Track),
    /// The engine rejected this track; the guild is now idle.
    PlaybackFailed(Track),
    /// Nothing left to play; the guild is now idle.
    Idle,
}

/// Result of adding tracks through [`Player::enqueue`]
#[derive(Debug, Clone, PartialEq)]
pub struct Enqueued {
    /// Track that started playing right away, if the guild was silent
    pub started: Option<Track>,
    /// How many of the new tracks are waiting in the queue
    pub queued: usize,
    /// 1-based queue position of the first waiting new track
    pub position: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipOutcome {
    /// Landed on this track and started it.
    Playing(Track),
    /// Skipped past the end of the queue; playback stopped.
    QueueExhausted,
}

pub struct Player {
    queues: QueueManager,
    engine: Arc<dyn PlaybackEngine>,
}

impl Player {
    pub fn new(queues: QueueManager, engine: Arc<dyn PlaybackEngine>) -> Self {
        Self { queues, engine }
    }

    pub fn queues(&self) -> &QueueManager {
        &self.queues
    }

    pub fn engine(&self) -> &Arc<dyn PlaybackEngine> {
        &self.engine
    }

    /// Consume engine events until the sending side is dropped
    pub async fn run(self: Arc<Self>, mut events: UnboundedReceiver<PlayerEvent>) {
        info!("Player event loop started");
        while let Some(event) = events.recv().await {
            match event {
                PlayerEvent::TrackStarted { guild_id, playback } => {
                    self.on_track_start(guild_id, playback).await;
                }
                PlayerEvent::TrackEnded(end) => {
                    let continuation = self.on_track_end(end).await;
                    debug!("Track end handled: {:?}", continuation);
                }
            }
        }
        info!("Player event loop finished");
    }

    /// A track began playing, so the guild is no longer idle
    pub async fn on_track_start(&self, guild_id: GuildId, playback: PlaybackId) {
        let Some(handle) = self.queues.existing(guild_id) else {
            return;
        };
        let queue = handle.lock().await;

        if !queue.is_current(playback) {
            debug!(
                "Start of {} in guild {} is outdated, ignoring",
                playback, guild_id
            );
            return;
        }
        if self.queues.idle().clear(guild_id) {
            info!("Resetting idle timeout for guild {}", guild_id);
        }
    }

    /// Pick and start the successor of a track that just ended
    pub async fn on_track_end(&self, event: TrackEnd) -> Continuation {
        let TrackEnd {
            guild_id,
            playback,
            track,
            reason,
        } = event;

        if !reason.may_start_next() {
            debug!(
                "Track '{}' in guild {} ended ({}), not advancing",
                track.title, guild_id, reason
            );
            return Continuation::Ignored;
        }

        // A guild without a queue behaves like an empty normal-mode one
        let Some(handle) = self.queues.existing(guild_id) else {
            self.queues.get(guild_id);
            info!(
                "No queue for guild {} after '{}' ended, guild is now idle",
                guild_id, track.title
            );
            self.queues.idle().mark_idle(guild_id);
            return Continuation::Idle;
        };
        let mut queue = handle.lock().await;

        if !queue.is_current(playback) {
            debug!(
                "Track '{}' ({}) in guild {} was already replaced, not advancing",
                track.title, playback, guild_id
            );
            return Continuation::Ignored;
        }

        info!(
            "Track '{}' ended in guild {} ({})",
            track.title, guild_id, reason
        );

        // A track that failed to load would fail again if repeated
        let mode = match reason {
            EndReason::LoadFailed => QueueMode::Normal,
            _ => queue.mode(),
        };

        let next = match mode {
            QueueMode::Normal => queue.next(),
            QueueMode::RepeatTrack => Some(track),
            QueueMode::RepeatQueue => queue.rotate(track),
        };

        let Some(next) = next else {
            info!(
                "No next track available, guild {} is now idle",
                guild_id
            );
            queue.end_playback();
            self.queues.idle().mark_idle(guild_id);
            return Continuation::Idle;
        };

        let id = queue.start_playback();
        match self.engine.play(guild_id, id, next.clone()).await {
            Ok(()) => {
                self.queues.idle().clear(guild_id);
                info!("Playing '{}' in guild {}", next.title, guild_id);
                Continuation::Playing(next)
            }
            Err(e) => {
                error!(
                    "Error starting '{}' in guild {}: {}",
                    next.title, guild_id, e
                );
                queue.end_playback();
                self.queues.idle().mark_idle(guild_id);
                Continuation::PlaybackFailed(next)
            }
        }
    }

    /// Add tracks to the guild's queue, starting playback if nothing is playing
    pub async fn enqueue(&self, guild_id: GuildId, tracks: Vec<Track>) -> MusicResult<Enqueued> {
        let handle = self.queues.get(guild_id);
        let mut queue = handle.lock().await;

        let before = queue.len();
        let count = tracks.len();
        queue.add(tracks)?;

        let started = if self.engine.current_track(guild_id).await.is_none() {
            queue.next()
        } else {
            None
        };

        if let Some(track) = &started {
            let id = queue.start_playback();
            if let Err(e) = self.engine.play(guild_id, id, track.clone()).await {
                error!(
                    "Error starting '{}' in guild {}: {}, putting it back in the queue",
                    track.title, guild_id, e
                );
                queue.end_playback();
                queue.push_front(track.clone());
                self.queues.idle().mark_idle(guild_id);
                return Err(e);
            }
            self.queues.idle().clear(guild_id);
            info!("Started '{}' in guild {}", track.title, guild_id);
        }

        let queued = match started {
            Some(_) if before == 0 => count.saturating_sub(1),
            _ => count,
        };
        let position = (queued > 0).then(|| queue.len() - queued + 1);

        debug!(
            "Queued {} track(s) for guild {} (queue length {})",
            queued,
            guild_id,
            queue.len()
        );

        Ok(Enqueued {
            started,
            queued,
            position,
        })
    }

    /// Skip ahead `amount` tracks, replacing the current one
    pub async fn skip(&self, guild_id: GuildId, amount: usize) -> MusicResult<SkipOutcome> {
        let handle = self.queues.get(guild_id);
        let mut queue = handle.lock().await;

        match queue.skip(amount) {
            Some(track) => {
                let id = queue.start_playback();
                if let Err(e) = self.engine.play(guild_id, id, track.clone()).await {
                    queue.end_playback();
                    self.queues.idle().mark_idle(guild_id);
                    return Err(e);
                }
                self.queues.idle().clear(guild_id);
                info!(
                    "Skipped {} track(s) in guild {}, now playing '{}'",
                    amount, guild_id, track.title
                );
                Ok(SkipOutcome::Playing(track))
            }
            None => {
                self.engine.stop(guild_id).await?;
                queue.end_playback();
                self.queues.idle().mark_idle(guild_id);
                info!(
                    "Skipped {} track(s) in guild {}, but no next track available",
                    amount, guild_id
                );
                Ok(SkipOutcome::QueueExhausted)
            }
        }
    }

    /// Stop the current track and keep the queue
    pub async fn stop(&self, guild_id: GuildId) -> MusicResult<()> {
        let handle = self.queues.get(guild_id);
        let mut queue = handle.lock().await;

        self.engine.stop(guild_id).await?;
        queue.end_playback();
        self.queues.idle().mark_idle(guild_id);
        Ok(())
    }

    pub async fn toggle_pause(&self, guild_id: GuildId) -> MusicResult<bool> {
        self.engine.toggle_pause(guild_id).await
    }

    pub async fn set_volume(&self, guild_id: GuildId, percent: u8) -> MusicResult<()> {
        self.engine.set_volume(guild_id, percent).await
    }

    /// Jump to `position` in the current track
    pub async fn seek(&self, guild_id: GuildId, position: Duration) -> MusicResult<Duration> {
        let reached = self.engine.seek(guild_id, position).await?;
        debug!("Seeked to {:?} in guild {}", reached, guild_id);
        Ok(reached)
    }

    pub async fn now_playing(&self, guild_id: GuildId) -> Option<Track> {
        self.engine.current_track(guild_id).await
    }

    /// Leave the voice channel and forget the guild's queue
    pub async fn leave(&self, guild_id: GuildId) -> MusicResult<()> {
        let handle = self.queues.get(guild_id);
        let _queue = handle.lock().await;

        let result = self.engine.leave(guild_id).await;
        self.queues.delete(guild_id);
        result
    }

    /// The bot's voice connection was closed from outside. Drops the engine's
    /// state for the guild along with its queue, so the next `/play` rejoins.
    pub async fn disconnected(&self, guild_id: GuildId) {
        let handle = self.queues.get(guild_id);
        let _queue = handle.lock().await;

        self.engine.release(guild_id).await;
        self.queues.delete(guild_id);
        info!("Dropped voice state and queue for guild {}", guild_id);
    }

    /// Disconnect every guild that has been idle for at least `timeout`
    pub async fn sweep_idle(&self, timeout: Duration, now: Instant) -> Vec<GuildId> {
        let mut disconnected = Vec::new();

        for guild_id in self.queues.idle().expired(timeout, now) {
            let handle = self.queues.get(guild_id);
            let _queue = handle.lock().await;

            // A command may have started a track while we waited for the lock
            if !self.queues.idle().is_expired(guild_id, timeout, now) {
                debug!("Guild {} is active again, not disconnecting", guild_id);
                continue;
            }

            if let Err(e) = self.engine.leave(guild_id).await {
                warn!("Error leaving voice in guild {}: {}", guild_id, e);
            }
            self.queues.delete(guild_id);
            info!(
                "Guild {} has been idle for more than {:?}, disconnected",
                guild_id, timeout
            );
            disconnected.push(guild_id);
        }

        disconnected
    }

    /// Clear every queue and leave every voice channel
    pub async fn shutdown(&self) {
        info!("Shutting down player");
        self.queues.clear_all().await;
        debug!("Queues cleared");

        for guild_id in self.queues.guilds() {
            if self.engine.is_connected(guild_id) {
                if let Err(e) = self.engine.leave(guild_id).await {
                    warn!("Error leaving voice in guild {}: {}", guild_id, e);
                }
            }
            self.queues.delete(guild_id);
        }
        info!("Player shutdown complete");
    }
}
