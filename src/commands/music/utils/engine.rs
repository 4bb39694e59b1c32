//! The seam between the queue logic and whatever actually produces audio.

use serenity::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::music_manager::MusicResult;
use super::track::Track;

/// Why a track stopped playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The track played to its end.
    Finished,
    /// The track failed to load or errored mid-stream.
    LoadFailed,
    /// Playback was stopped by a command.
    Stopped,
    /// Another track was started in its place.
    Replaced,
    /// The player was torn down (e.g. the bot left the channel).
    Cleanup,
}

impl EndReason {
    /// Whether the player should pick a successor after a track ends this way
    pub fn may_start_next(&self) -> bool {
        matches!(self, Self::Finished | Self::LoadFailed)
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Finished => "finished",
            Self::LoadFailed => "load failed",
            Self::Stopped => "stopped",
            Self::Replaced => "replaced",
            Self::Cleanup => "cleanup",
        };
        f.write_str(reason)
    }
}

/// Identifies one start of a track.
///
/// Every call to [`PlaybackEngine::play`] gets a fresh id, unique for the
/// lifetime of the process, so an end event can be matched against what the
/// guild is playing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackId(u64);

static NEXT_PLAYBACK: AtomicU64 = AtomicU64::new(1);

impl PlaybackId {
    pub fn next() -> Self {
        Self(NEXT_PLAYBACK.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PlaybackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A track stopped playing in a guild
#[derive(Debug, Clone, PartialEq)]
pub struct TrackEnd {
    pub guild_id: GuildId,
    pub playback: PlaybackId,
    pub track: Track,
    pub reason: EndReason,
}

/// Where a plain search query is looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, poise::ChoiceParameter)]
pub enum SearchSource {
    #[default]
    #[name = "YouTube"]
    YouTube,
    #[name = "SoundCloud"]
    SoundCloud,
}

/// Notifications the engine delivers to the player, in the order they happened
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    TrackStarted {
        guild_id: GuildId,
        playback: PlaybackId,
    },
    TrackEnded(TrackEnd),
}

/// The external audio engine: voice connections, playback and track lookup.
///
/// Implementations must report every track end as a [`PlayerEvent::TrackEnded`];
/// tracks cut short by `play` or `stop` carry a reason whose
/// [`EndReason::may_start_next`] is false.
#[async_trait]
pub trait PlaybackEngine: Send + Sync {
    /// Start `track` now, replacing whatever is playing in the guild.
    /// The end event of this track carries `playback`.
    async fn play(
        &self,
        guild_id: GuildId,
        playback: PlaybackId,
        track: Track,
    ) -> MusicResult<()>;

    /// Stop the current track without starting another
    async fn stop(&self, guild_id: GuildId) -> MusicResult<()>;

    /// Pause or resume. Returns `true` when playback is now paused.
    async fn toggle_pause(&self, guild_id: GuildId) -> MusicResult<bool>;

    /// Set the volume as a percentage, 100 being unchanged
    async fn set_volume(&self, guild_id: GuildId, percent: u8) -> MusicResult<()>;

    /// The track currently playing in the guild, if any
    async fn current_track(&self, guild_id: GuildId) -> Option<Track>;

    /// Jump to `position` in the current track. Returns the position reached.
    async fn seek(&self, guild_id: GuildId, position: Duration) -> MusicResult<Duration>;

    /// Resolve a URL or search query into playable tracks
    async fn resolve(
        &self,
        query: &str,
        requested_by: &str,
        source: SearchSource,
    ) -> MusicResult<Vec<Track>>;

    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> MusicResult<()>;

    async fn leave(&self, guild_id: GuildId) -> MusicResult<()>;

    /// Drop everything held for a guild whose voice connection was closed
    /// from outside, e.g. the bot was kicked or the channel deleted
    async fn release(&self, guild_id: GuildId);

    fn is_connected(&self, guild_id: GuildId) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(EndReason::Finished, true)]
    #[test_case(EndReason::LoadFailed, true)]
    #[test_case(EndReason::Stopped, false)]
    #[test_case(EndReason::Replaced, false)]
    #[test_case(EndReason::Cleanup, false)]
    fn test_may_start_next(reason: EndReason, expected: bool) {
        assert_eq!(reason.may_start_next(), expected);
    }

    #[test]
    fn test_playback_ids_are_unique() {
        let first = PlaybackId::next();
        let second = PlaybackId::next();
        assert_ne!(first, second);
    }
}
