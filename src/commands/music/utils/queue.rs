//! The per-guild queue of pending tracks and its repeat mode.

use rand::seq::SliceRandom;
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::engine::PlaybackId;
use super::music_manager::{MusicError, MusicResult};
use super::track::Track;

/// Default upper bound on queued tracks per guild.
pub const DEFAULT_QUEUE_CAPACITY: usize = 500;

/// How the player picks the next track when one finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, poise::ChoiceParameter)]
pub enum QueueMode {
    /// Play the queue front to back, then go idle.
    #[default]
    #[name = "normal"]
    Normal,
    /// Replay the finished track forever; the queue is untouched.
    #[name = "repeat-track"]
    RepeatTrack,
    /// Append the finished track to the back, so the queue loops.
    #[name = "repeat-queue"]
    RepeatQueue,
}

impl QueueMode {
    pub const ALL: [QueueMode; 3] = [Self::Normal, Self::RepeatTrack, Self::RepeatQueue];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::RepeatTrack => "repeat-track",
            Self::RepeatQueue => "repeat-queue",
        }
    }
}

impl fmt::Display for QueueMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueueMode {
    type Err = MusicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "normal" => Ok(Self::Normal),
            "repeat-track" | "track" => Ok(Self::RepeatTrack),
            "repeat-queue" | "queue" => Ok(Self::RepeatQueue),
            _ => Err(MusicError::InvalidQueueMode(s.to_string())),
        }
    }
}

/// Ordered list of tracks waiting to be played for a single guild.
///
/// The currently playing track is never stored here; it is removed from the
/// queue the moment it starts and lives only in the playback engine. The
/// queue only remembers the [`PlaybackId`] of that start, so late end events
/// for older tracks can be told apart.
#[derive(Debug, Clone)]
pub struct Queue {
    tracks: VecDeque<Track>,
    mode: QueueMode,
    capacity: usize,
    playback: Option<PlaybackId>,
}

impl Default for Queue {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }
}

impl Queue {
    /// Create an empty, normal-mode queue holding at most `capacity` tracks
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tracks: VecDeque::new(),
            mode: QueueMode::Normal,
            capacity,
            playback: None,
        }
    }

    pub fn mode(&self) -> QueueMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: QueueMode) {
        self.mode = mode;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Tracks in play order
    pub fn tracks(&self) -> impl ExactSizeIterator<Item = &Track> {
        self.tracks.iter()
    }

    /// Sum of the known durations of the queued tracks
    pub fn total_duration(&self) -> Duration {
        self.tracks.iter().filter_map(|track| track.duration).sum()
    }

    /// Append tracks to the end of the queue.
    ///
    /// The batch is rejected as a whole when it would push the queue past its
    /// capacity, leaving the queue unchanged.
    pub fn add(&mut self, tracks: impl IntoIterator<Item = Track>) -> MusicResult<()> {
        let tracks: Vec<Track> = tracks.into_iter().collect();
        if self.tracks.len() + tracks.len() > self.capacity {
            return Err(MusicError::QueueFull {
                capacity: self.capacity,
            });
        }
        self.tracks.extend(tracks);
        Ok(())
    }

    /// Append a single track
    pub fn push(&mut self, track: Track) -> MusicResult<()> {
        self.add([track])
    }

    /// Put a track back at the front, e.g. after it failed to start.
    /// Like [`Queue::rotate`] this ignores the capacity.
    pub fn push_front(&mut self, track: Track) {
        self.tracks.push_front(track);
    }

    /// Remove and return the first track
    pub fn next(&mut self) -> Option<Track> {
        self.tracks.pop_front()
    }

    /// Drop the first `n - 1` tracks and return the `n`-th.
    ///
    /// `n` is treated as at least 1. When fewer than `n` tracks are queued the
    /// queue is emptied and nothing is returned.
    pub fn skip(&mut self, n: usize) -> Option<Track> {
        let n = n.max(1);
        if n > self.tracks.len() {
            self.tracks.clear();
            return None;
        }
        self.tracks.drain(..n - 1);
        self.tracks.pop_front()
    }

    /// Move `finished` to the back of the queue and return the new front.
    ///
    /// Used for repeat-queue advancement. The net length is unchanged, so the
    /// capacity is not checked.
    pub fn rotate(&mut self, finished: Track) -> Option<Track> {
        self.tracks.push_back(finished);
        self.tracks.pop_front()
    }

    /// Remove the track at a 0-based position
    pub fn remove(&mut self, position: usize) -> Option<Track> {
        self.tracks.remove(position)
    }

    /// Randomly reorder the queued tracks
    pub fn shuffle(&mut self) {
        if self.tracks.len() > 1 {
            self.tracks.make_contiguous().shuffle(&mut rand::rng());
        }
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    /// Record that a new track is about to start and return its id
    pub fn start_playback(&mut self) -> PlaybackId {
        let id = PlaybackId::next();
        self.playback = Some(id);
        id
    }

    /// Record that nothing is playing any more
    pub fn end_playback(&mut self) {
        self.playback = None;
    }

    /// Id of the track the guild is playing, if any
    pub fn playback(&self) -> Option<PlaybackId> {
        self.playback
    }

    /// Whether `id` is the track the guild is playing right now
    pub fn is_current(&self, id: PlaybackId) -> bool {
        self.playback == Some(id)
    }
}
