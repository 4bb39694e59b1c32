use poise::serenity_prelude::{ChannelId, Context, GuildId, UserId};
use thiserror::Error;

/// Errors that can occur during music operations
#[derive(Error, Debug)]
pub enum MusicError {
    #[error("Not in a guild")]
    NotInGuild,

    #[error("Failed to join voice channel: {0}")]
    JoinError(String),

    #[error("Failed to leave voice channel: {0}")]
    LeaveError(String),

    #[error("Not connected to a voice channel")]
    NotConnected,

    #[error("Nothing is playing")]
    NothingPlaying,

    #[error("Failed to get voice manager")]
    NoVoiceManager,

    #[error("User is not in a voice channel")]
    UserNotInVoiceChannel,

    #[error("Audio source error: {0}")]
    AudioSourceError(String),

    #[error("Nothing found for `{0}`")]
    NothingFound(String),

    #[error("The queue is full ({capacity} tracks)")]
    QueueFull { capacity: usize },

    #[error("Unknown queue mode `{0}` (expected normal, repeat-track or repeat-queue)")]
    InvalidQueueMode(String),

    #[error("Playback error: {0}")]
    Playback(String),
}

/// Result type for music operations
pub type MusicResult<T> = Result<T, MusicError>;

/// Voice-channel helpers that only need the gateway cache
pub struct MusicManager;

impl MusicManager {
    /// Get the voice channel ID that the user is currently in
    pub fn get_user_voice_channel(
        ctx: &Context,
        guild_id: GuildId,
        user_id: UserId,
    ) -> MusicResult<ChannelId> {
        let guild = ctx.cache.guild(guild_id).ok_or(MusicError::NotInGuild)?;

        let voice_state = guild
            .voice_states
            .get(&user_id)
            .ok_or(MusicError::UserNotInVoiceChannel)?;

        voice_state
            .channel_id
            .ok_or(MusicError::UserNotInVoiceChannel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_queue_full_message_names_capacity() {
        let err = MusicError::QueueFull { capacity: 500 };
        assert_eq!(err.to_string(), "The queue is full (500 tracks)");
    }

    #[test]
    fn test_invalid_mode_message_lists_choices() {
        let err = MusicError::InvalidQueueMode("loop".to_string());
        assert!(err.to_string().contains("repeat-track"));
        assert!(err.to_string().contains("`loop`"));
    }
}
