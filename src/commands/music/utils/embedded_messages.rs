use poise::CreateReply;
use poise::serenity_prelude::{ChannelId, CreateEmbed, GuildId};
use std::fmt::Display;
use std::time::Duration;

use super::{
    format_duration,
    music_manager::MusicError,
    player::{Enqueued, SkipOutcome},
    queue::QueueMode,
    track::Track,
};

const SUCCESS: u32 = 0x00ff00;
const FAILURE: u32 = 0xff0000;

/// How many upcoming tracks the queue embed lists
const QUEUE_PAGE: usize = 10;

fn duration_str(track: &Track) -> String {
    track
        .duration
        .map(format_duration)
        .unwrap_or_else(|| "Unknown duration".to_string())
}

fn success(title: &str, description: impl Into<String>) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title(title)
            .description(description)
            .color(SUCCESS),
    )
}

/// Create an embed for an error
pub fn error(message: impl Display) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("❌ Error")
            .description(message.to_string())
            .color(FAILURE),
    )
}

/// Create an embed for when a song is now playing
pub fn now_playing(track: &Track) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title("🎵 Now Playing")
        .description(track.markdown_link())
        .field("Duration", format!("`{}`", duration_str(track)), true)
        .color(SUCCESS);

    if let Some(requested_by) = &track.requested_by {
        embed = embed.field("Requested by", requested_by, true);
    }
    if let Some(thumbnail) = &track.thumbnail {
        embed = embed.thumbnail(thumbnail);
    }
    embed
}

/// Create an embed for when a song is added to the queue
pub fn added_to_queue(track: &Track, position: usize) -> CreateEmbed {
    CreateEmbed::new()
        .title("🎵 Added to Queue")
        .description(track.markdown_link())
        .field("Duration", format!("`{}`", duration_str(track)), true)
        .field("Position", format!("`#{}`", position), true)
        .color(SUCCESS)
}

/// Reply to a successful `/play`
pub fn enqueued(
    enqueued: &Enqueued,
    first_queued: Option<&Track>,
    queue_length: usize,
    total: Duration,
) -> CreateReply {
    let mut reply = CreateReply::default();

    if let Some(track) = &enqueued.started {
        reply = reply.embed(now_playing(track));
    }

    match (enqueued.queued, enqueued.position, first_queued) {
        (0, _, _) | (_, None, _) => {}
        (1, Some(position), Some(track)) => {
            reply = reply.embed(added_to_queue(track, position));
        }
        (count, Some(position), _) => {
            reply = reply.embed(
                CreateEmbed::new()
                    .title("🎵 Added to Queue")
                    .description(format!(
                        "Added `{}` tracks starting at position `#{}`",
                        count, position
                    ))
                    .color(SUCCESS),
            );
        }
    }

    if queue_length > 1 && total > Duration::ZERO {
        reply = reply.content(format!(
            "`{} tracks` • Total Length: `{}`",
            queue_length,
            format_duration(total)
        ));
    }
    reply
}

/// Create an embed for the music queue
pub fn music_queue<'a>(
    current: Option<&Track>,
    queue: impl ExactSizeIterator<Item = &'a Track>,
    mode: QueueMode,
    total: Duration,
) -> CreateEmbed {
    let mut description = String::new();

    match current {
        Some(track) => {
            description.push_str("**🎵 Now Playing**\n");
            description.push_str(&format!("**{}**\n\n", track.markdown_link()));
        }
        None => description.push_str("**🔇 Nothing playing**\n\n"),
    }

    let length = queue.len();
    if length == 0 {
        description.push_str("**📭 Queue is empty**");
    } else {
        description.push_str(&format!("**📋 Queue - {} tracks**\n", length));
        for (index, track) in queue.take(QUEUE_PAGE).enumerate() {
            description.push_str(&format!("`{}.` {}", index + 1, track.markdown_link()));
            if let Some(duration) = track.duration {
                description.push_str(&format!(" `{}`", format_duration(duration)));
            }
            description.push('\n');
        }
        if length > QUEUE_PAGE {
            description.push_str(&format!("*…and {} more*\n", length - QUEUE_PAGE));
        }
        if total > Duration::ZERO {
            description.push_str(&format!(
                "\n**⏱️ Total Duration:** `{}`",
                format_duration(total)
            ));
        }
    }

    CreateEmbed::new()
        .title("🎵 Music Queue")
        .description(description)
        .field("Mode", format!("`{}`", mode), true)
        .color(SUCCESS)
}

/// Create an embed for when a user is not connected to a voice channel
pub fn user_not_in_voice_channel(err: MusicError) -> CreateReply {
    CreateReply::default()
        .embed(
            CreateEmbed::new()
                .title("❌ Error")
                .description(format!("You need to be in a voice channel: {}", err))
                .color(FAILURE),
        )
        .ephemeral(true)
}

/// Create an embed for when the bot fails to join a voice channel
pub fn failed_to_join_voice_channel(err: MusicError) -> CreateReply {
    error(format!("Failed to join voice channel: {}", err))
}

/// Create an embed for when the bot fails to process an audio source
pub fn failed_to_process_audio_source(err: MusicError) -> CreateReply {
    error(format!("Failed to process audio source: {}", err))
}

pub fn joined(channel_id: ChannelId) -> CreateReply {
    success("🔊 Joined", format!("Connected to <#{}>", channel_id))
}

/// Create an embed for when a track is paused or resumed
pub fn pause_toggled(track: &Track, paused: bool) -> CreateReply {
    if paused {
        success("⏸️ Paused", format!("Paused {}", track.markdown_link()))
    } else {
        success("▶️ Resumed", format!("Resumed {}", track.markdown_link()))
    }
}

/// Create an embed for when no track is playing
pub fn no_track_playing() -> CreateReply {
    error("No track is currently playing")
}

/// Create an embed for when the bot leaves a voice channel
pub fn left_voice_channel() -> CreateReply {
    success(
        "👋 Left Voice Channel",
        "Successfully disconnected and cleared the queue",
    )
}

/// Create an embed for when the queue is empty
pub fn queue_is_empty() -> CreateReply {
    error("The queue is empty")
}

/// Create an embed for when a queue position is invalid
pub fn invalid_queue_position(queue_length: usize) -> CreateReply {
    error(format!(
        "Invalid position. The queue has {} tracks",
        queue_length
    ))
}

/// Create an embed for when a track is removed from the queue
pub fn track_removed(track: &Track, position: usize) -> CreateReply {
    success(
        "🗑️ Track Removed",
        format!(
            "Removed {} from position #{}",
            track.markdown_link(),
            position
        ),
    )
}

pub fn stopped() -> CreateReply {
    success("⏹️ Stopped", "Playback stopped, the queue was kept")
}

/// Create an embed for the result of a skip
pub fn skipped(outcome: &SkipOutcome) -> CreateReply {
    match outcome {
        SkipOutcome::Playing(track) => CreateReply::default().embed(
            now_playing(track).title("⏭️ Skipped, now playing"),
        ),
        SkipOutcome::QueueExhausted => success(
            "⏭️ Skipped",
            "Skipped past the end of the queue, nothing left to play",
        ),
    }
}

pub fn shuffled(queue_length: usize) -> CreateReply {
    success("🔀 Shuffled", format!("Shuffled `{}` tracks", queue_length))
}

pub fn cleared(removed: usize) -> CreateReply {
    success(
        "🧹 Queue Cleared",
        format!("Removed `{}` tracks from the queue", removed),
    )
}

pub fn mode_changed(mode: QueueMode) -> CreateReply {
    let description = match mode {
        QueueMode::Normal => "Playing the queue once, front to back",
        QueueMode::RepeatTrack => "Repeating the current track",
        QueueMode::RepeatQueue => "Looping the whole queue",
    };
    success(&format!("🔁 Queue mode: {}", mode), description)
}

pub fn seeked(track: &Track, position: Duration) -> CreateReply {
    success(
        "⏩ Seeked",
        format!(
            "Seeked to `{}` in {}",
            format_duration(position),
            track.markdown_link()
        ),
    )
}

pub fn volume_set(percent: u8) -> CreateReply {
    success("🔊 Volume", format!("Volume set to `{}%`", percent))
}

/// Per-guild line in the status embed
pub struct GuildStatus {
    pub guild_id: GuildId,
    pub queued: usize,
    pub mode: QueueMode,
    /// Time left before an idle guild is disconnected
    pub idle_remaining: Option<Duration>,
}

/// Create an embed describing every guild the player knows about
pub fn status(guilds: &[GuildStatus], idle_timeout: Duration) -> CreateReply {
    let mut embed = CreateEmbed::new()
        .title("📊 Player Status")
        .field("Guilds", format!("`{}`", guilds.len()), true)
        .field(
            "Idle timeout",
            format!("`{}`", format_duration(idle_timeout)),
            true,
        )
        .color(SUCCESS);

    let lines: Vec<String> = guilds
        .iter()
        .map(|status| {
            let idle = match status.idle_remaining {
                Some(remaining) => format!("idle, leaving in `{}`", format_duration(remaining)),
                None => "active".to_string(),
            };
            format!(
                "`{}` • {} queued • `{}` • {}",
                status.guild_id, status.queued, status.mode, idle
            )
        })
        .collect();

    if !lines.is_empty() {
        embed = embed.description(lines.join("\n"));
    }

    CreateReply::default().embed(embed).ephemeral(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn json(embed: &CreateEmbed) -> Value {
        serde_json::to_value(embed).unwrap()
    }

    fn track(name: &str) -> Track {
        Track::new(name, format!("https://youtu.be/{name}"))
    }

    #[test]
    fn test_now_playing_includes_requester() {
        let embed = now_playing(&track("song").with_requester("alice"));
        let value = json(&embed);

        assert_eq!(value["title"], "🎵 Now Playing");
        assert_eq!(value["description"], "[song](https://youtu.be/song)");
        assert_eq!(value["fields"][1]["value"], "alice");
    }

    #[test]
    fn test_queue_lists_first_page_only() {
        let tracks: Vec<Track> = (1..=12).map(|i| track(&i.to_string())).collect();

        let embed = music_queue(None, tracks.iter(), QueueMode::RepeatQueue, Duration::ZERO);
        let value = json(&embed);
        let description = value["description"].as_str().unwrap();

        assert!(description.contains("Queue - 12 tracks"));
        assert!(description.contains("`10.` [10]"));
        assert!(!description.contains("`11.`"));
        assert!(description.contains("and 2 more"));
        assert_eq!(value["fields"][0]["value"], "`repeat-queue`");
    }

    #[test]
    fn test_empty_queue_embed() {
        let embed = music_queue(
            Some(&track("a")),
            Vec::<Track>::new().iter(),
            QueueMode::Normal,
            Duration::ZERO,
        );
        let description = json(&embed)["description"].as_str().unwrap().to_string();

        assert!(description.contains("Now Playing"));
        assert!(description.contains("Queue is empty"));
    }
}
