use super::*;
use crate::commands::music::utils::{
    embedded_messages,
    engine::SearchSource,
    music_manager::MusicManager,
};
use tracing::{error, info};

/// Play a song from a URL, or search YouTube or SoundCloud
#[poise::command(slash_command, category = "Music")]
pub async fn play(
    ctx: Context<'_>,
    #[description = "URL or search query"] query: String,
    #[description = "Where to search (YouTube by default)"] source: Option<SearchSource>,
) -> CommandResult {
    let source = source.unwrap_or_default();
    info!("Received play command with query: {} ({:?})", query, source);
    let guild_id = guild_id(&ctx)?;
    let player = &ctx.data().player;

    // Get the user's voice channel
    let user_id = ctx.author().id;
    let channel_id =
        match MusicManager::get_user_voice_channel(ctx.serenity_context(), guild_id, user_id) {
            Ok(channel_id) => channel_id,
            Err(err) => {
                ctx.send(embedded_messages::user_not_in_voice_channel(err))
                    .await?;
                return Ok(());
            }
        };

    // Resolving can take a while
    ctx.defer().await?;

    if !player.engine().is_connected(guild_id) {
        if let Err(err) = player.engine().join(guild_id, channel_id).await {
            ctx.send(embedded_messages::failed_to_join_voice_channel(err))
                .await?;
            return Ok(());
        }
    }

    let resolved = player
        .engine()
        .resolve(&query, &ctx.author().name, source)
        .await;
    let tracks = match resolved {
        Ok(tracks) => tracks,
        Err(err) => {
            error!("Failed to resolve '{}': {}", query, err);
            ctx.send(embedded_messages::failed_to_process_audio_source(err))
                .await?;
            return Ok(());
        }
    };

    let enqueued = match player.enqueue(guild_id, tracks).await {
        Ok(enqueued) => enqueued,
        Err(err) => {
            ctx.send(embedded_messages::error(err)).await?;
            return Ok(());
        }
    };

    let reply = {
        let handle = player.queues().get(guild_id);
        let queue = handle.lock().await;
        let first_queued = enqueued
            .position
            .and_then(|position| queue.tracks().nth(position - 1));

        embedded_messages::enqueued(
            &enqueued,
            first_queued,
            queue.len(),
            queue.total_duration(),
        )
    };

    ctx.send(reply).await?;
    Ok(())
}
