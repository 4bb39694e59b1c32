use super::*;
use crate::commands::music::utils::{embedded_messages, music_manager::MusicManager};

/// Join your voice channel
#[poise::command(slash_command, category = "Music")]
pub async fn join(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;

    let channel_id = match MusicManager::get_user_voice_channel(
        ctx.serenity_context(),
        guild_id,
        ctx.author().id,
    ) {
        Ok(channel_id) => channel_id,
        Err(err) => {
            ctx.send(embedded_messages::user_not_in_voice_channel(err))
                .await?;
            return Ok(());
        }
    };

    match ctx.data().player.engine().join(guild_id, channel_id).await {
        Ok(()) => ctx.send(embedded_messages::joined(channel_id)).await?,
        Err(err) => {
            ctx.send(embedded_messages::failed_to_join_voice_channel(err))
                .await?
        }
    };

    Ok(())
}
