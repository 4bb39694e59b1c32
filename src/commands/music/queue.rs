use super::*;
use crate::commands::music::utils::embedded_messages;
use poise::CreateReply;

/// View the current music queue
#[poise::command(slash_command, category = "Music")]
pub async fn queue(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;
    let player = &ctx.data().player;

    let current = player.now_playing(guild_id).await;
    let embed = {
        let handle = player.queues().get(guild_id);
        let queue = handle.lock().await;
        embedded_messages::music_queue(
            current.as_ref(),
            queue.tracks(),
            queue.mode(),
            queue.total_duration(),
        )
    };

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}
