use super::*;
use crate::commands::music::utils::embedded_messages;

/// Remove every track from the queue without stopping the current one
#[poise::command(slash_command, category = "Music", rename = "clear-queue")]
pub async fn clear(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;

    let removed = {
        let handle = ctx.data().player.queues().get(guild_id);
        let mut queue = handle.lock().await;
        let removed = queue.len();
        queue.clear();
        removed
    };

    ctx.send(embedded_messages::cleared(removed)).await?;
    Ok(())
}
