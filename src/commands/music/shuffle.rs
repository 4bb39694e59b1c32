use super::*;
use crate::commands::music::utils::embedded_messages;

/// Shuffle the queued tracks
#[poise::command(slash_command, category = "Music")]
pub async fn shuffle(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;

    let reply = {
        let handle = ctx.data().player.queues().get(guild_id);
        let mut queue = handle.lock().await;

        if queue.is_empty() {
            embedded_messages::queue_is_empty()
        } else {
            queue.shuffle();
            embedded_messages::shuffled(queue.len())
        }
    };

    ctx.send(reply).await?;
    Ok(())
}
