use super::*;
use crate::commands::music::utils::embedded_messages;

/// Leave the voice channel and clear the queue
#[poise::command(slash_command, category = "Music")]
pub async fn leave(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;

    match ctx.data().player.leave(guild_id).await {
        Ok(()) => ctx.send(embedded_messages::left_voice_channel()).await?,
        Err(err) => {
            ctx.send(embedded_messages::error(format!(
                "Failed to leave voice channel: {}",
                err
            )))
            .await?
        }
    };

    Ok(())
}
