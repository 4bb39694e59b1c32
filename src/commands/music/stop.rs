use super::*;
use crate::commands::music::utils::embedded_messages;

/// Stop the current track and keep the queue
#[poise::command(slash_command, category = "Music")]
pub async fn stop(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;
    let player = &ctx.data().player;

    if !player.engine().is_connected(guild_id) {
        ctx.send(embedded_messages::error(MusicError::NotConnected))
            .await?;
        return Ok(());
    }

    match player.stop(guild_id).await {
        Ok(()) => ctx.send(embedded_messages::stopped()).await?,
        Err(err) => ctx.send(embedded_messages::error(err)).await?,
    };

    Ok(())
}
