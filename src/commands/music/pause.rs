use super::*;
use crate::commands::music::utils::embedded_messages;

/// Pause or resume the current track
#[poise::command(slash_command, category = "Music")]
pub async fn pause(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(&ctx)?;
    let player = &ctx.data().player;

    let Some(track) = player.now_playing(guild_id).await else {
        ctx.send(embedded_messages::no_track_playing()).await?;
        return Ok(());
    };

    match player.toggle_pause(guild_id).await {
        Ok(paused) => {
            ctx.send(embedded_messages::pause_toggled(&track, paused))
                .await?
        }
        Err(err) => ctx.send(embedded_messages::error(err)).await?,
    };

    Ok(())
}
