use super::*;
use crate::commands::music::utils::embedded_messages;

/// Skip the current track, or several tracks at once
#[poise::command(slash_command, category = "Music")]
pub async fn skip(
    ctx: Context<'_>,
    #[description = "How many tracks to skip (default 1)"]
    #[min = 1]
    amount: Option<usize>,
) -> CommandResult {
    let guild_id = guild_id(&ctx)?;
    let player = &ctx.data().player;

    if player.now_playing(guild_id).await.is_none() {
        ctx.send(embedded_messages::no_track_playing()).await?;
        return Ok(());
    }

    match player.skip(guild_id, amount.unwrap_or(1)).await {
        Ok(outcome) => ctx.send(embedded_messages::skipped(&outcome)).await?,
        Err(err) => ctx.send(embedded_messages::error(err)).await?,
    };

    Ok(())
}
