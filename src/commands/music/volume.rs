use super::*;
use crate::commands::music::utils::embedded_messages;

/// Set the playback volume
#[poise::command(slash_command, category = "Music")]
pub async fn volume(
    ctx: Context<'_>,
    #[description = "Volume in percent (100 is unchanged)"]
    #[min = 0]
    #[max = 200]
    percent: u8,
) -> CommandResult {
    let guild_id = guild_id(&ctx)?;
    let percent = percent.min(200);

    match ctx.data().player.set_volume(guild_id, percent).await {
        Ok(()) => ctx.send(embedded_messages::volume_set(percent)).await?,
        Err(err) => ctx.send(embedded_messages::error(err)).await?,
    };

    Ok(())
}
