pub(crate) mod clear;
pub(crate) mod join;
pub(crate) mod leave;
pub(crate) mod mode;
pub(crate) mod now_playing;
pub(crate) mod pause;
pub(crate) mod play;
pub(crate) mod queue;
pub(crate) mod remove;
pub(crate) mod seek;
pub(crate) mod shuffle;
pub(crate) mod skip;
pub(crate) mod status;
pub(crate) mod stop;
pub(crate) mod volume;

pub mod utils;

use crate::{CommandResult, Context, Error};
use poise::serenity_prelude::GuildId;
use utils::music_manager::MusicError;

/// Every music command, in the order they appear in `/help`
pub fn commands() -> Vec<poise::Command<crate::Data, Error>> {
    vec![
        play::play(),
        skip::skip(),
        pause::pause(),
        seek::seek(),
        stop::stop(),
        now_playing::now_playing(),
        queue::queue(),
        remove::remove(),
        shuffle::shuffle(),
        clear::clear(),
        mode::mode(),
        volume::volume(),
        join::join(),
        leave::leave(),
        status::status(),
    ]
}

/// The guild the command was invoked in
fn guild_id(ctx: &Context<'_>) -> Result<GuildId, Error> {
    ctx.guild_id().ok_or_else(|| MusicError::NotInGuild.into())
}
