use std::sync::Arc;

pub mod commands;
pub mod config;
pub mod events;

use commands::music::utils::player::Player;
use config::Config;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type CommandResult = Result<(), Error>;

// User data, which is stored and accessible in all command invocations
pub struct Data {
    pub player: Arc<Player>,
    pub config: Arc<Config>,
}
