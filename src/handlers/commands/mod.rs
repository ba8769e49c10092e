//! Command handlers module
//!
//! Commands are only recognised while the chat has no active step.

pub mod start;

use crate::state::BotContext;
use crate::telegram::ChatInfo;
use crate::utils::errors::Result;

/// Bot commands the state machine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
}

impl Command {
    /// Parse the first token of `text`, accepting the `/start@botname` form
    pub fn parse(text: &str) -> Option<Self> {
        let token = text.split_whitespace().next()?;
        let name = token.strip_prefix('/')?;
        let name = name.split_once('@').map_or(name, |(name, _)| name);

        match name {
            "start" => Some(Command::Start),
            _ => None,
        }
    }
}

/// Main command dispatcher
pub async fn handle_command(ctx: &BotContext, chat: &ChatInfo, command: Command) -> Result<()> {
    match command {
        Command::Start => start::handle_start(ctx, chat).await,
    }
}
