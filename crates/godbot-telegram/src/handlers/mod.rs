//! Telegram update handlers.
//!
//! Each handler is a small adapter that resolves the compiler / stored
//! request, calls the explorer or renderer port, and replies through the bot.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use crate::router::AppState;

mod callback;
mod commands;
mod compile;
mod edited;

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    if !text.starts_with('/') {
        return Ok(());
    }
    commands::handle_command(bot, msg, state).await
}

pub async fn handle_edited(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    edited::handle_edited(bot, msg, state).await
}

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    callback::handle_callback(bot, q, state).await
}
