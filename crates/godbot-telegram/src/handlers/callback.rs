use std::sync::Arc;

use teloxide::{prelude::*, types::ParseMode};

use godbot_core::result::OutputSections;

use crate::message_key;
use crate::router::AppState;

use super::compile::result_keyboard;

/// The asm/output buttons re-render the stored result in place; no second
/// compile happens.
pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(message) = q.message else {
        return Ok(());
    };
    let sections = match q.data.as_deref() {
        Some("asm") => OutputSections::Assembly,
        Some("output") => OutputSections::Diagnostics,
        _ => return Ok(()),
    };

    let result = state.store.lock().await.result(message_key(&message));
    let Some(result) = result else {
        return Ok(());
    };

    let Some(text) = result
        .to_messages(sections, state.cfg.message_limit)
        .into_iter()
        .next()
    else {
        return Ok(());
    };

    // Best-effort: Telegram rejects edits that do not change the text.
    let _ = bot
        .edit_message_text(message.chat.id, message.id, text)
        .parse_mode(ParseMode::Markdown)
        .reply_markup(result_keyboard())
        .await;

    Ok(())
}
