use std::sync::Arc;

use teloxide::{prelude::*, types::Message};
use tracing::{info, warn};

use godbot_core::result::OutputSections;

use crate::message_key;
use crate::router::AppState;

/// An edit of a message we previously compiled re-runs the compile with the
/// stored options and the new text.
pub async fn handle_edited(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let pending = state.store.lock().await.request(message_key(&msg));
    let Some(pending) = pending else {
        return Ok(());
    };

    info!(
        compiler = %pending.compiler_id,
        chat = msg.chat.id.0,
        "recompiling edited message"
    );

    let request = pending.with_source(text);
    let result = match state.explorer.compile(&request).await {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, "recompile failed");
            return Ok(());
        }
    };

    let chunks = result.to_messages(OutputSections::All, state.cfg.message_limit);
    for chunk in chunks.iter().take(state.cfg.reply_message_limit) {
        bot.send_message(msg.chat.id, chunk)
            .parse_mode(teloxide::types::ParseMode::Markdown)
            .reply_to_message_id(msg.id)
            .await?;
    }
    Ok(())
}
