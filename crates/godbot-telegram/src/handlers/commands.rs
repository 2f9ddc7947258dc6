use std::sync::Arc;

use regex::Regex;
use teloxide::{
    prelude::*,
    types::{InputFile, Message, MessageEntityKind, ParseMode},
};
use tracing::warn;

use godbot_core::ansi::escape_html;

use crate::router::AppState;

use super::compile;

/// Split a command message into its first line (command + flags) and the
/// remaining lines (inline source code, when present).
fn split_command_message(text: &str) -> (&str, Option<&str>) {
    match text.split_once('\n') {
        Some((cmdline, rest)) => (cmdline, Some(rest)),
        None => (text, None),
    }
}

/// Telegram may send `/cmd@botname arg1 ...`.
fn parse_command(cmdline: &str) -> (String, String) {
    let mut parts = cmdline.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

pub async fn handle_command(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let text = msg.text().unwrap_or_default();
    let (cmdline, inline_code) = split_command_message(text);
    let (cmd, args) = parse_command(cmdline);
    let inline_code = inline_code.map(str::to_string);

    match cmd.as_str() {
        "help" => help(bot, msg, state).await,
        "show" => show(bot, msg, state, false).await,
        "showimg" => show(bot, msg, state, true).await,
        "img" => render_image(bot, msg, state).await,
        _ => compile::handle_compile(bot, msg, state, &cmd, &args, inline_code.as_deref()).await,
    }
}

/// List the well-known shortcuts that actually resolved at load time.
async fn help(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let mut text = String::from("<u><b>Available compilers</b></u>\n");
    for name in ["gcc", "gsnapshot", "clang", "clang_trunk"] {
        let Ok(compiler) = state.catalog.by_command(name) else {
            continue;
        };
        text.push_str(&format!(
            " /{} - {}\n",
            compiler.command,
            escape_html(&compiler.title)
        ));
    }
    text.push_str("<b>Full list</b>: https://godbolt.org/api/compilers/c++\n");
    text.push_str("Alternatively format like /gcc_10_1 is supported\n");
    text.push_str("/show Shows source code from the godbolt link\n");
    text.push_str("/showimg Displays source code from the godbolt link\n");

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .reply_to_message_id(msg.id)
        .await?;
    Ok(())
}

fn extract_link(text: &str) -> Option<String> {
    let re = Regex::new(r"https://(?:\w+\.)?godbolt\.org/z/(\w+)").expect("valid regex");
    re.captures(text).map(|c| c[1].to_string())
}

/// Display code behind a godbolt short link, as text or as an image.
async fn show(bot: Bot, msg: Message, state: Arc<AppState>, image: bool) -> ResponseResult<()> {
    let link = msg
        .text()
        .and_then(extract_link)
        .or_else(|| {
            msg.reply_to_message()
                .and_then(|m| m.text())
                .and_then(extract_link)
        });
    let Some(link) = link else {
        return Ok(());
    };

    let source = match state.explorer.shortlink_source(&link).await {
        Ok(source) => source,
        Err(e) => {
            warn!(%link, error = %e, "short link lookup failed");
            return Ok(());
        }
    };

    if !image {
        let reply = format!("*// Code*:\n```\n{source}```\n");
        bot.send_message(msg.chat.id, reply)
            .parse_mode(ParseMode::Markdown)
            .reply_to_message_id(msg.id)
            .await?;
        return Ok(());
    }

    match state.renderer.render_code(&source).await {
        Ok(bytes) => {
            bot.send_photo(msg.chat.id, InputFile::memory(bytes))
                .reply_to_message_id(msg.id)
                .await?;
        }
        Err(e) => warn!(%link, error = %e, "image render failed"),
    }
    Ok(())
}

/// Prefer the first code/pre entity; fall back to the whole message.
/// Entity offsets count UTF-16 code units.
fn code_entity_text(msg: &Message) -> Option<String> {
    let text = msg.text()?;
    let entity = msg.entities()?.iter().find(|e| {
        matches!(
            e.kind,
            MessageEntityKind::Code | MessageEntityKind::Pre { .. }
        )
    })?;

    let units: Vec<u16> = text.encode_utf16().collect();
    let start = entity.offset.min(units.len());
    let end = (entity.offset + entity.length).min(units.len());
    String::from_utf16(&units[start..end]).ok()
}

/// Render the replied-to message's code to an image.
async fn render_image(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(replied) = msg.reply_to_message() else {
        bot.send_message(
            msg.chat.id,
            "Reply to a message with code to render it to an image",
        )
        .await?;
        return Ok(());
    };
    let Some(text) = replied.text() else {
        return Ok(());
    };
    let code = code_entity_text(replied).unwrap_or_else(|| text.to_string());

    match state.renderer.render_code(&code).await {
        Ok(bytes) => {
            bot.send_photo(msg.chat.id, InputFile::memory(bytes))
                .reply_to_message_id(msg.id)
                .await?;
        }
        Err(e) => warn!(error = %e, "image render failed"),
    }
    Ok(())
}
