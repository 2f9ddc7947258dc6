use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, Message, ParseMode},
};
use tracing::{info, warn};

use godbot_core::{
    catalog::{CompilerCatalog, CompilerDescriptor, Toolchain},
    explorer::types::CompileRequest,
    result::{CompileResult, OutputSections},
    store::PendingCompile,
};

use crate::message_key;
use crate::router::AppState;

/// Resolve a command token to a compiler: alias first, then the
/// `toolchain_major_minor` form read as a version-range query.
fn resolve_compiler<'a>(
    catalog: &'a CompilerCatalog,
    command: &str,
) -> godbot_core::Result<&'a CompilerDescriptor> {
    match catalog.by_command(command) {
        Ok(compiler) => Ok(compiler),
        Err(not_found) => {
            let Some((name, version)) = command.split_once('_') else {
                return Err(not_found);
            };
            let Some(toolchain) = Toolchain::parse(name) else {
                return Err(not_found);
            };
            catalog.by_range(toolchain, &version.replace('_', "."))
        }
    }
}

pub fn result_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([[
        InlineKeyboardButton::callback("asm", "asm"),
        InlineKeyboardButton::callback("output", "output"),
    ]])
}

pub async fn handle_compile(
    bot: Bot,
    msg: Message,
    state: Arc<AppState>,
    command: &str,
    args: &str,
    inline_code: Option<&str>,
) -> ResponseResult<()> {
    // The code comes from the replied-to message when there is one, else from
    // the lines after the command.
    let (code, code_msg) = if let Some(replied) = msg.reply_to_message() {
        let Some(text) = replied.text() else {
            return Ok(());
        };
        (text.to_string(), replied.clone())
    } else if let Some(code) = inline_code {
        (code.to_string(), msg.clone())
    } else {
        bot.send_message(
            msg.chat.id,
            "Put the code on the lines after the command, or reply to a message with code",
        )
        .reply_to_message_id(msg.id)
        .await?;
        return Ok(());
    };

    let compiler = match resolve_compiler(&state.catalog, command) {
        Ok(compiler) => compiler.clone(),
        Err(e) => {
            bot.send_message(msg.chat.id, e.to_string())
                .reply_to_message_id(msg.id)
                .await?;
            return Ok(());
        }
    };

    if command.starts_with("vcpp") || compiler.title.to_lowercase().contains("msvc") {
        bot.send_message(msg.chat.id, "MSVC is not a compiler")
            .reply_to_message_id(msg.id)
            .await?;
        return Ok(());
    }

    let user_arguments = if args.is_empty() {
        state.cfg.default_arguments(compiler.toolchain).to_string()
    } else {
        args.to_string()
    };

    info!(
        compiler = %compiler.id,
        args = %user_arguments,
        chat = msg.chat.id.0,
        "compile requested"
    );

    // Remember the options under the code message so an edit recompiles.
    if msg.reply_to_message().is_some() {
        state.store.lock().await.add_request(
            message_key(&code_msg),
            PendingCompile {
                compiler_id: compiler.id.clone(),
                user_arguments: user_arguments.clone(),
            },
        );
    }

    let request = CompileRequest {
        compiler_id: compiler.id,
        source: code,
        user_arguments,
    };

    let result = match state.explorer.compile(&request).await {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, "compile call failed");
            bot.send_message(msg.chat.id, format!("Compilation failed: {e}"))
                .reply_to_message_id(msg.id)
                .await?;
            return Ok(());
        }
    };

    send_result(&bot, &state, &code_msg, &result).await
}

/// Reply with the rendered result chunks (bounded by the reply limit) and
/// remember the result under each reply for the asm/output buttons.
pub async fn send_result(
    bot: &Bot,
    state: &Arc<AppState>,
    reply_to: &Message,
    result: &CompileResult,
) -> ResponseResult<()> {
    let chunks = result.to_messages(OutputSections::All, state.cfg.message_limit);
    for chunk in chunks.iter().take(state.cfg.reply_message_limit) {
        let sent = bot
            .send_message(reply_to.chat.id, chunk)
            .parse_mode(ParseMode::Markdown)
            .reply_to_message_id(reply_to.id)
            .reply_markup(result_keyboard())
            .await?;
        state
            .store
            .lock()
            .await
            .add_result(message_key(&sent), result.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use godbot_core::explorer::types::CompilerListing;

    fn listing(id: &str, semver: &str, title: &str) -> CompilerListing {
        CompilerListing {
            id: id.to_string(),
            semver: semver.to_string(),
            title: title.to_string(),
            lang: "c++".to_string(),
            instruction_set: "amd64".to_string(),
        }
    }

    fn catalog() -> CompilerCatalog {
        let mut catalog = CompilerCatalog::new();
        catalog.load(
            &[
                listing("g103", "10.3.0", "x86-64 gcc 10.3"),
                listing("g112", "11.2.0", "x86-64 gcc 11.2"),
            ],
            "c++",
            "amd64",
        );
        catalog
    }

    #[test]
    fn resolves_aliases_directly() {
        let c = catalog();
        assert_eq!(resolve_compiler(&c, "gcc").unwrap().id, "g112");
        assert_eq!(resolve_compiler(&c, "gcc_10_3").unwrap().id, "g103");
    }

    #[test]
    fn falls_back_to_version_range() {
        let c = catalog();
        // Not a registered alias, but readable as a range query.
        assert_eq!(resolve_compiler(&c, "gcc_11_2_0").unwrap().id, "g112");
    }

    #[test]
    fn unresolvable_command_keeps_original_error() {
        let c = catalog();
        let err = resolve_compiler(&c, "tcc").unwrap_err();
        assert!(err.to_string().contains("tcc"));
        let err = resolve_compiler(&c, "gcc_9_9").unwrap_err();
        assert!(matches!(err, godbot_core::Error::CompilerNotFound(_)));
    }
}
