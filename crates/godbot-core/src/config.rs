use std::{env, fs, path::Path};

use crate::catalog::Toolchain;
use crate::store::ReplyStore;
use crate::writer::MessageWriter;
use crate::{errors::Error, Result};

/// Typed configuration for the bot.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub telegram_token: String,
    pub polling: bool,
    pub webhook_path: Option<String>,
    pub webhook_url: Option<String>,
    pub webhook_port: u16,

    // Catalog target
    pub language: String,
    pub instruction_set: String,

    // Reply shaping
    pub message_limit: usize,
    pub reply_message_limit: usize,

    // Default compiler flags when the user passes none
    pub gcc_default_args: String,
    pub clang_default_args: String,

    // Remote services
    pub explorer_url: String,
    pub carbonara_url: String,

    // Edited-message correlation store
    pub store_capacity: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let telegram_token = env_str("TELEGRAM_TOKEN").unwrap_or_default();
        if telegram_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_TOKEN environment variable is required".to_string(),
            ));
        }

        // `dev` runs long polling; anything else expects a webhook.
        let app_environment = env_str("APP_ENVIRONMENT").unwrap_or_default();
        let webhook_path = env_str("TELEGRAM_HOOK").and_then(non_empty);
        let webhook_url = env_str("WEBHOOK_URL").and_then(non_empty);
        let webhook_port = env_u16("WEBHOOK_PORT").unwrap_or(8080);
        let polling = app_environment == "dev" || webhook_path.is_none();

        if !polling && webhook_url.is_none() {
            return Err(Error::Config(
                "WEBHOOK_URL is required when TELEGRAM_HOOK is set".to_string(),
            ));
        }

        let language = env_str("TARGET_LANGUAGE").unwrap_or_else(|| "c++".to_string());
        let instruction_set =
            env_str("TARGET_INSTRUCTION_SET").unwrap_or_else(|| "amd64".to_string());

        let message_limit =
            env_usize("MESSAGE_LIMIT").unwrap_or(MessageWriter::DEFAULT_MAX_SIZE);
        let reply_message_limit = env_usize("REPLY_MESSAGE_LIMIT").unwrap_or(1).max(1);

        const DEFAULT_ARGS: &str = "-std=gnu++20 -Wall -Wextra -O2";
        let gcc_default_args =
            env_str("GCC_DEFAULT_ARGS").unwrap_or_else(|| DEFAULT_ARGS.to_string());
        let clang_default_args =
            env_str("CLANG_DEFAULT_ARGS").unwrap_or_else(|| DEFAULT_ARGS.to_string());

        let explorer_url =
            env_str("EXPLORER_URL").unwrap_or_else(|| "https://godbolt.org".to_string());
        let carbonara_url = env_str("CARBONARA_URL")
            .unwrap_or_else(|| "https://carbonara.solopov.dev".to_string());

        let store_capacity = env_usize("STORE_CAPACITY").unwrap_or(ReplyStore::DEFAULT_CAPACITY);

        Ok(Self {
            telegram_token,
            polling,
            webhook_path,
            webhook_url,
            webhook_port,
            language,
            instruction_set,
            message_limit,
            reply_message_limit,
            gcc_default_args,
            clang_default_args,
            explorer_url,
            carbonara_url,
            store_capacity,
        })
    }

    /// Fallback compiler flags for a toolchain when the command carries none.
    pub fn default_arguments(&self, toolchain: Option<Toolchain>) -> &str {
        match toolchain {
            Some(Toolchain::Gcc) => &self.gcc_default_args,
            Some(Toolchain::Clang) => &self.clang_default_args,
            None => "",
        }
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u16(key: &str) -> Option<u16> {
    env_str(key).and_then(|s| s.trim().parse::<u16>().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    env_str(key).and_then(|s| s.trim().parse::<usize>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
