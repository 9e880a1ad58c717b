use std::time::Duration;

use tracing::level_filters::LevelFilter;

const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";

pub fn get_bot_token() -> Option<String> {
    non_empty_env(TELEGRAM_BOT_TOKEN)
}

const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

pub fn get_chat_id() -> Option<String> {
    non_empty_env(TELEGRAM_CHAT_ID)
}

const SITEWATCH_LOG: &str = "SITEWATCH_LOG";

const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::INFO;

pub fn get_log_level() -> LevelFilter {
    let level_from_env = std::env::var(SITEWATCH_LOG);
    level_from_env.map_or(DEFAULT_LOG_LEVEL, |res| res.parse().unwrap_or(DEFAULT_LOG_LEVEL))
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Render a duration as `H hours M minutes S seconds`, dropping the hours when zero.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let seconds = total % 60;
    let minutes = (total / 60) % 60;
    let hours = total / 3600;

    if hours > 0 {
        format!("{hours} hours {minutes} minutes {seconds} seconds")
    } else {
        format!("{minutes} minutes {seconds} seconds")
    }
}
