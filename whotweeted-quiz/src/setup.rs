//! The Setup state: greeting the player and collecting the two handles.
use crate::console::Console;
use std::io::{self, BufRead, Write};

pub const WELCOME: &str = "\n\nWelcome to Who Tweeted? Your job is to identify which of two users \
                           tweeted each tweet!\n";

/// Normalise a typed handle: surrounding whitespace and a leading `@` are dropped.
pub fn normalize_handle(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed.strip_prefix('@').unwrap_or(trimmed).trim()
}

/// Prompt until a non-empty handle is given. `None` means input ended.
pub fn read_handle<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    ordinal: &str,
) -> io::Result<Option<String>> {
    let prompt = format!("Enter the Twitter handle of the {ordinal} user: @");
    loop {
        let Some(raw) = console.ask(&prompt)? else {
            return Ok(None);
        };
        let handle = normalize_handle(&raw);
        if !handle.is_empty() {
            return Ok(Some(handle.to_string()));
        }
    }
}

/// Greet the player and collect both handles, in prompt order.
pub fn read_handles<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
) -> io::Result<Option<(String, String)>> {
    console.say(WELCOME)?;
    let Some(first) = read_handle(console, "first")? else {
        return Ok(None);
    };
    let Some(second) = read_handle(console, "second")? else {
        return Ok(None);
    };
    tracing::debug!(%first, %second, "quiz.accounts_chosen");
    Ok(Some((first, second)))
}
