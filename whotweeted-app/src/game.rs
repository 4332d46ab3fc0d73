//! Loading and Playing, over any provider and any console.
use std::io::{self, BufRead, Write};
use whotweeted_quiz::{Console, Draw, Quiz};
use whotweeted_social::{LoadError, Timeline, TimelineLoader, TimelineProvider};

/// Exit status when timelines cannot be loaded (or the app cannot even try).
pub const EXIT_LOAD_FAILURE: u8 = 2;

/// Load both accounts, then play. Returns the process exit status.
pub async fn load_and_play<P, D, R, W>(
    loader: &TimelineLoader<P>,
    console: &mut Console<R, W>,
    draw: &mut D,
    (first, second): (&str, &str),
    lives: u32,
) -> io::Result<u8>
where
    P: TimelineProvider,
    D: Draw,
    R: BufRead,
    W: Write,
{
    let first_timeline = match load(loader, console, first).await? {
        Ok(timeline) => timeline,
        Err(err) => return report_load_failure(console, &err),
    };
    let second_timeline = match load(loader, console, second).await? {
        Ok(timeline) => timeline,
        Err(err) => return report_load_failure(console, &err),
    };

    let mut quiz = Quiz::new(&first_timeline, &second_timeline, lives);
    let outcome = quiz.run(draw, console)?;
    Ok(outcome.exit_code())
}

async fn load<P, R, W>(
    loader: &TimelineLoader<P>,
    console: &mut Console<R, W>,
    account: &str,
) -> io::Result<Result<Timeline, LoadError>>
where
    P: TimelineProvider,
    R: BufRead,
    W: Write,
{
    console.say(format_args!("Loading @{account}'s tweets..."))?;
    Ok(loader.load(account).await)
}

pub fn report_load_failure<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    err: &LoadError,
) -> io::Result<u8> {
    tracing::error!(error = %err, transient = err.is_transient(), "whotweeted.load_failed");
    console.say(err.operator_message())?;
    Ok(EXIT_LOAD_FAILURE)
}
