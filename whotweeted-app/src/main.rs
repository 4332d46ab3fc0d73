use anyhow::Result;
use clap::Parser;
use cli::Cli;
use game::EXIT_LOAD_FAILURE;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use whotweeted_common::observability::{LogConfig, init_logging};
use whotweeted_config::{Credentials, WhoTweetedConfig};
use whotweeted_quiz::{Console, Outcome, RandomDraw, setup};

mod bootstrap;
mod cli;
mod game;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Config and credentials come first, before anything is asked.
    let (cfg, credentials) = match bootstrap::startup(&cli) {
        Ok(ready) => ready,
        Err(err) => {
            report_startup_failure(&err);
            return ExitCode::from(EXIT_LOAD_FAILURE);
        }
    };
    let log_path = match init_logging(cfg.logging.to_log_config()) {
        Ok(path) => path,
        Err(err) => {
            eprintln!("whotweeted: {err:#}");
            return ExitCode::from(EXIT_LOAD_FAILURE);
        }
    };
    tracing::info!(log = %log_path.display(), lives = cfg.game.lives, "whotweeted.start");

    match run(cli, cfg, credentials).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "whotweeted.fatal");
            eprintln!("whotweeted: {err:#}");
            ExitCode::from(EXIT_LOAD_FAILURE)
        }
    }
}

async fn run(cli: Cli, cfg: WhoTweetedConfig, credentials: Credentials) -> Result<u8> {
    let mut console = Console::new(io::stdin().lock(), io::stdout());

    // Setup
    let (first, second) = match cli.accounts() {
        Some(pair) => {
            console.say(setup::WELCOME)?;
            pair
        }
        None => match setup::read_handles(&mut console)? {
            Some(pair) => pair,
            None => return Ok(Outcome::Quit.exit_code()),
        },
    };

    // Loading, Playing, Finished
    let http = bootstrap::http_client(&cfg.twitter)?;
    let loader = match bootstrap::connect(http, credentials, cfg.twitter.page_size).await {
        Ok(loader) => loader,
        Err(err) => return Ok(game::report_load_failure(&mut console, &err)?),
    };
    let code = game::load_and_play(
        &loader,
        &mut console,
        &mut RandomDraw::thread(),
        (&first, &second),
        cfg.game.lives,
    )
    .await?;
    Ok(code)
}

/// Config never loaded, so log to the default location before giving up.
fn report_startup_failure(err: &anyhow::Error) -> Option<PathBuf> {
    let log_path = init_logging(LogConfig::default()).ok();
    tracing::error!(error = %format!("{err:#}"), "whotweeted.startup_failed");
    eprintln!("whotweeted: {err:#}");
    log_path
}
