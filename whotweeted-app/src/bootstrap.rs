//! Wiring from configuration to a ready [`TimelineLoader`].
use crate::cli::Cli;
use std::path::Path;
use std::time::Duration;
use whotweeted_config::{ConfigLoader, Credentials, TwitterConfig, WhoTweetedConfig};
use whotweeted_http::{HttpClient, HttpError};
use whotweeted_social::twitter::TwitterApi;
use whotweeted_social::{LoadError, TimelineLoader};

pub const DEFAULT_CONFIG_FILE: &str = "whotweeted.yaml";

/// An explicit `--config` must exist; the default file is optional.
pub fn load_config(cli: &Cli) -> anyhow::Result<WhoTweetedConfig> {
    let loader = match &cli.config {
        Some(path) => ConfigLoader::new().with_file(path),
        None => ConfigLoader::new().with_optional_file(Path::new(DEFAULT_CONFIG_FILE)),
    };
    let mut cfg = loader.load()?;
    if let Some(lives) = cli.lives {
        cfg.game.lives = lives;
    }
    Ok(cfg)
}

/// Everything needed before the first prompt: configuration and credentials.
pub fn startup(cli: &Cli) -> anyhow::Result<(WhoTweetedConfig, Credentials)> {
    let cfg = load_config(cli)?;
    let credentials = cfg.twitter.credentials()?;
    Ok((cfg, credentials))
}

pub fn http_client(cfg: &TwitterConfig) -> Result<HttpClient, HttpError> {
    Ok(HttpClient::new(&cfg.api_base)?
        .with_timeout(Duration::from_secs(cfg.timeout_secs))
        .with_retries(cfg.max_retries))
}

/// Authenticate (exchanging consumer keys if needed) and build the loader.
pub async fn connect(
    http: HttpClient,
    credentials: Credentials,
    page_size: u32,
) -> Result<TimelineLoader<TwitterApi>, LoadError> {
    let api = match credentials {
        Credentials::Bearer(token) => TwitterApi::new(http, token),
        Credentials::ConsumerKeys { key, secret } => {
            TwitterApi::authenticate(http, &key, &secret).await?
        }
    };
    Ok(TimelineLoader::new(api).with_page_size(page_size))
}
