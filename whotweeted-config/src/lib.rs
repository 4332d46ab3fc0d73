//! Loader for `whotweeted.yaml` with environment overlays.
//!
//! Precedence, lowest first: built-in defaults, the YAML file (or inline YAML),
//! then `WHOTWEETED__SECTION__KEY` environment variables. After merging, every
//! string value has `${VAR}` / `$VAR` references expanded from the process
//! environment so secrets can stay out of the file:
//!
//! ```yaml
//! twitter:
//!   bearer_token: "${TWITTER_BEARER_TOKEN}"
//! game:
//!   lives: 3
//! ```
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use whotweeted_common::observability::{LogConfig, LogFormat};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "WHOTWEETED";
/// Largest `count` the v1.1 timeline endpoint honours.
pub const MAX_PAGE_SIZE: u32 = 200;

#[derive(Debug, Default, Deserialize)]
pub struct WhoTweetedConfig {
    #[serde(default)]
    pub twitter: TwitterConfig,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct TwitterConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub bearer_token: Option<String>,
    #[serde(default)]
    pub consumer_key: Option<String>,
    #[serde(default)]
    pub consumer_secret: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            bearer_token: None,
            consumer_key: None,
            consumer_secret: None,
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

/// Credentials the app can authenticate with, in order of preference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// A pre-issued app-only bearer token.
    Bearer(String),
    /// Consumer key/secret, exchanged for a bearer token at start-up.
    ConsumerKeys { key: String, secret: String },
}

impl TwitterConfig {
    /// Resolve which credentials to use. A bearer token wins over consumer keys.
    ///
    /// Values that are blank, or still contain an unexpanded `${VAR}`, count as unset.
    ///
    /// ```
    /// use whotweeted_config::{Credentials, TwitterConfig};
    ///
    /// let cfg = TwitterConfig {
    ///     bearer_token: Some("${UNSET_TOKEN}".into()),
    ///     consumer_key: Some("key".into()),
    ///     consumer_secret: Some("secret".into()),
    ///     ..TwitterConfig::default()
    /// };
    /// assert_eq!(
    ///     cfg.credentials().unwrap(),
    ///     Credentials::ConsumerKeys { key: "key".into(), secret: "secret".into() }
    /// );
    /// ```
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        if let Some(token) = supplied(&self.bearer_token) {
            return Ok(Credentials::Bearer(token.to_string()));
        }
        match (supplied(&self.consumer_key), supplied(&self.consumer_secret)) {
            (Some(key), Some(secret)) => Ok(Credentials::ConsumerKeys {
                key: key.to_string(),
                secret: secret.to_string(),
            }),
            (Some(_), None) | (None, Some(_)) => Err(ConfigError::Message(
                "twitter.consumer_key and twitter.consumer_secret must be set together".into(),
            )),
            (None, None) => Err(ConfigError::Message(
                "no Twitter credentials configured: set twitter.bearer_token or \
                 twitter.consumer_key + twitter.consumer_secret"
                    .into(),
            )),
        }
    }
}

fn supplied(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.contains("${"))
}

#[derive(Debug, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_lives")]
    pub lives: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            lives: default_lives(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub stderr: bool,
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            dir: None,
            stderr: false,
            filter: default_filter(),
        }
    }
}

impl LoggingConfig {
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            log_dir: self.dir.clone(),
            emit_stderr: self.stderr,
            format: self.format,
            default_filter: self.filter.clone(),
            ..LogConfig::default()
        }
    }
}

fn default_api_base() -> String {
    "https://api.twitter.com".into()
}
fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_max_retries() -> usize {
    2
}
fn default_lives() -> u32 {
    3
}
fn default_filter() -> String {
    "info".into()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

fn validate(cfg: &WhoTweetedConfig) -> Result<(), ConfigError> {
    if cfg.game.lives == 0 {
        return Err(ConfigError::Message("game.lives must be at least 1".into()));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&cfg.twitter.page_size) {
        return Err(ConfigError::Message(format!(
            "twitter.page_size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    Ok(())
}

/// Builder over the `config` crate (YAML sources + env overrides).
pub struct ConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// An empty loader; [`ConfigLoader::load`] adds the environment layer last.
    ///
    /// ```
    /// use whotweeted_config::ConfigLoader;
    ///
    /// let cfg = ConfigLoader::new()
    ///     .with_yaml_str("game:\n  lives: 5")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(cfg.game.lives, 5);
    /// assert_eq!(cfg.twitter.page_size, 200);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a file that must exist; format is inferred from the suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is merged when present and skipped otherwise.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders and validate.
    ///
    /// ```
    /// use whotweeted_config::{ConfigLoader, Credentials};
    ///
    /// unsafe { std::env::set_var("WT_DOCTEST_TOKEN", "injected-from-env"); }
    ///
    /// let cfg = ConfigLoader::new()
    ///     .with_yaml_str("twitter:\n  bearer_token: \"${WT_DOCTEST_TOKEN}\"")
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(
    ///     cfg.twitter.credentials().unwrap(),
    ///     Credentials::Bearer("injected-from-env".into())
    /// );
    ///
    /// unsafe { std::env::remove_var("WT_DOCTEST_TOKEN"); }
    /// ```
    pub fn load(self) -> Result<WhoTweetedConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: WhoTweetedConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        validate(&typed)?;
        Ok(typed)
    }
}
