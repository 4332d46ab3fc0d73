use serde::Deserialize;

/// One entry of `statuses/user_timeline.json`.
///
/// With `tweet_mode=extended` the body arrives in `full_text`; older payloads
/// (and some proxies) still use `text`.
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineTweet {
    pub id: u64,
    #[serde(default)]
    pub full_text: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub retweeted_status: Option<serde_json::Value>,
}

impl TimelineTweet {
    pub fn body(&self) -> &str {
        self.full_text
            .as_deref()
            .or(self.text.as_deref())
            .unwrap_or_default()
    }

    pub fn is_retweet(&self) -> bool {
        self.retweeted_status.is_some()
    }
}

/// Response of `POST oauth2/token`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub token_type: String,
    pub access_token: String,
}
