//! Thin wrapper over the v1.1 user timeline endpoint.
use crate::timeline::{LoadError, Page, Post, TimelineProvider};
use crate::twitter::types::{TimelineTweet, TokenResponse};
use async_trait::async_trait;
use whotweeted_http::{Auth, HttpClient, HttpError, RequestOpts};

pub const TIMELINE_PATH: &str = "1.1/statuses/user_timeline.json";
pub const TOKEN_PATH: &str = "oauth2/token";

/// Twitter wants key and secret url-encoded before they are joined for Basic auth.
fn encode(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

#[derive(Clone)]
pub struct TwitterApi {
    http: HttpClient,
    bearer: String,
}

impl TwitterApi {
    pub fn new(http: HttpClient, bearer_token: String) -> Self {
        Self {
            http,
            bearer: bearer_token,
        }
    }

    /// Exchange a consumer key/secret pair for an app-only bearer token.
    pub async fn authenticate(
        http: HttpClient,
        consumer_key: &str,
        consumer_secret: &str,
    ) -> Result<Self, LoadError> {
        let key = encode(consumer_key);
        let secret = encode(consumer_secret);

        let token: TokenResponse = http
            .post_form(
                TOKEN_PATH,
                &[("grant_type", "client_credentials")],
                RequestOpts {
                    auth: Some(Auth::Basic {
                        username: &key,
                        password: &secret,
                    }),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| match e {
                e if e.is_transient() => LoadError::Transient {
                    target: "a bearer token".to_string(),
                    message: e.to_string(),
                },
                e => LoadError::AuthFailure(e.to_string()),
            })?;

        if !token.token_type.eq_ignore_ascii_case("bearer") {
            return Err(LoadError::AuthFailure(format!(
                "unexpected token type {:?}",
                token.token_type
            )));
        }

        tracing::info!("twitter.bearer_issued");
        Ok(Self::new(http, token.access_token))
    }

    /// One page of `screen_name`'s timeline, newest first, retweets excluded.
    ///
    /// `max_id` is inclusive, as on the wire.
    pub async fn user_timeline(
        &self,
        screen_name: &str,
        max_id: Option<u64>,
        count: u32,
    ) -> Result<Vec<TimelineTweet>, HttpError> {
        let mut params: Vec<(&str, std::borrow::Cow<'_, str>)> = vec![
            ("screen_name", screen_name.into()),
            ("count", count.to_string().into()),
            ("include_rts", "false".into()),
            ("exclude_replies", "false".into()),
            ("tweet_mode", "extended".into()),
            ("trim_user", "true".into()),
        ];
        if let Some(id) = max_id {
            params.push(("max_id", id.to_string().into()));
        }

        self.http
            .get_json(
                TIMELINE_PATH,
                RequestOpts {
                    auth: Some(Auth::Bearer(&self.bearer)),
                    query: Some(params),
                    ..Default::default()
                },
            )
            .await
    }
}

fn classify(account: &str, err: HttpError) -> LoadError {
    if err.is_transient() {
        return LoadError::Transient {
            target: format!("@{account}"),
            message: err.to_string(),
        };
    }
    let account = account.to_string();
    match err.status().map(|s| s.as_u16()) {
        // 404: no such user (code 34); 403: suspended (code 63).
        Some(404) | Some(403) => LoadError::UnknownAccount {
            account,
            message: err.to_string(),
        },
        // 401: bad token, or a protected account we may not read.
        Some(401) => LoadError::AuthFailure(err.to_string()),
        _ => LoadError::Provider {
            account,
            message: err.to_string(),
        },
    }
}

#[async_trait]
impl TimelineProvider for TwitterApi {
    async fn fetch_page(
        &self,
        account: &str,
        older_than: Option<u64>,
        count: u32,
    ) -> Result<Page, LoadError> {
        let max_id = match older_than {
            Some(0) => return Ok(Page::default()),
            Some(id) => Some(id - 1),
            None => None,
        };

        let tweets = self
            .user_timeline(account, max_id, count)
            .await
            .map_err(|e| classify(account, e))?;

        // Retweets are dropped here but still advance the cursor.
        let last_seen = tweets.last().map(|t| t.id);
        let posts = tweets
            .into_iter()
            .filter(|t| !t.is_retweet())
            .map(|t| Post {
                id: t.id,
                text: t.body().to_string(),
            })
            .collect();

        Ok(Page { posts, last_seen })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use whotweeted_http::StatusCode;

    fn api_error(status: StatusCode) -> HttpError {
        HttpError::Api {
            status,
            message: "nope".into(),
            request_id: "-".into(),
        }
    }

    #[test]
    fn classifies_provider_failures() {
        assert!(matches!(
            classify("ghost", api_error(StatusCode::NOT_FOUND)),
            LoadError::UnknownAccount { ref account, .. } if account == "ghost"
        ));
        assert!(matches!(
            classify("x", api_error(StatusCode::UNAUTHORIZED)),
            LoadError::AuthFailure(_)
        ));
        assert!(classify("x", api_error(StatusCode::SERVICE_UNAVAILABLE)).is_transient());
        assert!(classify("x", HttpError::Network("reset".into())).is_transient());
        assert!(matches!(
            classify("x", HttpError::Decode("eof".into(), String::new())),
            LoadError::Provider { .. }
        ));
    }

    #[test]
    fn consumer_keys_are_form_encoded() {
        assert_eq!(encode("abc123"), "abc123");
        assert_eq!(encode("a b/c"), "a+b%2Fc");
    }
}
