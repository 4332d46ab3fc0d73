//! Paginated timeline loading.
//!
//! The loader asks its provider for pages of an account's newest original posts,
//! walking backwards with a "strictly older than the last id seen" cursor until a
//! page comes back empty. The cursor follows everything the provider saw, so a
//! page of nothing but dropped items still moves it along. Pages are concatenated in request order and filtered
//! once into a [`Timeline`].
use crate::filter::clean_text;
use async_trait::async_trait;
use thiserror::Error;

/// Largest page the Twitter v1.1 timeline endpoint returns.
pub const PAGE_SIZE: u32 = 200;

/// A provider-level item, before filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: u64,
    pub text: String,
}

/// One provider response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Posts worth keeping, newest first.
    pub posts: Vec<Post>,
    /// Id of the last item the provider received, kept or not. `None` when it
    /// received nothing, which ends pagination.
    pub last_seen: Option<u64>,
}

impl From<Vec<Post>> for Page {
    fn from(posts: Vec<Post>) -> Self {
        let last_seen = posts.last().map(|p| p.id);
        Self { posts, last_seen }
    }
}

/// The displayable posts of one account.
///
/// Every constructor filters, so a `Timeline` never holds text with a mention or a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    account: String,
    items: Vec<String>,
}

impl Timeline {
    pub fn from_posts(account: impl Into<String>, posts: impl IntoIterator<Item = Post>) -> Self {
        Self::from_texts(account, posts.into_iter().map(|p| p.text))
    }

    /// ```
    /// use whotweeted_social::Timeline;
    ///
    /// let tl = Timeline::from_texts("jack", ["hello &amp; bye", "hi @biz"]);
    /// assert_eq!(tl.items(), ["hello & bye"]);
    /// ```
    pub fn from_texts<S: AsRef<str>>(
        account: impl Into<String>,
        texts: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            account: account.into(),
            items: texts
                .into_iter()
                .filter_map(|t| clean_text(t.as_ref()))
                .collect(),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("account @{account} could not be resolved: {message}")]
    UnknownAccount { account: String, message: String },
    #[error("provider rejected the request credentials: {0}")]
    AuthFailure(String),
    #[error("provider unavailable while loading {target}: {message}")]
    Transient { target: String, message: String },
    #[error("unexpected provider response for @{account}: {message}")]
    Provider { account: String, message: String },
}

impl LoadError {
    /// Text shown to the player before the process exits.
    pub fn operator_message(&self) -> &'static str {
        match self {
            LoadError::UnknownAccount { .. } | LoadError::Provider { .. } => {
                "Invalid username. Please restart."
            }
            LoadError::AuthFailure(_) => {
                "Could not authenticate with Twitter, or the account is protected. \
                 Check your credentials and restart."
            }
            LoadError::Transient { .. } => {
                "Twitter could not be reached right now. Please restart in a moment."
            }
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, LoadError::Transient { .. })
    }
}

/// A source of account posts, newest first.
#[async_trait]
pub trait TimelineProvider: Send + Sync {
    /// Fetch up to `count` of `account`'s newest items whose id is strictly less
    /// than `older_than` (no bound when `None`), keeping only original posts.
    /// A page with nothing in `last_seen` means "no more".
    async fn fetch_page(
        &self,
        account: &str,
        older_than: Option<u64>,
        count: u32,
    ) -> Result<Page, LoadError>;
}

pub struct TimelineLoader<P> {
    provider: P,
    page_size: u32,
}

impl<P: TimelineProvider> TimelineLoader<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            page_size: PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, n: u32) -> Self {
        self.page_size = n.clamp(1, PAGE_SIZE);
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Load and filter `account`'s timeline. An account without qualifying posts
    /// yields an empty timeline, not an error.
    pub async fn load(&self, account: &str) -> Result<Timeline, LoadError> {
        let posts = self.fetch_all(account).await?;
        let fetched = posts.len();
        let timeline = Timeline::from_posts(account, posts);

        tracing::info!(
            account,
            fetched,
            kept = timeline.len(),
            "timeline.loaded"
        );
        Ok(timeline)
    }

    /// Every page of `account`, concatenated in request order, unfiltered.
    pub async fn fetch_all(&self, account: &str) -> Result<Vec<Post>, LoadError> {
        let mut all: Vec<Post> = Vec::new();
        let mut cursor: Option<u64> = None;
        let mut page_no = 0usize;

        loop {
            page_no += 1;
            let Page { posts, last_seen } = self
                .provider
                .fetch_page(account, cursor, self.page_size)
                .await?;

            tracing::debug!(
                account,
                page = page_no,
                older_than = ?cursor,
                kept = posts.len(),
                last_seen = ?last_seen,
                "timeline.page"
            );

            let Some(next) = last_seen else {
                break;
            };
            all.extend(posts);

            if next == 0 {
                break;
            }
            // A provider that does not move backwards would page forever.
            if cursor.is_some_and(|prev| next >= prev) {
                tracing::warn!(account, older_than = ?cursor, next, "timeline.cursor_stalled");
                break;
            }
            cursor = Some(next);
        }

        Ok(all)
    }
}
