//! Content rules applied once, when a [`Timeline`](crate::Timeline) is built.

/// Tweets mentioning another account are easy giveaways.
pub const MENTION_MARKER: char = '@';
/// Links render as opaque `t.co` URLs and usually point at media.
pub const LINK_MARKER: &str = "http";

/// Returns the displayable text of a tweet, or `None` when it must be dropped.
///
/// ```
/// use whotweeted_social::filter::clean_text;
///
/// assert_eq!(clean_text("foo &amp; bar").as_deref(), Some("foo & bar"));
/// assert_eq!(clean_text("thanks @jack"), None);
/// assert_eq!(clean_text("look https://t.co/x"), None);
/// ```
pub fn clean_text(text: &str) -> Option<String> {
    if text.contains(MENTION_MARKER) || text.contains(LINK_MARKER) {
        return None;
    }
    Some(text.replace("&amp;", "&"))
}
