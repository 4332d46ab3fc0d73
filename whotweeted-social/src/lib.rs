//! Account timelines for the quiz.
//!
//! [`timeline`] defines what the game consumes (a filtered, immutable [`Timeline`])
//! and the [`TimelineProvider`] seam the [`TimelineLoader`] paginates over.
//! [`twitter`] is the provider backed by the Twitter v1.1 REST API.
pub mod filter;
pub mod timeline;
pub mod twitter;

pub use timeline::{LoadError, Page, Post, Timeline, TimelineLoader, TimelineProvider};
