//! Twitter v1.1 REST API as a [`TimelineProvider`](crate::TimelineProvider).
//!
//! Uses app-only auth: either a pre-issued bearer token, or a consumer key/secret
//! pair exchanged for one via `POST oauth2/token`.
pub mod client;
pub mod types;

pub use client::TwitterApi;
