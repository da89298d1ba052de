//! Twitch and Hitbox API clients used by the info updater.
//!
//! The crate is organised around a small [`Transport`](http::Transport)
//! abstraction so every platform operation can be exercised against an
//! in-memory transport in tests.

pub mod client;
pub mod error;
pub mod hitbox;
pub mod http;
pub mod query;
pub mod retry;
pub mod twitch;

#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::ApiClient;
pub use error::PlatformError;
pub use http::{HttpRequest, ReqwestTransport, Transport};
pub use query::{QueryCandidates, QueryNormalizer};
pub use reqwest::Method;
pub use retry::{RetryAction, RetryPolicy, retry_bounded};
