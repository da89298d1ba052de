//! Twitch (kraken v3 API): game search, channel update and token exchange.

mod config;
mod models;
mod resolver;
mod token;
mod updater;

use std::sync::Arc;

use crate::client::ApiClient;
use crate::http::Transport;

pub use config::TwitchConfig;
pub use models::{ChannelUpdateEcho, SearchGamesResponse, TwitchGame};
pub use resolver::{TwitchGameResolver, pick_best_match};
pub use token::{TwitchTokenRequest, request_token};
pub use updater::{TwitchChannelUpdater, verify_echo};

/// Accept header selecting the API version the endpoints below speak.
pub const ACCEPT_HEADER: &str = "application/vnd.twitchtv.v3+json";

pub(crate) fn api_client(config: &TwitchConfig, transport: Arc<dyn Transport>) -> ApiClient {
    let mut client = ApiClient::new("Twitch", config.api_base.clone(), transport);
    client.add_header(reqwest::header::ACCEPT.as_str(), ACCEPT_HEADER);
    client
}
