use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::client::ApiClient;
use crate::http::Transport;
use crate::query::QueryNormalizer;

use super::config::TwitchConfig;
use super::models::{SearchGamesResponse, TwitchGame};

/// Resolves free-text game names to Twitch's canonical game names.
pub struct TwitchGameResolver {
    client: ApiClient,
    token: String,
}

impl TwitchGameResolver {
    pub fn new(config: &TwitchConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            client: super::api_client(config, transport),
            token: config.token.clone(),
        }
    }

    /// Search progressively simpler variants of `query` until one returns
    /// games. Falls back to `query` itself when nothing is found.
    pub async fn resolve(&self, query: &str) -> String {
        for candidate in QueryNormalizer::candidates(query) {
            if let Some(name) = self.search(&candidate).await {
                return name;
            }
        }

        debug!(query, "No Twitch game found, keeping query");
        query.to_string()
    }

    async fn search(&self, query: &str) -> Option<String> {
        info!("Twitch search: {}", query);

        let url = match self.client.endpoint(
            "search/games",
            [
                ("q", query),
                ("type", "suggest"),
                ("oauth_token", self.token.as_str()),
            ],
        ) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Failed to build Twitch search url");
                return None;
            }
        };

        let body = match self.client.get(url.as_str()).await {
            Ok(body) => body,
            Err(e) => {
                warn!(query, error = %e, "Twitch search failed");
                return None;
            }
        };

        match serde_json::from_str::<SearchGamesResponse>(&body) {
            Ok(response) => pick_best_match(&response.into_games(), query),
            Err(e) => {
                warn!(query, error = %e, "Failed to parse Twitch search response");
                None
            }
        }
    }
}

/// Choose the exact (case-sensitive) match anywhere in `games`, else the
/// first game. `None` only when `games` is empty.
pub fn pick_best_match(games: &[TwitchGame], query: &str) -> Option<String> {
    games
        .iter()
        .find(|game| game.name == query)
        .or_else(|| games.first())
        .map(|game| game.name.clone())
}
