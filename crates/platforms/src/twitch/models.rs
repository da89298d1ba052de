use serde::Deserialize;

/// Response of `search/games`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchGamesResponse {
    /// Null when nothing matched.
    #[serde(default)]
    pub games: Option<Vec<TwitchGame>>,
}

impl SearchGamesResponse {
    pub fn into_games(self) -> Vec<TwitchGame> {
        self.games.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwitchGame {
    pub name: String,
}

/// Fields of the channel object echoed back by a channel update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelUpdateEcho {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub game: Option<String>,
}
