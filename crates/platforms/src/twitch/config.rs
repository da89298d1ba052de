use serde::Deserialize;

/// Twitch account and update policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TwitchConfig {
    /// Channel to update.
    pub channel: String,
    /// OAuth token with channel editor rights.
    pub token: String,
    /// Base url of the API.
    pub api_base: String,
    /// Games that must never be set on the channel.
    pub blacklist: Vec<String>,
    /// Game set instead of a blacklisted one.
    pub blacklist_replacement: String,
    /// Attempts per channel update before giving up.
    pub max_update_attempts: u32,
}

impl TwitchConfig {
    /// The configured replacement when `game` is blacklisted, else `game`.
    pub fn allowed_game<'a>(&'a self, game: &'a str) -> &'a str {
        if self.blacklist.iter().any(|banned| banned == game) {
            &self.blacklist_replacement
        } else {
            game
        }
    }
}

impl Default for TwitchConfig {
    fn default() -> Self {
        Self {
            channel: String::new(),
            token: String::new(),
            api_base: "https://api.twitch.tv/kraken".to_string(),
            blacklist: Vec::new(),
            blacklist_replacement: String::new(),
            max_update_attempts: 5,
        }
    }
}
