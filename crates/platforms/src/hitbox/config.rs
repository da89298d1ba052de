use serde::Deserialize;

/// Hitbox account settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HitboxConfig {
    pub channel: String,
    pub token: String,
    pub api_base: String,
    /// Category used when a game can't be found and when nothing is live.
    pub default_category: String,
}

impl HitboxConfig {
    pub fn is_default_category(&self, category_id: &str) -> bool {
        self.default_category == category_id
    }
}

impl Default for HitboxConfig {
    fn default() -> Self {
        Self {
            channel: String::new(),
            token: String::new(),
            api_base: "http://api.hitbox.tv".to_string(),
            default_category: "50077".to_string(),
        }
    }
}
