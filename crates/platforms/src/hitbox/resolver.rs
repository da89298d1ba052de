use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::ApiClient;
use crate::http::Transport;

use super::config::HitboxConfig;

/// Resolves a game name to a Hitbox category id with a single lookup.
pub struct HitboxGameResolver {
    client: ApiClient,
    default_category: String,
}

impl HitboxGameResolver {
    pub fn new(config: &HitboxConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            client: super::api_client(config, transport),
            default_category: config.default_category.clone(),
        }
    }

    /// Category id for `query`, or the default category when not found.
    pub async fn resolve(&self, query: &str) -> String {
        let slug = category_slug(query);
        let url = match self.client.endpoint(&format!("game/{slug}"), [("seo", "true")]) {
            Ok(url) => url,
            Err(e) => {
                warn!(slug = %slug, error = %e, "Failed to build Hitbox search url");
                return self.default_category.clone();
            }
        };

        let body = match self.client.get(url.as_str()).await {
            Ok(body) => body,
            Err(e) => {
                warn!(slug = %slug, error = %e, "Hitbox search failed");
                return self.default_category.clone();
            }
        };

        match serde_json::from_str::<Value>(&body) {
            Ok(response) => category_id_from_response(&response).unwrap_or_else(|| {
                debug!(slug = %slug, "No Hitbox category found");
                self.default_category.clone()
            }),
            Err(e) => {
                warn!(slug = %slug, error = %e, "Failed to parse Hitbox search response");
                self.default_category.clone()
            }
        }
    }
}

/// Lower-case, keep only `[a-z0-9 -]`, then turn spaces into hyphens.
pub fn category_slug(query: &str) -> String {
    query
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ' || *c == '-')
        .map(|c| if c == ' ' { '-' } else { c })
        .collect()
}

/// `category.category_id` of a search response. The id is sometimes sent
/// as a number.
pub fn category_id_from_response(response: &Value) -> Option<String> {
    match response.get("category")?.as_object()?.get("category_id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedTransport;
    use rstest::rstest;
    use serde_json::json;

    fn config() -> HitboxConfig {
        HitboxConfig {
            channel: "dopelives".to_string(),
            token: "secret".to_string(),
            api_base: "http://hitbox.test".to_string(),
            default_category: "50077".to_string(),
        }
    }

    #[rstest]
    #[case("Dark Souls II", "dark-souls-ii")]
    #[case("Half-Life 2: Episode One", "half-life-2-episode-one")]
    #[case("Pokémon Red!", "pokmon-red")]
    #[case("  Doom  ", "--doom--")]
    #[case("", "")]
    fn slug_rules(#[case] query: &str, #[case] expected: &str) {
        assert_eq!(category_slug(query), expected);
    }

    #[rstest]
    #[case(json!({ "category": { "category_id": "123" } }), Some("123"))]
    #[case(json!({ "category": { "category_id": 456 } }), Some("456"))]
    #[case(json!({ "category": null }), None)]
    #[case(json!({ "category": { "category_name": "x" } }), None)]
    #[case(json!({}), None)]
    fn category_id_extraction(#[case] response: Value, #[case] expected: Option<&str>) {
        assert_eq!(category_id_from_response(&response).as_deref(), expected);
    }

    #[tokio::test]
    async fn resolves_category_from_single_search() {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            Ok(json!({ "category": { "category_id": "99" } }).to_string())
        }));
        let resolver = HitboxGameResolver::new(&config(), transport.clone());

        assert_eq!(resolver.resolve("Dark Souls").await, "99");
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://hitbox.test/game/dark-souls?seo=true");
    }

    #[tokio::test]
    async fn falls_back_to_default_category() {
        let transport = Arc::new(ScriptedTransport::new(|_| Ok("{}".to_string())));
        let resolver = HitboxGameResolver::new(&config(), transport.clone());
        assert_eq!(resolver.resolve("Unknown Game").await, "50077");

        let failing = Arc::new(ScriptedTransport::empty());
        let resolver = HitboxGameResolver::new(&config(), failing.clone());
        assert_eq!(resolver.resolve("Unknown Game").await, "50077");
        assert_eq!(failing.requests().len(), 1);
    }
}
