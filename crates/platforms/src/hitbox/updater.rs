use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::client::ApiClient;
use crate::error::PlatformError;
use crate::http::Transport;

use super::config::HitboxConfig;

/// Pushes status and category to the channel's live media entry.
///
/// Hitbox has no partial update, so the current media listing is fetched,
/// edited and written back as a whole. One attempt only.
pub struct HitboxChannelUpdater {
    client: ApiClient,
    config: Arc<HitboxConfig>,
}

impl HitboxChannelUpdater {
    pub fn new(config: Arc<HitboxConfig>, transport: Arc<dyn Transport>) -> Self {
        Self {
            client: super::api_client(&config, transport),
            config,
        }
    }

    /// Update the channel. Returns whether the write went through.
    pub async fn push(&self, status: &str, category_id: &str) -> bool {
        match self.try_push(status, category_id).await {
            Ok(()) => {
                info!("Hitbox updated");
                true
            }
            Err(e) => {
                warn!(error = %e, "Couldn't update Hitbox");
                false
            }
        }
    }

    async fn try_push(&self, status: &str, category_id: &str) -> Result<(), PlatformError> {
        let url = self.client.endpoint(
            &format!("media/live/{}/list", self.config.channel),
            [
                ("authToken", self.config.token.as_str()),
                ("filter", "recent"),
                ("hiddenOnly", "false"),
                ("limit", "1"),
                ("nocache", "true"),
                ("publicOnly", "false"),
                ("yt", "false"),
            ],
        )?;

        let listing = self.client.get(url.as_str()).await?;
        let mut media: Value = serde_json::from_str(&listing)?;
        apply_media_update(&mut media, status, category_id)?;

        self.client
            .put_json(url.as_str(), &serde_json::to_string(&media)?)
            .await?;
        Ok(())
    }
}

/// Set status and category on the first live stream of a media listing,
/// leaving every other field untouched.
pub fn apply_media_update(
    media: &mut Value,
    status: &str,
    category_id: &str,
) -> Result<(), PlatformError> {
    let livestream = media
        .get_mut("livestream")
        .and_then(|streams| streams.get_mut(0))
        .and_then(Value::as_object_mut)
        .ok_or_else(|| {
            PlatformError::UnexpectedPayload("media listing has no livestream entry".to_string())
        })?;

    livestream.insert("media_status".to_string(), Value::from(status));
    livestream.insert("media_category_id".to_string(), Value::from(category_id));
    Ok(())
}
