use std::sync::Arc;

use tracing::info;

use crate::client::encode_form;
use crate::error::PlatformError;
use crate::http::Transport;

use super::config::HitboxConfig;

/// Log in with account credentials and return the raw token response.
pub async fn request_token(
    config: &HitboxConfig,
    transport: Arc<dyn Transport>,
    login: &str,
    password: &str,
) -> Result<String, PlatformError> {
    let client = super::api_client(config, transport);
    let url = client.url("auth/token")?;
    let form = encode_form([("login", login), ("pass", password)]);

    info!(login, "Requesting Hitbox token");
    client.post_form(url.as_str(), &form).await
}
