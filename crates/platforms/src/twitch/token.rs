use std::sync::Arc;

use tracing::info;

use crate::client::encode_form;
use crate::error::PlatformError;
use crate::http::Transport;

use super::config::TwitchConfig;

/// Parameters of an OAuth authorization-code exchange.
#[derive(Debug, Clone)]
pub struct TwitchTokenRequest {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub code: String,
    pub state: String,
}

/// Exchange an authorization code for an access token.
///
/// Returns the raw response body, which carries the token on success and
/// an error description otherwise.
pub async fn request_token(
    config: &TwitchConfig,
    transport: Arc<dyn Transport>,
    request: &TwitchTokenRequest,
) -> Result<String, PlatformError> {
    let client = super::api_client(config, transport);
    let url = client.url("oauth2/token")?;
    let form = encode_form([
        ("client_id", request.client_id.as_str()),
        ("client_secret", request.client_secret.as_str()),
        ("grant_type", "authorization_code"),
        ("redirect_uri", request.redirect_uri.as_str()),
        ("code", request.code.as_str()),
        ("state", request.state.as_str()),
    ]);

    info!(client_id = %request.client_id, "Requesting Twitch token");
    client.post_form(url.as_str(), &form).await
}
