use std::sync::Arc;

use tracing::{info, warn};

use crate::client::{ApiClient, encode_form};
use crate::error::PlatformError;
use crate::http::Transport;
use crate::retry::{RetryAction, RetryPolicy, retry_bounded};

use super::config::TwitchConfig;
use super::models::ChannelUpdateEcho;

/// Pushes status and game to a Twitch channel.
///
/// The update endpoint sometimes answers without applying the change, so
/// every attempt is verified against the channel object it echoes back and
/// repeated until it sticks or the attempts run out.
pub struct TwitchChannelUpdater {
    client: ApiClient,
    config: Arc<TwitchConfig>,
    retry: RetryPolicy,
}

impl TwitchChannelUpdater {
    pub fn new(config: Arc<TwitchConfig>, transport: Arc<dyn Transport>) -> Self {
        Self {
            client: super::api_client(&config, transport),
            retry: RetryPolicy::immediate(config.max_update_attempts),
            config,
        }
    }

    /// Update the channel. Returns whether Twitch confirmed the change.
    pub async fn push(&self, status: &str, game: &str) -> bool {
        match self.try_push(status, game).await {
            Ok(()) => {
                info!("Twitch update successful");
                true
            }
            Err(e) => {
                warn!(error = %e, "Couldn't update Twitch");
                false
            }
        }
    }

    async fn try_push(&self, status: &str, game: &str) -> Result<(), PlatformError> {
        let game = self.config.allowed_game(game);
        let url = self.client.endpoint(
            &format!("channels/{}", self.config.channel),
            [("oauth_token", self.config.token.as_str())],
        )?;
        let form = encode_form([("channel[status]", status), ("channel[game]", game)]);

        retry_bounded(&self.retry, "twitch_channel_update", |_| {
            let url = url.as_str();
            let form = form.as_str();
            async move {
                match self.client.put_form(url, form).await {
                    Ok(body) => match verify_echo(&body, status, game) {
                        Ok(()) => RetryAction::Success(()),
                        Err(e) => RetryAction::Retry(e),
                    },
                    Err(e) => RetryAction::Retry(e),
                }
            }
        })
        .await
    }
}

/// Check that the channel object returned by an update carries exactly the
/// status and game that were sent.
pub fn verify_echo(body: &str, status: &str, game: &str) -> Result<(), PlatformError> {
    let echo: ChannelUpdateEcho = serde_json::from_str(body)?;
    let echoed_status = echo.status.unwrap_or_default();
    let echoed_game = echo.game.unwrap_or_default();

    if echoed_status == status && echoed_game == game {
        Ok(())
    } else {
        Err(PlatformError::Verification(format!(
            "channel reports status {echoed_status:?} and game {echoed_game:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedTransport;
    use reqwest::Method;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn config() -> Arc<TwitchConfig> {
        Arc::new(TwitchConfig {
            channel: "dopelives".to_string(),
            token: "secret".to_string(),
            api_base: "https://twitch.test/kraken".to_string(),
            blacklist: vec!["Hatred".to_string()],
            blacklist_replacement: "Gaming Talk Shows".to_string(),
            max_update_attempts: 5,
        })
    }

    /// Echo back the submitted form as the channel object.
    fn echo(request: &crate::HttpRequest) -> Result<String, PlatformError> {
        Ok(json!({
            "status": request.form_field("channel[status]"),
            "game": request.form_field("channel[game]"),
        })
        .to_string())
    }

    #[test]
    fn verify_echo_compares_both_fields() {
        let body = json!({ "status": "s", "game": "g", "views": 3 }).to_string();
        assert!(verify_echo(&body, "s", "g").is_ok());
        assert!(matches!(
            verify_echo(&body, "s", "other"),
            Err(PlatformError::Verification(_))
        ));
        assert!(matches!(verify_echo("oops", "s", "g"), Err(PlatformError::Json(_))));
    }

    #[test]
    fn null_game_echo_matches_empty_game() {
        let body = json!({ "status": "s", "game": null }).to_string();
        assert!(verify_echo(&body, "s", "").is_ok());
    }

    #[tokio::test]
    async fn blacklisted_game_is_replaced_before_sending() {
        let transport = Arc::new(ScriptedTransport::new(echo));
        let updater = TwitchChannelUpdater::new(config(), transport.clone());

        assert!(updater.push("[Bob] Hatred | hi", "Hatred").await);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].form_field("channel[game]").as_deref(),
            Some("Gaming Talk Shows")
        );
        assert_eq!(
            requests[0].form_field("channel[status]").as_deref(),
            Some("[Bob] Hatred | hi")
        );
    }

    #[tokio::test]
    async fn retries_until_verified() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let transport = Arc::new(ScriptedTransport::new(move |request| {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Ok(json!({ "status": "stale", "game": "stale" }).to_string())
            } else {
                echo(request)
            }
        }));
        let updater = TwitchChannelUpdater::new(config(), transport.clone());

        assert!(updater.push("status", "Doom").await);
        assert_eq!(transport.matching(&Method::PUT, "/channels/dopelives").len(), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            Err(PlatformError::transport("connection reset"))
        }));
        let updater = TwitchChannelUpdater::new(config(), transport.clone());

        assert!(!updater.push("status", "Doom").await);
        assert_eq!(transport.requests().len(), 5);
    }

    #[tokio::test]
    async fn update_request_shape() {
        let transport = Arc::new(ScriptedTransport::new(echo));
        let updater = TwitchChannelUpdater::new(config(), transport.clone());
        updater.push("Join us", "").await;

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::PUT);
        assert_eq!(
            request.url,
            "https://twitch.test/kraken/channels/dopelives?oauth_token=secret"
        );
        assert_eq!(
            request.header_value("accept"),
            Some(super::super::ACCEPT_HEADER)
        );
        assert_eq!(
            request.form_fields(),
            vec![
                ("channel[status]".to_string(), "Join us".to_string()),
                ("channel[game]".to_string(), String::new()),
            ]
        );
    }
}
