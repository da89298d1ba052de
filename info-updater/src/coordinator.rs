//! Turns topic changes into channel updates on every platform.

use std::sync::Arc;

use async_trait::async_trait;
use diu_platforms::Transport;
use diu_platforms::hitbox::{HitboxChannelUpdater, HitboxConfig, HitboxGameResolver};
use diu_platforms::twitch::{TwitchChannelUpdater, TwitchConfig, TwitchGameResolver};
use tracing::info;

use crate::Error;
use crate::config::AppConfig;
use crate::monitor::{TopicEvent, TopicListener, TopicSnapshot};

/// Stream type that carries a game worth resolving.
const GAME_STREAM_TYPE: &str = "game";

/// What one platform is told about the current stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformStatus {
    pub status_line: String,
    /// Game name for Twitch, category id for Hitbox.
    pub game_identifier: String,
}

/// Listener that resolves the announced game and pushes it to Twitch, then
/// Hitbox.
pub struct UpdateCoordinator {
    status_postfix: String,
    twitch_resolver: TwitchGameResolver,
    twitch_updater: TwitchChannelUpdater,
    hitbox_resolver: HitboxGameResolver,
    hitbox_updater: HitboxChannelUpdater,
    hitbox_config: Arc<HitboxConfig>,
}

impl UpdateCoordinator {
    pub fn new(config: &AppConfig, transport: Arc<dyn Transport>) -> Self {
        let twitch_config: Arc<TwitchConfig> = Arc::new(config.twitch.clone());
        let hitbox_config: Arc<HitboxConfig> = Arc::new(config.hitbox.clone());

        Self {
            status_postfix: config.status_postfix.clone(),
            twitch_resolver: TwitchGameResolver::new(&twitch_config, transport.clone()),
            twitch_updater: TwitchChannelUpdater::new(twitch_config, transport.clone()),
            hitbox_resolver: HitboxGameResolver::new(&hitbox_config, transport.clone()),
            hitbox_updater: HitboxChannelUpdater::new(hitbox_config.clone(), transport),
            hitbox_config,
        }
    }

    /// `[streamer] game | postfix`
    pub fn status_line(&self, snapshot: &TopicSnapshot) -> String {
        format!(
            "[{}] {} | {}",
            snapshot.streamer,
            snapshot.game.trim(),
            self.status_postfix
        )
    }

    /// Returns which platforms (Twitch, Hitbox) accepted the update.
    async fn stream_updated(&self, snapshot: &TopicSnapshot) -> (bool, bool) {
        if snapshot.stream_type.to_lowercase() != GAME_STREAM_TYPE {
            info!(stream_type = %snapshot.stream_type, "Not a game stream, clearing channel info");
            return self.stream_removed().await;
        }

        let status_line = self.status_line(snapshot);

        let twitch = PlatformStatus {
            game_identifier: self.twitch_resolver.resolve(&snapshot.game).await,
            status_line: status_line.clone(),
        };
        info!(game = %twitch.game_identifier, "Twitch game");
        let twitch_updated = self
            .twitch_updater
            .push(&twitch.status_line, &twitch.game_identifier)
            .await;

        let hitbox = PlatformStatus {
            game_identifier: self.hitbox_resolver.resolve(&twitch.game_identifier).await,
            status_line,
        };
        if self.hitbox_config.is_default_category(&hitbox.game_identifier) {
            info!("Hitbox game: DEFAULT");
        } else {
            info!(category = %hitbox.game_identifier, "Hitbox game");
        }
        let hitbox_updated = self
            .hitbox_updater
            .push(&hitbox.status_line, &hitbox.game_identifier)
            .await;

        (twitch_updated, hitbox_updated)
    }

    async fn stream_removed(&self) -> (bool, bool) {
        let twitch_updated = self.twitch_updater.push(&self.status_postfix, "").await;
        let hitbox_updated = self
            .hitbox_updater
            .push(&self.status_postfix, &self.hitbox_config.default_category)
            .await;

        (twitch_updated, hitbox_updated)
    }
}

#[async_trait]
impl TopicListener for UpdateCoordinator {
    fn name(&self) -> &'static str {
        "update-coordinator"
    }

    async fn on_topic_event(&self, event: &TopicEvent) -> crate::Result<()> {
        let (twitch, hitbox) = match event {
            TopicEvent::Updated(snapshot) => self.stream_updated(snapshot).await,
            TopicEvent::Removed => self.stream_removed().await,
        };

        let failed: Vec<&str> = [("Twitch", twitch), ("Hitbox", hitbox)]
            .into_iter()
            .filter(|(_, updated)| !updated)
            .map(|(platform, _)| platform)
            .collect();
        if failed.is_empty() {
            Ok(())
        } else {
            Err(Error::listener(
                self.name(),
                format!("{} not updated", failed.join(" and ")),
            ))
        }
    }
}
