//! Hitbox: category search, live media update and token login.

mod config;
mod resolver;
mod token;
mod updater;

use std::sync::Arc;

use crate::client::ApiClient;
use crate::http::Transport;

pub use config::HitboxConfig;
pub use resolver::{HitboxGameResolver, category_id_from_response, category_slug};
pub use token::request_token;
pub use updater::{HitboxChannelUpdater, apply_media_update};

pub(crate) fn api_client(config: &HitboxConfig, transport: Arc<dyn Transport>) -> ApiClient {
    ApiClient::new("Hitbox", config.api_base.clone(), transport)
}
