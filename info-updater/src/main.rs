use std::sync::Arc;

use anyhow::Context;
use diu_platforms::ReqwestTransport;
use info_updater::config::AppConfig;
use info_updater::coordinator::UpdateCoordinator;
use info_updater::logging::init_logging;
use info_updater::monitor::TopicWatcher;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_logging().context("failed to initialize logging")?;

    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate()?;

    let transport = Arc::new(ReqwestTransport::with_timeout(config.http.timeout()));

    let mut watcher = TopicWatcher::new(
        config.topic.url.clone(),
        config.poll_interval(),
        transport.clone(),
    );
    watcher.add_listener(Arc::new(UpdateCoordinator::new(&config, transport)));

    watcher.run().await;
    Ok(())
}
