//! Obtain the OAuth tokens the updater needs.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use diu_platforms::hitbox;
use diu_platforms::twitch::{self, TwitchTokenRequest};
use diu_platforms::{ReqwestTransport, Transport};
use info_updater::config::AppConfig;
use info_updater::logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "diu-token", version, about = "Request Twitch and Hitbox API tokens")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Exchange a Twitch authorization code for an access token
    Twitch {
        #[arg(long, env = "TWITCH_CLIENT_ID")]
        client_id: String,
        #[arg(long, env = "TWITCH_CLIENT_SECRET")]
        client_secret: String,
        #[arg(long)]
        redirect_uri: String,
        /// Code returned to the redirect uri
        #[arg(long)]
        code: String,
        #[arg(long, default_value = "")]
        state: String,
    },
    /// Log in to Hitbox and print the auth token
    Hitbox {
        #[arg(long)]
        login: String,
        #[arg(long, env = "HITBOX_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_logging()?;

    let config = AppConfig::load().context("failed to load configuration")?;
    let transport: Arc<dyn Transport> =
        Arc::new(ReqwestTransport::with_timeout(config.http.timeout()));

    let body = match args.command {
        Commands::Twitch {
            client_id,
            client_secret,
            redirect_uri,
            code,
            state,
        } => {
            let request = TwitchTokenRequest {
                client_id,
                client_secret,
                redirect_uri,
                code,
                state,
            };
            twitch::request_token(&config.twitch, transport, &request)
                .await
                .context("Twitch token request failed")?
        }
        Commands::Hitbox { login, password } => {
            hitbox::request_token(&config.hitbox, transport, &login, &password)
                .await
                .context("Hitbox token request failed")?
        }
    };

    println!("{body}");
    Ok(())
}
