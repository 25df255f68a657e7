use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use rollcall_roster::memory::MemoryPlatform;
use rollcall_roster::{ChatPlatform, RosterService};
use rollcall_schedule::SchedulePoster;
use rollcall_server::config::Config;
use rollcall_server::routes::{self, AppState};
use rollcall_slack::SlackClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rollcall=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    if config.slack_signing_secret.is_none() {
        warn!("SLACK_SIGNING_SECRET not set, Slack requests will not be verified");
    }
    if !config.deny_list.is_empty() {
        info!("{} users on the deny list", config.deny_list.len());
    }

    match config.slack_bot_token.clone() {
        Some(token) => {
            let client = SlackClient::new(&token, config.slack_api_base.clone(), config.http_timeout)?;
            serve(config, Arc::new(client)).await
        }
        None => {
            warn!("SLACK_BOT_TOKEN not set, running against an in-memory workspace");
            serve(config, Arc::new(MemoryPlatform::new())).await
        }
    }
}

async fn serve<P: ChatPlatform>(config: Config, platform: Arc<P>) -> anyhow::Result<()> {
    let state = AppState {
        roster: Arc::new(RosterService::new(platform.clone(), config.deny_list)),
        poster: Arc::new(SchedulePoster::new(
            platform,
            config.calendar,
            config.admin_user,
        )),
        signing_secret: config.slack_signing_secret.map(Arc::from),
        schedule_channel: config.schedule_channel,
    };

    let app = routes::router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Rollcall listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
